//! Spamhaus Intelligence API implementation of [`GenericReputationClient`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    base::{config::Config, types::Res},
    service::http::{handle_response, join_url},
};

use super::{GenericReputationClient, ReputationClient, ReputationRecord};

/// Maximum number of history records requested.
const HISTORY_LIMIT: &str = "5";

// Extra methods on `ReputationClient` applied by the Spamhaus implementation.

impl ReputationClient {
    pub fn spamhaus(config: &Config) -> Self {
        let client = SpamhausClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    realm: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    results: Vec<ReputationRecord>,
}

/// Spamhaus client implementation.
#[derive(Clone)]
pub struct SpamhausClient {
    http: reqwest::Client,
    username: String,
    password: String,
    login_url: String,
    api_url: String,
}

impl SpamhausClient {
    /// Create a new Spamhaus client.
    #[instrument(name = "SpamhausClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            username: config.spamhaus_user.clone(),
            password: config.spamhaus_pass.clone(),
            login_url: config.spamhaus_login_url.clone(),
            api_url: config.spamhaus_api_url.clone(),
        }
    }

    /// Log in to the intel realm and get a bearer token.
    #[instrument(skip(self))]
    async fn login(&self) -> Res<String> {
        let request = LoginRequest {
            username: &self.username,
            password: &self.password,
            realm: "intel",
        };

        let response = self.http.post(&self.login_url).json(&request).send().await?;
        let login: LoginResponse = handle_response(response).await?;

        Ok(login.token)
    }
}

#[async_trait]
impl GenericReputationClient for SpamhausClient {
    #[instrument(skip(self))]
    async fn reputation_history(&self, ip_addr: &str) -> Res<Option<Vec<ReputationRecord>>> {
        let token = self.login().await?;

        let url = join_url(&self.api_url, &format!("byobject/cidr/XBL/listed/history/{ip_addr}"));
        let response = self.http.get(url).bearer_auth(token).query(&[("limit", HISTORY_LIMIT)]).send().await?;

        // Spamhaus answers 404 when it has no data for the address.
        if response.status() == StatusCode::NOT_FOUND {
            info!("No reputation data for {}", ip_addr);
            return Ok(None);
        }

        let history: HistoryResponse = handle_response(response).await?;

        if history.results.is_empty() {
            return Ok(None);
        }

        Ok(Some(history.results))
    }
}
