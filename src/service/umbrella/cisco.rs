//! Umbrella REST implementation of [`GenericUmbrellaClient`].

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    base::{config::Config, lookback::LookbackWindow, types::Res},
    service::http::{handle_response, join_url},
};

use super::{DomainCategories, GenericUmbrellaClient, UmbrellaClient, UmbrellaEvent, WhoisRecord};

/// The "Security" block category; other categories are not reported.
const SECURITY_CATEGORY: &str = "67";

/// Maximum number of events requested.
const EVENT_LIMIT: &str = "100";

// Extra methods on `UmbrellaClient` applied by the Cisco implementation.

impl UmbrellaClient {
    pub fn cisco(config: &Config) -> Self {
        let client = CiscoUmbrellaClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ActivityResponse {
    #[serde(default)]
    data: Vec<UmbrellaEvent>,
}

#[derive(Debug, Deserialize)]
struct RiskScoreResponse {
    #[serde(default)]
    risk_score: Option<i64>,
}

/// Umbrella client implementation.
#[derive(Clone)]
pub struct CiscoUmbrellaClient {
    http: reqwest::Client,
    client_id: String,
    api_key: String,
    org_id: String,
    investigate_key: String,
    auth_url: String,
    reports_url: String,
    investigate_url: String,
}

impl CiscoUmbrellaClient {
    /// Create a new Umbrella client.
    #[instrument(name = "CiscoUmbrellaClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.umbrella_client_id.clone(),
            api_key: config.umbrella_api_key.clone(),
            org_id: config.umbrella_org_id.clone(),
            investigate_key: config.umbrella_investigate_key.clone(),
            auth_url: config.umbrella_auth_url.clone(),
            reports_url: config.umbrella_reports_url.clone(),
            investigate_url: config.umbrella_investigate_url.clone(),
        }
    }

    /// Exchange the management credentials for an OAuth token.
    #[instrument(skip(self))]
    async fn authenticate(&self) -> Res<String> {
        let response = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.api_key))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = handle_response(response).await?;

        info!("Umbrella auth successful");

        Ok(token.access_token)
    }

    fn investigate(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.get(join_url(&self.investigate_url, endpoint)).bearer_auth(&self.investigate_key)
    }
}

#[async_trait]
impl GenericUmbrellaClient for CiscoUmbrellaClient {
    #[instrument(skip(self))]
    async fn list_security_events(&self, window: &LookbackWindow) -> Res<Vec<UmbrellaEvent>> {
        let token = self.authenticate().await?;

        let url = join_url(&self.reports_url, &format!("organizations/{}/activity/dns", self.org_id));
        let from = window.relative();

        info!("Checking for Umbrella security events...");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("from", from.as_str()), ("to", "now"), ("limit", EVENT_LIMIT), ("categories", SECURITY_CATEGORY)])
            .send()
            .await?;

        let activity: ActivityResponse = handle_response(response).await?;

        info!("Got {} Umbrella events", activity.data.len());

        Ok(activity.data)
    }

    #[instrument(skip(self))]
    async fn risk_score(&self, domain: &str) -> Res<Option<i64>> {
        let response = self.investigate(&format!("domains/risk-score/{domain}")).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Umbrella has no risk score for `{}`", domain);
            return Ok(None);
        }

        let risk: RiskScoreResponse = handle_response(response).await?;

        Ok(risk.risk_score)
    }

    #[instrument(skip(self))]
    async fn categories(&self, domain: &str) -> Res<DomainCategories> {
        let response = self
            .investigate(&format!("domains/categorization/{domain}"))
            .query(&[("showLabels", "")])
            .send()
            .await?;

        let mut categories: HashMap<String, DomainCategories> = handle_response(response).await?;

        // The response is keyed by the domain as Umbrella normalized it.
        if let Some(entry) = categories.remove(domain) {
            return Ok(entry);
        }

        categories
            .into_values()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Umbrella returned no categorization for `{domain}`."))
    }

    #[instrument(skip(self))]
    async fn whois(&self, domain: &str) -> Res<WhoisRecord> {
        let response = self.investigate(&format!("whois/{domain}")).send().await?;

        handle_response(response).await
    }
}
