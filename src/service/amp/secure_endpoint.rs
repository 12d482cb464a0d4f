//! Secure Endpoint REST implementation of [`GenericAmpClient`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    base::{config::Config, types::Res},
    service::http::{handle_response, join_url},
};

use super::{AmpClient, AmpEvent, Computer, GenericAmpClient, IsolationResponse};

/// Event types queried by `amp events`: threat detected, threat quarantined, and
/// executed malware. Not exhaustive; these are the common malware detections.
pub const DETECTION_EVENT_TYPES: [&str; 3] = ["1090519054", "1090519081", "553648147"];

/// Maximum number of events requested.
pub const EVENT_LIMIT: &str = "100";

/// Comment attached to isolation requests.
const ISOLATION_COMMENT: &str = "Locked by IR Bot";

/// Unlock code attached to isolation requests.
const ISOLATION_UNLOCK_CODE: &str = "unlockme";

// Extra methods on `AmpClient` applied by the Secure Endpoint implementation.

impl AmpClient {
    pub fn secure_endpoint(config: &Config) -> Self {
        let client = SecureEndpointClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

/// Envelope every Secure Endpoint list response arrives in.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Secure Endpoint client implementation.
#[derive(Clone)]
pub struct SecureEndpointClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    api_key: String,
}

impl SecureEndpointClient {
    /// Create a new Secure Endpoint client.
    #[instrument(name = "SecureEndpointClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.amp4e_api_url.clone(),
            client_id: config.amp4e_client_id.clone(),
            api_key: config.amp4e_api_key.clone(),
        }
    }

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.get(join_url(&self.base_url, endpoint)).basic_auth(&self.client_id, Some(&self.api_key))
    }

    fn put(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.put(join_url(&self.base_url, endpoint)).basic_auth(&self.client_id, Some(&self.api_key))
    }
}

#[async_trait]
impl GenericAmpClient for SecureEndpointClient {
    #[instrument(skip(self))]
    async fn find_computers(&self, hostname: &str) -> Res<Vec<Computer>> {
        let response = self.get("computers").query(&[("hostname[]", hostname)]).send().await?;
        let envelope: DataEnvelope<Vec<Computer>> = handle_response(response).await?;

        info!("Found {} computers matching `{}`", envelope.data.len(), hostname);

        Ok(envelope.data)
    }

    #[instrument(skip(self))]
    async fn isolate_computer(&self, connector_guid: &str) -> Res<IsolationResponse> {
        let response = self
            .put(&format!("computers/{connector_guid}/isolation"))
            .form(&[("comment", ISOLATION_COMMENT), ("unlock_code", ISOLATION_UNLOCK_CODE)])
            .send()
            .await?;

        // Rejections (e.g., already isolated, not supported) still carry a JSON error body.
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str::<IsolationResponse>(&body).map_err(|e| {
            warn!("Unexpected isolation response ({}): {}", status, body);
            anyhow::anyhow!("Isolation request failed with status {status}: {e}")
        })
    }

    #[instrument(skip(self))]
    async fn list_events(&self, since: DateTime<Utc>) -> Res<Vec<AmpEvent>> {
        let start_date = since.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut query = vec![("start_date", start_date.as_str()), ("limit", EVENT_LIMIT)];
        query.extend(DETECTION_EVENT_TYPES.iter().map(|event_type| ("event_type[]", *event_type)));

        let response = self.get("events").query(&query).send().await?;
        let envelope: DataEnvelope<Vec<AmpEvent>> = handle_response(response).await?;

        info!("Detected {} recent events.", envelope.data.len());

        Ok(envelope.data)
    }
}
