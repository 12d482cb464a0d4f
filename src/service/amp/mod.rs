//! Cisco Secure Endpoint (AMP for Endpoints) integration.
//!
//! The `GenericAmpClient` trait covers the three calls the bot makes:
//! computer lookup by hostname, isolation, and event history.

pub mod secure_endpoint;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::base::types::Res;

// Types.

/// A computer known to Secure Endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Computer {
    pub connector_guid: String,
    pub hostname: String,
}

/// The computer an event was raised on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventComputer {
    pub hostname: String,
    /// Some events carry no associated user.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub external_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileIdentity {
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventFile {
    #[serde(default)]
    pub file_name: Option<String>,
    pub identity: FileIdentity,
}

/// A threat detection event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AmpEvent {
    pub event_type: String,
    /// ISO-8601 timestamp, e.g. `2024-05-10T11:32:09+00:00`.
    pub date: String,
    pub connector_guid: String,
    #[serde(default)]
    pub detection: Option<String>,
    pub computer: EventComputer,
    pub file: EventFile,
}

/// Status of an isolation request; `status` is absent when the request failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IsolationData {
    #[serde(default)]
    pub status: Option<String>,
}

/// An error reported by the Secure Endpoint API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AmpApiError {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

/// Response to an isolation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IsolationResponse {
    #[serde(default)]
    pub data: IsolationData,
    #[serde(default)]
    pub errors: Vec<AmpApiError>,
}

impl IsolationResponse {
    /// The first error detail the API reported, if any.
    pub fn first_error(&self) -> Option<&str> {
        let error = self.errors.first()?;

        error.details.first().map(String::as_str).or(error.description.as_deref())
    }
}

// Traits.

/// Generic Secure Endpoint client trait that clients must implement.
#[async_trait]
pub trait GenericAmpClient: Send + Sync + 'static {
    /// Find computers whose hostname matches exactly.
    async fn find_computers(&self, hostname: &str) -> Res<Vec<Computer>>;

    /// Request network isolation of a computer.
    ///
    /// Provider-reported failures come back inside the response, not as an `Err`.
    async fn isolate_computer(&self, connector_guid: &str) -> Res<IsolationResponse>;

    /// List recent detection events since the given time.
    async fn list_events(&self, since: DateTime<Utc>) -> Res<Vec<AmpEvent>>;
}

// Structs.

/// Secure Endpoint client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct AmpClient {
    inner: Arc<dyn GenericAmpClient>,
}

impl Deref for AmpClient {
    type Target = dyn GenericAmpClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl AmpClient {
    pub fn new(inner: Arc<dyn GenericAmpClient>) -> Self {
        Self { inner }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_isolation_failure_shape() {
        let response: IsolationResponse = serde_json::from_value(json!({
            "data": {},
            "errors": [{ "error_code": 409, "description": "Conflict", "details": ["Computer is already isolated"] }]
        }))
        .unwrap();

        assert_eq!(response.data.status, None);
        assert_eq!(response.first_error(), Some("Computer is already isolated"));
    }

    #[test]
    fn test_isolation_error_without_details_uses_description() {
        let response: IsolationResponse = serde_json::from_value(json!({
            "data": {},
            "errors": [{ "description": "Unauthorized" }]
        }))
        .unwrap();

        assert_eq!(response.first_error(), Some("Unauthorized"));
    }

    #[test]
    fn test_event_without_user() {
        let event: AmpEvent = serde_json::from_value(json!({
            "event_type": "Threat Detected",
            "date": "2024-05-10T11:32:09+00:00",
            "connector_guid": "guid-1",
            "detection": "W32.Eicar",
            "computer": { "hostname": "PC-1", "external_ip": "203.0.113.5" },
            "file": { "file_name": "eicar.com", "identity": { "sha256": "abc" } }
        }))
        .unwrap();

        assert_eq!(event.computer.user, None);
        assert_eq!(event.file.identity.sha256, "abc");
    }
}
