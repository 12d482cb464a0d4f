//! Cisco Umbrella integration: reporting (security events) and investigate
//! (domain risk, categories, WHOIS).

pub mod cisco;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use crate::base::{lookback::LookbackWindow, types::Res};

// Types.

/// A DNS security event from the reporting API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UmbrellaEvent {
    pub domain: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub externalip: Option<String>,
    pub verdict: String,
}

/// Security and content labels for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DomainCategories {
    #[serde(default)]
    pub security_categories: Vec<String>,
    #[serde(default)]
    pub content_categories: Vec<String>,
}

/// Registration data for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    #[serde(default)]
    pub registrar_name: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

/// Everything the investigate card shows about a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainInvestigation {
    pub domain: String,
    pub risk_score: i64,
    pub categories: DomainCategories,
    pub whois: WhoisRecord,
}

// Traits.

/// Generic Umbrella client trait that clients must implement.
#[async_trait]
pub trait GenericUmbrellaClient: Send + Sync + 'static {
    /// List security-category DNS events within the lookback window.
    async fn list_security_events(&self, window: &LookbackWindow) -> Res<Vec<UmbrellaEvent>>;

    /// Get the risk score of a domain, or `None` if the domain is unknown.
    async fn risk_score(&self, domain: &str) -> Res<Option<i64>>;

    /// Get the security and content categories of a domain.
    async fn categories(&self, domain: &str) -> Res<DomainCategories>;

    /// Get WHOIS registration data for a domain.
    async fn whois(&self, domain: &str) -> Res<WhoisRecord>;
}

// Structs.

/// Umbrella client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct UmbrellaClient {
    inner: Arc<dyn GenericUmbrellaClient>,
}

impl Deref for UmbrellaClient {
    type Target = dyn GenericUmbrellaClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl UmbrellaClient {
    pub fn new(inner: Arc<dyn GenericUmbrellaClient>) -> Self {
        Self { inner }
    }
}
