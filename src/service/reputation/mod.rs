//! IP reputation integration (Spamhaus Intelligence API).

pub mod spamhaus;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use crate::base::types::Res;

// Types.

/// A single listing of an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReputationRecord {
    pub ipaddress: String,
    /// The detected activity (e.g., a botnet name).
    pub detection: String,
    /// How the listing was determined.
    pub heuristic: String,
    /// Country code.
    pub cc: String,
    /// Last seen, in seconds since the epoch.
    pub seen: i64,
}

// Traits.

/// Generic IP reputation client trait that clients must implement.
#[async_trait]
pub trait GenericReputationClient: Send + Sync + 'static {
    /// Get the listing history of an IP address, most recent first.
    ///
    /// Returns `None` when the provider has no data for the address.
    async fn reputation_history(&self, ip_addr: &str) -> Res<Option<Vec<ReputationRecord>>>;
}

// Structs.

/// IP reputation client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ReputationClient {
    inner: Arc<dyn GenericReputationClient>,
}

impl Deref for ReputationClient {
    type Target = dyn GenericReputationClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ReputationClient {
    pub fn new(inner: Arc<dyn GenericReputationClient>) -> Self {
        Self { inner }
    }
}
