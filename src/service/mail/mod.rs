//! User notification mail.
//!
//! Notifications are best-effort: implementations log failures and never
//! surface them to the caller.

pub mod smtp;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

// Traits.

/// Generic mail client trait that clients must implement.
#[async_trait]
pub trait GenericMailClient: Send + Sync + 'static {
    /// Tell the owner of `hostname` (at `recipient`) to bring their computer in.
    async fn send_notification(&self, hostname: &str, recipient: &str);
}

// Structs.

/// Mail client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct MailClient {
    inner: Arc<dyn GenericMailClient>,
}

impl Deref for MailClient {
    type Target = dyn GenericMailClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl MailClient {
    pub fn new(inner: Arc<dyn GenericMailClient>) -> Self {
        Self { inner }
    }
}
