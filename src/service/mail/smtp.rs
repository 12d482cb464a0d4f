//! SMTP relay implementation of [`GenericMailClient`].
//!
//! Only plain, unauthenticated relays are supported.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType};
use tracing::{error, info, instrument};

use crate::base::{
    config::Config,
    templates::{NOTIFICATION_SUBJECT, notification_body},
    types::{Res, Void},
};

use super::{GenericMailClient, MailClient};

/// Port used when none is configured.
const DEFAULT_SMTP_PORT: u16 = 25;

// Extra methods on `MailClient` applied by the SMTP implementation.

impl MailClient {
    pub fn smtp(config: &Config) -> Self {
        let client = SmtpMailClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

/// SMTP mail client implementation.
#[derive(Clone)]
pub struct SmtpMailClient {
    relay: String,
    port: u16,
    sender: String,
}

impl SmtpMailClient {
    /// Create a new SMTP mail client.
    pub fn new(config: &Config) -> Self {
        Self {
            relay: config.smtp_relay.clone(),
            port: config.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            sender: config.smtp_sender_addr.clone(),
        }
    }

    /// Build the notification message.
    fn build_message(&self, hostname: &str, recipient: &str) -> Res<Message> {
        let message = Message::builder()
            .from(self.sender.parse()?)
            .to(recipient.parse()?)
            .subject(NOTIFICATION_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(notification_body(hostname))?;

        Ok(message)
    }

    /// Send over a fresh connection.
    ///
    /// The transport is unpooled, so the connection is opened for this message
    /// and closed again whether or not the send succeeds.
    async fn deliver(&self, hostname: &str, recipient: &str) -> Void {
        let message = self.build_message(hostname, recipient)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.relay.as_str()).port(self.port).build();

        transport.send(message).await?;

        Ok(())
    }
}

#[async_trait]
impl GenericMailClient for SmtpMailClient {
    #[instrument(skip(self))]
    async fn send_notification(&self, hostname: &str, recipient: &str) {
        match self.deliver(hostname, recipient).await {
            Ok(()) => info!("Sent notification about {} to {}", hostname, recipient),
            Err(err) => error!("Failed to send notification to {}: {}", recipient, err),
        }
    }
}

// Tests.
