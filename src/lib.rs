//! Library root for `incident-response-bot`.
//!
//! The incident response bot is a Webex chat bot for security operations teams:
//! - Lists recent Secure Endpoint (AMP) and Umbrella security events
//! - Investigates domains with Umbrella and IP addresses with Spamhaus
//! - Quarantines computers and emails their users
//!
//! Replies are markdown text or adaptive cards. The architecture is built around
//! extensible traits that allow for different implementations of each service.

pub mod base;
pub mod card;
pub mod command;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the service clients and commands
/// - Serves chat notifications until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting incident-response-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A rustls crypto provider was already installed."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
