//! Runtime services and shared state for the incident response bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    command::CommandRegistry,
    service::{amp::AmpClient, chat::ChatClient, mail::MailClient, reputation::ReputationClient, umbrella::UmbrellaClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the service clients, the command registry, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The Secure Endpoint client instance.
    pub amp: AmpClient,
    /// The Umbrella client instance.
    pub umbrella: UmbrellaClient,
    /// The IP reputation client instance.
    pub reputation: ReputationClient,
    /// The mail client instance.
    pub mail: MailClient,
    /// The registered chat commands.
    pub commands: CommandRegistry,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the security service clients.
        let amp = AmpClient::secure_endpoint(&config);
        let umbrella = UmbrellaClient::cisco(&config);
        let reputation = ReputationClient::spamhaus(&config);
        let mail = MailClient::smtp(&config);

        // Register the commands.
        let commands = CommandRegistry::standard(&config, amp.clone(), umbrella.clone(), reputation.clone(), mail.clone());

        // Initialize the chat client.
        let chat = ChatClient::webex(&config, commands.clone()).await?;

        Ok(Self {
            config,
            amp,
            umbrella,
            reputation,
            mail,
            commands,
            chat,
        })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
