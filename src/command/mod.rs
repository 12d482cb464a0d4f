//! Chat commands and the registry that dispatches to them.
//!
//! Each command parses its free-text argument, calls the relevant service
//! client(s), and shapes the result into a [`BotResponse`]:
//! - `amp events <Nh|Nd>` and `umbrella events <Nh|Nd>` list recent security events.
//! - `umbrella investigate <domain>` summarizes a domain.
//! - `ip lookup <ip>` shows IP reputation.
//! - `actions <hostname>` offers (and carries out) containment actions.
//! - `help` lists the above; `echo` is the host's built-in echo.

pub mod actions;
pub mod amp_events;
pub mod echo;
pub mod help;
pub mod ip_lookup;
pub mod isolation;
pub mod umbrella_events;
pub mod umbrella_investigate;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{ActionInputs, BotResponse, Invocation, Res},
    },
    service::{amp::AmpClient, mail::MailClient, reputation::ReputationClient, umbrella::UmbrellaClient},
};

use self::{
    actions::ContainmentActionsCommand, amp_events::AmpEventsCommand, echo::EchoCommand, help::HelpCommand, ip_lookup::IpLookupCommand,
    umbrella_events::UmbrellaEventsCommand, umbrella_investigate::UmbrellaInvestigateCommand,
};

// Traits.

/// A chat command.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// The keyword that selects this command (e.g., `amp events`).
    fn keyword(&self) -> &str;

    /// One-line description shown by `help`.
    fn help_message(&self) -> &str;

    /// Run the command.
    ///
    /// User errors and empty results come back as text replies; an `Err` means
    /// the command itself failed.
    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse>;
}

/// Keyword and help text of a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub keyword: String,
    pub help_message: String,
}

// Structs.

/// The set of registered commands.
///
/// It is designed to be trivially cloneable.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: Arc<Vec<Arc<dyn Command>>>,
    fallback: Arc<dyn Command>,
}

impl CommandRegistry {
    /// Register the given commands, plus the built-in `echo` and `help`.
    ///
    /// `help` also answers any message that matches no keyword.
    pub fn new(mut commands: Vec<Arc<dyn Command>>) -> Self {
        commands.push(Arc::new(EchoCommand));

        let summaries = commands
            .iter()
            .map(|command| CommandSummary {
                keyword: command.keyword().to_string(),
                help_message: command.help_message().to_string(),
            })
            .collect();

        let help: Arc<dyn Command> = Arc::new(HelpCommand::new(summaries));
        commands.push(help.clone());

        for command in &commands {
            info!("Added command: '{}'", command.keyword());
        }

        Self {
            commands: Arc::new(commands),
            fallback: help,
        }
    }

    /// Register every security command against the given service clients.
    pub fn standard(config: &Config, amp: AmpClient, umbrella: UmbrellaClient, reputation: ReputationClient, mail: MailClient) -> Self {
        Self::new(vec![
            Arc::new(AmpEventsCommand::new(amp.clone(), &config.amp4e_console_url)),
            Arc::new(UmbrellaEventsCommand::new(umbrella.clone(), &config.umbrella_dashboard_url, &config.umbrella_org_id)),
            Arc::new(UmbrellaInvestigateCommand::new(umbrella)),
            Arc::new(ContainmentActionsCommand::new(amp, mail)),
            Arc::new(IpLookupCommand::new(reputation)),
        ])
    }

    /// Summaries of every registered command, in registration order.
    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.commands
            .iter()
            .map(|command| CommandSummary {
                keyword: command.keyword().to_string(),
                help_message: command.help_message().to_string(),
            })
            .collect()
    }

    /// Find the command a message is addressed to, and the argument left after its keyword.
    ///
    /// The keyword must start the message (ignoring case) and end at a word
    /// boundary; the longest matching keyword wins.
    pub fn resolve(&self, text: &str) -> Option<(Arc<dyn Command>, String)> {
        let text = text.trim();

        self.commands
            .iter()
            .filter(|command| starts_with_keyword(text, command.keyword()))
            .max_by_key(|command| command.keyword().len())
            .map(|command| (command.clone(), text[command.keyword().len()..].trim().to_string()))
    }

    /// Dispatch a plain chat message.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, text: &str) -> Res<BotResponse> {
        match self.resolve(text) {
            Some((command, argument)) => {
                info!("Running command '{}'", command.keyword());
                command.execute(&Invocation::message(command.keyword(), argument)).await
            }
            None => {
                info!("No command matched; falling back to '{}'", self.fallback.keyword());
                self.fallback.execute(&Invocation::message(self.fallback.keyword(), text.trim())).await
            }
        }
    }

    /// Dispatch a card submission, routed by its callback keyword.
    #[instrument(skip(self))]
    pub async fn dispatch_submission(&self, inputs: ActionInputs) -> Res<BotResponse> {
        let keyword = inputs.callback_keyword.clone().unwrap_or_else(|| actions::KEYWORD.to_string());

        let command = self
            .commands
            .iter()
            .find(|command| command.keyword().eq_ignore_ascii_case(&keyword))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        info!("Running command '{}' for a card submission", command.keyword());

        command.execute(&Invocation::submission(command.keyword(), inputs)).await
    }
}

/// Whether `text` starts with `keyword` as a whole word, ignoring ASCII case.
fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    let Some(prefix) = text.get(..keyword.len()) else {
        return false;
    };

    if !prefix.eq_ignore_ascii_case(keyword) {
        return false;
    }

    text[keyword.len()..].chars().next().is_none_or(char::is_whitespace)
}

// Tests.

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A command that replies with its keyword and argument.
    pub(crate) struct StubCommand(pub &'static str);

    #[async_trait]
    impl Command for StubCommand {
        fn keyword(&self) -> &str {
            self.0
        }

        fn help_message(&self) -> &str {
            "A stub command"
        }

        async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
            Ok(BotResponse::text(format!("{}|{}|{}", self.0, invocation.argument, invocation.attachment.is_some())))
        }
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::new(vec![
            Arc::new(StubCommand("umbrella events")),
            Arc::new(StubCommand("umbrella investigate")),
            Arc::new(StubCommand("actions")),
            Arc::new(StubCommand("ip lookup")),
        ])
    }

    #[test]
    fn test_starts_with_keyword() {
        assert!(starts_with_keyword("actions PC-1", "actions"));
        assert!(starts_with_keyword("ACTIONS", "actions"));
        assert!(starts_with_keyword("ip lookup\t1.2.3.4", "ip lookup"));
        assert!(!starts_with_keyword("actionsPC-1", "actions"));
        assert!(!starts_with_keyword("show actions", "actions"));
        assert!(!starts_with_keyword("act", "actions"));
        assert!(!starts_with_keyword("é", "actions"));
    }

    #[tokio::test]
    async fn test_dispatch_strips_keyword() {
        let response = registry().dispatch("  umbrella investigate   example.com ").await.unwrap();

        assert_eq!(response.as_text(), "umbrella investigate|example.com|false");
    }

    #[tokio::test]
    async fn test_dispatch_empty_argument() {
        let response = registry().dispatch("actions ").await.unwrap();

        assert_eq!(response.as_text(), "actions||false");
    }

    #[tokio::test]
    async fn test_dispatch_is_case_insensitive() {
        let response = registry().dispatch("IP Lookup 192.0.2.1").await.unwrap();

        assert_eq!(response.as_text(), "ip lookup|192.0.2.1|false");
    }

    #[tokio::test]
    async fn test_dispatch_echo() {
        let response = registry().dispatch("echo hello there").await.unwrap();

        assert_eq!(response.as_text(), "hello there");
    }

    #[tokio::test]
    async fn test_unknown_text_falls_back_to_help() {
        let response = registry().dispatch("what can you do?").await.unwrap();

        assert!(response.as_text().starts_with("Hello there!"));
        assert!(response.as_text().contains("- **actions** *value* - A stub command\n"));
    }

    #[tokio::test]
    async fn test_dispatch_submission_routes_by_callback_keyword() {
        let inputs = ActionInputs {
            callback_keyword: Some("actions".to_string()),
            requested_action: "quarantine".to_string(),
            target_computer: "PC-1".to_string(),
            user_email_addr: None,
        };

        let response = registry().dispatch_submission(inputs).await.unwrap();

        assert_eq!(response.as_text(), "actions||true");
    }

    #[tokio::test]
    async fn test_dispatch_submission_defaults_to_actions() {
        let response = registry().dispatch_submission(ActionInputs::default()).await.unwrap();

        assert_eq!(response.as_text(), "actions||true");
    }

    #[test]
    fn test_summaries_include_builtins() {
        let keywords = registry().summaries().into_iter().map(|s| s.keyword).collect::<Vec<_>>();

        assert_eq!(keywords, vec!["umbrella events", "umbrella investigate", "actions", "ip lookup", "echo", "help"]);
    }
}
