//! The `actions` command: containment actions against a computer.
//!
//! Sent as a chat message, it replies with a menu card. Buttons on that card
//! come back as submissions, which carry out the chosen action.

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::{
    base::{
        templates::ACTIONS_USAGE,
        types::{ActionInputs, BotResponse, Invocation, Res},
    },
    card::format::containment_actions_card,
    service::{amp::AmpClient, mail::MailClient},
};

use super::{Command, isolation::quarantine_computer};

pub const KEYWORD: &str = "actions";

/// Submitted action that isolates the computer.
pub const ACTION_QUARANTINE: &str = "quarantine";

/// Submitted action that emails the computer's user.
pub const ACTION_NOTIFY_USER: &str = "notify user";

pub struct ContainmentActionsCommand {
    amp: AmpClient,
    mail: MailClient,
}

impl ContainmentActionsCommand {
    pub fn new(amp: AmpClient, mail: MailClient) -> Self {
        Self { amp, mail }
    }

    /// Carry out an action chosen on the menu card.
    #[instrument(skip(self))]
    async fn run_submission(&self, inputs: &ActionInputs) -> Res<BotResponse> {
        let computer = inputs.target_computer.trim();

        match inputs.requested_action.as_str() {
            ACTION_QUARANTINE => quarantine_computer(&self.amp, computer).await,
            ACTION_NOTIFY_USER => {
                let Some(email) = inputs.user_email_addr.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
                    return Ok(BotResponse::text("Please enter an email address to notify."));
                };

                self.mail.send_notification(computer, email).await;

                Ok(BotResponse::text(format!("Message sent to {email}!")))
            }
            other => {
                warn!("Unknown containment action `{}`", other);
                Ok(BotResponse::text(format!("Sorry, I don't know how to perform the action '{other}'.")))
            }
        }
    }
}

#[async_trait]
impl Command for ContainmentActionsCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "See potential actions to take against a compromised computer"
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        if let Some(inputs) = &invocation.attachment {
            return self.run_submission(inputs).await;
        }

        let computer = invocation.argument.trim();

        if computer.is_empty() {
            return Ok(BotResponse::text(ACTIONS_USAGE));
        }

        info!("Offering containment actions for {}", computer);

        Ok(BotResponse::card("Containment Actions", containment_actions_card(computer)))
    }
}
