//! Event handling and user interactions for the incident response bot.
//!
//! This module provides functionality for handling chat notifications:
//! - Filtering senders against the approved users and domains
//! - Dispatching messages and card submissions to commands
//! - Posting the replies back to the room

pub mod access;
pub mod card_submission;
pub mod message;

use tracing::{error, instrument, warn};

use crate::{
    base::{
        templates::COMMAND_FAILED,
        types::{BotResponse, Res, Void},
    },
    command::CommandRegistry,
    service::chat::{ChatClient, WebhookNotification},
};

use self::access::ApprovedSenders;

/// Webhook resource for new messages.
pub const RESOURCE_MESSAGES: &str = "messages";

/// Webhook resource for card submissions.
pub const RESOURCE_ATTACHMENT_ACTIONS: &str = "attachmentActions";

/// Webhook event for newly created resources.
pub const EVENT_CREATED: &str = "created";

/// Handle one webhook notification to completion.
#[instrument(skip_all, fields(resource = %notification.resource, id = %notification.data.id))]
pub async fn handle_notification(notification: WebhookNotification, chat: &ChatClient, commands: &CommandRegistry, senders: &ApprovedSenders) -> Void {
    match (notification.resource.as_str(), notification.event.as_str()) {
        (RESOURCE_MESSAGES, EVENT_CREATED) => message::handle_message(&notification.data, chat, commands, senders).await,
        (RESOURCE_ATTACHMENT_ACTIONS, EVENT_CREATED) => card_submission::handle_card_submission(&notification.data, chat, commands, senders).await,
        (resource, event) => {
            warn!("Received unhandled notification: {} {}", resource, event);
            Ok(())
        }
    }
}

/// Turn a command result into the reply to post.
///
/// A failed command is logged and answered with a generic apology.
pub(crate) fn reply_for(result: Res<BotResponse>) -> BotResponse {
    result.unwrap_or_else(|err| {
        error!("Command failed: {:#}", err);
        BotResponse::text(COMMAND_FAILED)
    })
}
