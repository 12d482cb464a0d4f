//! Chat service integration for the incident response bot.
//!
//! This module provides functionality for interacting with the chat platform:
//! - Receiving webhook notifications
//! - Fetching messages, card submissions and people
//! - Sending text and card replies
//!
//! It defines the `GenericChatClient` trait that can be implemented for different
//! chat services, with a default implementation for Webex.

pub mod signature;
pub mod webex;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use crate::base::types::{ActionInputs, BotResponse, Res, Void};

// Types.

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    /// `direct` or `group`.
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub person_email: String,
    /// Plain text of the message; absent for file-only messages.
    #[serde(default)]
    pub text: String,
}

impl ChatMessage {
    pub fn is_group(&self) -> bool {
        self.room_type.as_deref() == Some("group")
    }
}

/// A submitted adaptive card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentAction {
    pub id: String,
    pub room_id: String,
    pub person_id: String,
    #[serde(default)]
    pub inputs: ActionInputs,
}

/// The `data` block of a webhook notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// The ID of the message or attachment action that was created.
    pub id: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub person_email: Option<String>,
}

/// A webhook notification delivered by the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookNotification {
    /// `messages` or `attachmentActions`.
    pub resource: String,
    /// Only `created` is subscribed to.
    pub event: String,
    pub data: NotificationData,
}

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Webex. Implementing this trait allows different chat services to be used
/// with the bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the email address of the bot.
    ///
    /// Used to ignore the bot's own messages.
    fn bot_email(&self) -> &str;

    /// Get the display name of the bot.
    ///
    /// Used to strip the @mention from messages sent in group spaces.
    fn bot_display_name(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This registers webhooks with the chat platform and serves incoming
    /// notifications until shutdown.
    async fn start(&self) -> Void;

    /// Fetch a message by ID.
    async fn get_message(&self, message_id: &str) -> Res<ChatMessage>;

    /// Fetch a card submission by ID.
    async fn get_attachment_action(&self, action_id: &str) -> Res<AttachmentAction>;

    /// Look up the primary email address of a person.
    async fn get_person_email(&self, person_id: &str) -> Res<String>;

    /// Post a reply into a room.
    async fn send_response(&self, room_id: &str, response: &BotResponse) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_notification() {
        let body = r#"{
            "id": "Y2lzY29zcGFyazovL3VzL1dFQkhPT0sv",
            "name": "incident-response-bot",
            "resource": "messages",
            "event": "created",
            "data": {
                "id": "msg-1",
                "roomId": "room-1",
                "roomType": "group",
                "personId": "person-1",
                "personEmail": "analyst@example.com",
                "created": "2024-05-10T11:32:09.000Z"
            }
        }"#;

        let notification: WebhookNotification = serde_json::from_str(body).unwrap();

        assert_eq!(notification.resource, "messages");
        assert_eq!(notification.event, "created");
        assert_eq!(notification.data.id, "msg-1");
        assert_eq!(notification.data.person_email.as_deref(), Some("analyst@example.com"));
    }

    #[test]
    fn test_attachment_action_inputs() {
        let body = r#"{
            "id": "action-1",
            "type": "submit",
            "messageId": "msg-9",
            "roomId": "room-1",
            "personId": "person-1",
            "inputs": {
                "callback_keyword": "actions",
                "requested_action": "notify user",
                "target_computer": "PC-1",
                "user_email_addr": "jdoe@example.com"
            }
        }"#;

        let action: AttachmentAction = serde_json::from_str(body).unwrap();

        assert_eq!(action.person_id, "person-1");
        assert_eq!(action.inputs.callback_keyword.as_deref(), Some("actions"));
        assert_eq!(action.inputs.requested_action, "notify user");
        assert_eq!(action.inputs.user_email_addr.as_deref(), Some("jdoe@example.com"));
    }

    #[test]
    fn test_message_room_type() {
        let message: ChatMessage = serde_json::from_str(r#"{"id":"m","roomId":"r","roomType":"direct","personEmail":"a@b.c"}"#).unwrap();

        assert!(!message.is_group());
        assert_eq!(message.text, "");
    }
}
