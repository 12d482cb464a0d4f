//! Webex implementation of [`GenericChatClient`].
//!
//! Replies and lookups go through the Webex REST API. Inbound events arrive as
//! webhook notifications on an axum listener and are queued for a single worker,
//! so commands run one at a time in arrival order.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{BotResponse, Res, Void},
    },
    card::CardAttachment,
    command::CommandRegistry,
    interaction::{self, EVENT_CREATED, RESOURCE_ATTACHMENT_ACTIONS, RESOURCE_MESSAGES, access::ApprovedSenders},
    service::http::{handle_response, join_url},
};

use super::{AttachmentAction, ChatClient, ChatMessage, GenericChatClient, WebhookNotification, signature};

/// Notifications that may wait for the worker before deliveries start to block.
const QUEUE_CAPACITY: usize = 64;

/// Path of the liveness check.
pub const HEALTH_PATH: &str = "/health";

// Extra methods on `ChatClient` applied by the Webex implementation.

impl ChatClient {
    /// Creates a new Webex chat client.
    pub async fn webex(config: &Config, commands: CommandRegistry) -> Res<Self> {
        let client = WebexChatClient::new(config, commands).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<WebexChatClient> for ChatClient {
    fn from(client: WebexChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[serde(default)]
    emails: Vec<String>,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct WebhookList {
    #[serde(default)]
    items: Vec<Webhook>,
}

#[derive(Debug, Deserialize)]
struct Webhook {
    id: String,
    #[serde(default)]
    name: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    name: &'a str,
    target_url: &'a str,
    resource: &'a str,
    event: &'a str,
    secret: Option<&'a str>,
}

/// The body of a `POST /messages` request.
///
/// Text replies are sent as markdown; cards carry their fallback as plain text.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage<'a> {
    room_id: &'a str,
    text: Option<&'a str>,
    markdown: Option<&'a str>,
    attachments: Option<Vec<&'a CardAttachment>>,
}

impl<'a> OutgoingMessage<'a> {
    pub fn new(room_id: &'a str, response: &'a BotResponse) -> Self {
        match response {
            BotResponse::Text { text } => Self {
                room_id,
                text: None,
                markdown: Some(text),
                attachments: None,
            },
            BotResponse::Card { text, attachment } => Self {
                room_id,
                text: Some(text),
                markdown: None,
                attachments: Some(vec![attachment]),
            },
        }
    }
}

// Structs.

/// Webex client implementation.
#[derive(Clone)]
pub struct WebexChatClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    bot_email: String,
    bot_display_name: String,
    webhook_url: String,
    webhook_name: String,
    webhook_path: String,
    webhook_secret: Option<String>,
    bind_addr: String,
    commands: CommandRegistry,
    senders: ApprovedSenders,
}

impl WebexChatClient {
    /// Create a new Webex chat client.
    #[instrument(name = "WebexChatClient::new", skip_all)]
    pub async fn new(config: &Config, commands: CommandRegistry) -> Res<Self> {
        let mut client = Self {
            http: reqwest::Client::new(),
            api_url: config.webex_api_url.clone(),
            token: config.webex_teams_access_token.clone(),
            bot_email: String::new(),
            bot_display_name: String::new(),
            webhook_url: config.webex_webhook_url.clone(),
            webhook_name: config.webex_webhook_name.clone(),
            webhook_path: config.webex_webhook_path.clone(),
            webhook_secret: config.webex_webhook_secret.clone().filter(|s| !s.is_empty()),
            bind_addr: config.webex_bind_addr.clone(),
            commands,
            senders: ApprovedSenders::from_config(config),
        };

        // Get the bot's identity.

        let me: Person = handle_response(client.get("people/me").send().await?).await?;

        client.bot_email = me.emails.into_iter().next().ok_or_else(|| anyhow::anyhow!("The Webex bot account has no email address."))?;
        client.bot_display_name = me.display_name;

        info!("Webex bot: {} ({})", client.bot_display_name, client.bot_email);

        if client.senders.is_restricted() {
            info!("Only approved senders may run commands.");
        } else {
            warn!("No approved users or domains configured; everyone may run commands.");
        }

        Ok(client)
    }

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.get(join_url(&self.api_url, endpoint)).bearer_auth(&self.token)
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.post(join_url(&self.api_url, endpoint)).bearer_auth(&self.token)
    }

    fn delete(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http.delete(join_url(&self.api_url, endpoint)).bearer_auth(&self.token)
    }

    /// Replace the bot's webhooks with fresh ones pointing at this listener.
    #[instrument(skip(self))]
    async fn register_webhooks(&self) -> Void {
        let existing: WebhookList = handle_response(self.get("webhooks").send().await?).await?;

        for webhook in existing.items.iter().filter(|webhook| webhook.name == self.webhook_name) {
            let response = self.delete(&format!("webhooks/{}", webhook.id)).send().await?;

            if response.status().is_success() {
                info!("Deleted stale webhook {}", webhook.id);
            } else {
                warn!("Failed to delete stale webhook {}: {}", webhook.id, response.status());
            }
        }

        for resource in [RESOURCE_MESSAGES, RESOURCE_ATTACHMENT_ACTIONS] {
            let request = WebhookRequest {
                name: &self.webhook_name,
                target_url: &self.webhook_url,
                resource,
                event: EVENT_CREATED,
                secret: self.webhook_secret.as_deref(),
            };

            let created: Webhook = handle_response(self.post("webhooks").json(&request).send().await?).await?;

            info!("Registered `{}` webhook {} -> {}", resource, created.id, self.webhook_url);
        }

        Ok(())
    }
}

#[async_trait]
impl GenericChatClient for WebexChatClient {
    fn bot_email(&self) -> &str {
        &self.bot_email
    }

    fn bot_display_name(&self) -> &str {
        &self.bot_display_name
    }

    async fn start(&self) -> Void {
        self.register_webhooks().await?;

        // Start the worker.

        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);

        let worker = tokio::spawn(
            run_worker(receiver, ChatClient::from(self.clone()), self.commands.clone(), self.senders.clone()).in_current_span(),
        );

        // Serve webhook notifications until Ctrl-C.

        let app = webhook_router(&self.webhook_path, self.webhook_secret.clone(), sender);
        let listener = TcpListener::bind(&self.bind_addr).await?;

        info!("Listening for Webex notifications on {}{}", self.bind_addr, self.webhook_path);

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        // The router (and with it the queue sender) is gone; let the worker drain.
        worker.await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_message(&self, message_id: &str) -> Res<ChatMessage> {
        handle_response(self.get(&format!("messages/{message_id}")).send().await?).await
    }

    #[instrument(skip(self))]
    async fn get_attachment_action(&self, action_id: &str) -> Res<AttachmentAction> {
        handle_response(self.get(&format!("attachment/actions/{action_id}")).send().await?).await
    }

    #[instrument(skip(self))]
    async fn get_person_email(&self, person_id: &str) -> Res<String> {
        let person: Person = handle_response(self.get(&format!("people/{person_id}")).send().await?).await?;

        person.emails.into_iter().next().ok_or_else(|| anyhow::anyhow!("Person `{person_id}` has no email address."))
    }

    #[instrument(skip(self, response))]
    async fn send_response(&self, room_id: &str, response: &BotResponse) -> Void {
        let message = OutgoingMessage::new(room_id, response);

        let _: serde_json::Value = handle_response(self.post("messages").json(&message).send().await?)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Webhook listener.

#[derive(Clone)]
struct WebhookState {
    queue: mpsc::Sender<WebhookNotification>,
    secret: Option<String>,
}

/// Build the listener routes: the webhook endpoint at `path` and a health check.
///
/// Accepted notifications are pushed onto `queue`. When `secret` is set, every
/// notification must carry a valid `X-Spark-Signature`.
pub fn webhook_router(path: &str, secret: Option<String>, queue: mpsc::Sender<WebhookNotification>) -> Router {
    Router::new()
        .route(path, post(handle_webhook))
        .route(HEALTH_PATH, get(health))
        .with_state(WebhookState { queue, secret })
}

#[instrument(name = "webex.webhook", skip_all)]
async fn handle_webhook(State(state): State<WebhookState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if let Some(secret) = &state.secret {
        let sig = headers.get(signature::SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

        match sig {
            Some(sig) if signature::verify(secret, &body, sig) => {}
            Some(_) => {
                warn!("Invalid Webex webhook signature");
                return StatusCode::UNAUTHORIZED;
            }
            None => {
                warn!("Missing X-Spark-Signature header");
                return StatusCode::UNAUTHORIZED;
            }
        }
    }

    let notification = match serde_json::from_slice::<WebhookNotification>(&body) {
        Ok(notification) => notification,
        Err(e) => {
            warn!("Malformed webhook notification: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    info!("Received {} {} notification", notification.resource, notification.event);

    if state.queue.send(notification).await.is_err() {
        error!("Notification worker is not running");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::OK
}

async fn health() -> &'static str {
    "OK"
}

/// Handle queued notifications one at a time until the queue closes.
pub async fn run_worker(mut queue: mpsc::Receiver<WebhookNotification>, chat: ChatClient, commands: CommandRegistry, senders: ApprovedSenders) {
    while let Some(notification) = queue.recv().await {
        if let Err(err) = interaction::handle_notification(notification, &chat, &commands, &senders).await {
            error!("Error while handling: {:#}", err);
        }
    }

    info!("Notification queue closed.");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }

    info!("Shutting down ...");
}

// Tests.
