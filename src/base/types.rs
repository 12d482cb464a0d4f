use serde::{Deserialize, Serialize};

use crate::card::CardAttachment;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The reply a command hands back to the dispatcher for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BotResponse {
    /// A plain (markdown) text reply.
    Text { text: String },
    /// A rich card, with `text` used as the fallback for clients that cannot render it.
    Card { text: String, attachment: CardAttachment },
}

impl BotResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn card(text: impl Into<String>, attachment: CardAttachment) -> Self {
        Self::Card { text: text.into(), attachment }
    }

    /// The text of the reply (the fallback text, for cards).
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Card { text, .. } => text,
        }
    }

    pub fn attachment(&self) -> Option<&CardAttachment> {
        match self {
            Self::Text { .. } => None,
            Self::Card { attachment, .. } => Some(attachment),
        }
    }
}

/// Inputs submitted from an adaptive card action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInputs {
    /// The command keyword the submission should be routed to.
    #[serde(default)]
    pub callback_keyword: Option<String>,
    #[serde(default)]
    pub requested_action: String,
    #[serde(default)]
    pub target_computer: String,
    #[serde(default)]
    pub user_email_addr: Option<String>,
}

/// A single command invocation, created per inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// The keyword that matched.
    pub keyword: String,
    /// The message text with the keyword stripped.
    pub argument: String,
    /// The submitted card payload, if this invocation came from a card action.
    pub attachment: Option<ActionInputs>,
}

impl Invocation {
    pub fn message(keyword: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            argument: argument.into(),
            attachment: None,
        }
    }

    pub fn submission(keyword: impl Into<String>, inputs: ActionInputs) -> Self {
        Self {
            keyword: keyword.into(),
            argument: String::new(),
            attachment: Some(inputs),
        }
    }
}
