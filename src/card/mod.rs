//! Adaptive Card document model.
//!
//! Only the subset of the schema that the bot renders is modelled:
//! - Text blocks, fact sets, column sets, action sets, and text inputs.
//! - Show-card, open-url, and submit actions.
//!
//! Cards are delivered wrapped in a [`CardAttachment`], which carries the
//! content-type tag that chat clients use to pick a renderer.

pub mod format;

use serde::Serialize;
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Content type for adaptive card attachments.
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

/// Schema URL for top-level cards.
pub const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

/// Schema version rendered by the bot.
pub const ADAPTIVE_CARD_VERSION: &str = "1.2";

// Elements.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextSize {
    Small,
    Default,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextWeight {
    Lighter,
    Default,
    Bolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerStyle {
    Default,
    Emphasis,
}

/// A title/value pair inside a fact set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub title: String,
    pub value: String,
}

impl Fact {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// A column inside a column set.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Column")]
pub struct Column {
    pub style: Option<ContainerStyle>,
    pub items: Vec<Element>,
}

impl Column {
    pub fn emphasis(items: Vec<Element>) -> Self {
        Self {
            style: Some(ContainerStyle::Emphasis),
            items,
        }
    }
}

/// A card body element.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    TextBlock {
        text: String,
        size: Option<TextSize>,
        weight: Option<TextWeight>,
        wrap: Option<bool>,
    },
    FactSet {
        facts: Vec<Fact>,
    },
    ColumnSet {
        columns: Vec<Column>,
    },
    ActionSet {
        actions: Vec<Action>,
    },
    #[serde(rename = "Input.Text")]
    InputText {
        id: String,
        placeholder: Option<String>,
    },
}

impl Element {
    /// A plain, wrapping text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextBlock {
            text: text.into(),
            size: None,
            weight: None,
            wrap: Some(true),
        }
    }

    /// A medium, bold text block used as a card title.
    pub fn heading(text: impl Into<String>) -> Self {
        Self::TextBlock {
            text: text.into(),
            size: Some(TextSize::Medium),
            weight: Some(TextWeight::Bolder),
            wrap: Some(true),
        }
    }

    pub fn facts(facts: Vec<Fact>) -> Self {
        Self::FactSet { facts }
    }

    pub fn columns(columns: Vec<Column>) -> Self {
        Self::ColumnSet { columns }
    }

    pub fn input_text(id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self::InputText {
            id: id.into(),
            placeholder: Some(placeholder.into()),
        }
    }

    /// The text of a text block, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::TextBlock { text, .. } => Some(text),
            _ => None,
        }
    }
}

// Actions.

/// A card action.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Expands an embedded card in place.
    #[serde(rename = "Action.ShowCard")]
    ShowCard { title: String, card: Box<AdaptiveCard> },
    #[serde(rename = "Action.OpenUrl")]
    OpenUrl { title: String, url: String },
    /// Submits the card's inputs, merged with `data`, back to the bot.
    #[serde(rename = "Action.Submit")]
    Submit { title: String, id: Option<String>, data: Value },
}

impl Action {
    pub fn show_card(title: impl Into<String>, card: AdaptiveCard) -> Self {
        Self::ShowCard {
            title: title.into(),
            card: Box::new(card),
        }
    }

    pub fn open_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::OpenUrl {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn submit(title: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Self::Submit {
            title: title.into(),
            id: Some(id.into()),
            data,
        }
    }
}

// Cards.

/// An adaptive card.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "AdaptiveCard")]
pub struct AdaptiveCard {
    #[serde(rename = "$schema")]
    pub schema: Option<String>,
    pub version: String,
    pub body: Vec<Element>,
    pub actions: Vec<Action>,
}

impl Default for AdaptiveCard {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveCard {
    /// A top-level card.
    pub fn new() -> Self {
        Self {
            schema: Some(ADAPTIVE_CARD_SCHEMA.to_string()),
            version: ADAPTIVE_CARD_VERSION.to_string(),
            body: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// A card embedded in a show-card action.
    pub fn embedded() -> Self {
        Self { schema: None, ..Self::new() }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.body.push(element);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn push(&mut self, element: Element) {
        self.body.push(element);
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Wrap the card for delivery.
    pub fn into_attachment(self) -> CardAttachment {
        CardAttachment {
            content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
            content: self,
        }
    }
}

/// The delivery envelope for a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttachment {
    pub content_type: String,
    pub content: AdaptiveCard,
}

// Tests.
