//! Wire protocol types shared between the IALab chat client and its backend.
//!
//! Field names follow the backend's JSON exactly (camelCase stream fields,
//! Spanish history endpoints), so every type here round-trips unchanged.

mod history;
mod model;

pub use history::{ChatHistoryListing, SaveHistoryRequest};
pub use model::{LoadModelRequest, ModelEntry, ModelsAndFormats};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation turn.
pub type TurnId = Uuid;
/// Unique identifier for a committed message.
pub type MessageId = String;

/// Channel event name carrying streamed response deltas.
pub const EVENT_RESPONSE_DELTA: &str = "response_delta";
/// Channel event name acknowledging a stopped response.
pub const EVENT_RESPONSE_STOPPED: &str = "response_stopped";
/// Channel event name carrying backend console output.
pub const EVENT_CONSOLE_OUTPUT: &str = "console_output";

/// Speaker role for a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt or client notice.
    System,
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Message body: plain text, or text with an attached image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text body.
    Text(String),
    /// Text plus optional inline image data (base64 or data URL).
    Rich {
        text: String,
        #[serde(rename = "imageData", default, skip_serializing_if = "Option::is_none")]
        image_data: Option<String>,
    },
}

impl MessageContent {
    /// Text portion of the content.
    pub fn text(&self) -> &str {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Rich { text, .. } => text,
        }
    }

    /// Attached image data, if any.
    pub fn image_data(&self) -> Option<&str> {
        match self {
            MessageContent::Text(_) => None,
            MessageContent::Rich { image_data, .. } => image_data.as_deref(),
        }
    }

    /// Whether the content carries non-blank text or an image.
    pub fn has_payload(&self) -> bool {
        !self.text().trim().is_empty() || self.image_data().is_some_and(|data| !data.is_empty())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        MessageContent::Text(value)
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        MessageContent::Text(value.to_string())
    }
}

/// Committed chat message as shown to the user and stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique id; empty when a stored record predates ids.
    #[serde(default)]
    pub id: MessageId,
    /// Role that produced the message.
    pub role: Role,
    /// Message body.
    pub content: MessageContent,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

/// Role/content pair sent to the backend as conversation context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Speaker role.
    pub role: Role,
    /// Message body.
    pub content: MessageContent,
}

impl HistoryEntry {
    /// Build a history entry.
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of `POST /user_input`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInputRequest {
    /// Full conversation history, system entry first.
    pub content: Vec<HistoryEntry>,
    /// Whether tool calling is enabled for this turn.
    pub tools: bool,
    /// Whether retrieval augmentation is enabled for this turn.
    pub rag: bool,
    /// Turn id the backend may echo on stream events.
    #[serde(rename = "turnId", default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<TurnId>,
}

/// Incremental response update delivered over the real-time channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamEvent {
    /// Generated text fragment (may be empty).
    #[serde(default)]
    pub content: String,
    /// Set on the final event of a turn.
    #[serde(default)]
    pub finished: bool,
    /// Prompt token cost, reported once per turn.
    #[serde(rename = "userTokens", default, skip_serializing_if = "Option::is_none")]
    pub user_tokens: Option<u64>,
    /// Tokens generated since the previous event.
    #[serde(
        rename = "assistantTokenCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assistant_token_count: Option<u64>,
    /// Marks `content` as an error description that ends the turn.
    #[serde(default)]
    pub error: bool,
    /// Turn the event belongs to, when the backend echoes it.
    #[serde(rename = "turnId", default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<TurnId>,
}

impl StreamEvent {
    /// Content-only delta.
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Final event, optionally carrying a last fragment.
    pub fn finished(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finished: true,
            ..Self::default()
        }
    }

    /// Error event with a description.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            error: true,
            ..Self::default()
        }
    }

    /// Attach a turn id.
    pub fn for_turn(mut self, turn_id: TurnId) -> Self {
        self.turn_id = Some(turn_id);
        self
    }
}

/// Named message carried by the real-time channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "event", content = "data")]
pub enum ChannelMessage {
    /// Streamed response delta.
    ResponseDelta(StreamEvent),
    /// Backend acknowledged a stop request.
    ResponseStopped,
    /// Backend console line for the developer console.
    ConsoleOutput(String),
}

impl ChannelMessage {
    /// Event name used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelMessage::ResponseDelta(_) => EVENT_RESPONSE_DELTA,
            ChannelMessage::ResponseStopped => EVENT_RESPONSE_STOPPED,
            ChannelMessage::ConsoleOutput(_) => EVENT_CONSOLE_OUTPUT,
        }
    }
}
