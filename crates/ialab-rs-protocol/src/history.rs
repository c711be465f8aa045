//! Chat history persistence payloads.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /actualizar_historial`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveHistoryRequest {
    /// Name of the chat being saved.
    pub nombre_chat: String,
    /// Full message list of the chat.
    pub historial: Vec<Message>,
}

/// Response of `GET /recuperar_historial`.
///
/// Without a chat name the backend lists saved chat names; with one it returns
/// that chat's messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChatHistoryListing {
    /// Saved chat names.
    Names(Vec<String>),
    /// Messages of a single chat.
    Messages(Vec<Message>),
}

impl ChatHistoryListing {
    /// Chat names, or an empty list when the response carried messages.
    pub fn into_names(self) -> Vec<String> {
        match self {
            ChatHistoryListing::Names(names) => names,
            ChatHistoryListing::Messages(_) => Vec::new(),
        }
    }

    /// Messages, or an empty list when the response carried names.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            ChatHistoryListing::Names(_) => Vec::new(),
            ChatHistoryListing::Messages(messages) => messages,
        }
    }
}
