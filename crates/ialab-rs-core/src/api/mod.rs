//! Backend HTTP API.

mod http;

pub use http::HttpChatApi;

use crate::error::ApiError;
use async_trait::async_trait;
use ialab_rs_protocol::{
    LoadModelRequest, Message, ModelsAndFormats, SaveHistoryRequest, UserInputRequest,
};

/// Calls the conversation core makes against the backend.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `POST /user_input`; the reply streams over the real-time channel.
    async fn send_user_input(&self, request: &UserInputRequest) -> Result<(), ApiError>;

    /// `POST /stop_response`.
    async fn stop_response(&self) -> Result<(), ApiError>;

    /// Names of stored chats.
    async fn list_chats(&self) -> Result<Vec<String>, ApiError>;

    /// Messages of one stored chat.
    async fn load_chat(&self, name: &str) -> Result<Vec<Message>, ApiError>;

    async fn save_chat(&self, request: &SaveHistoryRequest) -> Result<(), ApiError>;

    async fn delete_chat(&self, name: &str) -> Result<(), ApiError>;

    async fn models_and_formats(&self) -> Result<ModelsAndFormats, ApiError>;

    async fn load_model(&self, request: &LoadModelRequest) -> Result<(), ApiError>;

    async fn unload_model(&self) -> Result<(), ApiError>;
}
