use async_trait::async_trait;
use ialab_rs_core::{ApiError, ChatApi};
use ialab_rs_protocol::{
    LoadModelRequest, Message, ModelsAndFormats, SaveHistoryRequest, UserInputRequest,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    UserInput(UserInputRequest),
    StopResponse,
    ListChats,
    LoadChat(String),
    SaveChat(SaveHistoryRequest),
    DeleteChat(String),
    ModelsAndFormats,
    LoadModel(LoadModelRequest),
    UnloadModel,
}

/// In-memory backend that records every call.
#[derive(Clone, Default)]
pub struct RecordingApi {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    chats: Arc<Mutex<BTreeMap<String, Vec<Message>>>>,
    models: ModelsAndFormats,
    user_input_error: Option<String>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, name: impl Into<String>, messages: Vec<Message>) -> Self {
        self.chats.lock().insert(name.into(), messages);
        self
    }

    pub fn with_models(mut self, models: ModelsAndFormats) -> Self {
        self.models = models;
        self
    }

    /// Reject every `user_input` call with `message`.
    pub fn rejecting_user_input(mut self, message: impl Into<String>) -> Self {
        self.user_input_error = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn user_inputs(&self) -> Vec<UserInputRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ApiCall::UserInput(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn saves(&self) -> Vec<SaveHistoryRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ApiCall::SaveChat(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stop_requests(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ApiCall::StopResponse))
            .count()
    }

    pub fn stored_chat(&self, name: &str) -> Option<Vec<Message>> {
        self.chats.lock().get(name).cloned()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn send_user_input(&self, request: &UserInputRequest) -> Result<(), ApiError> {
        self.record(ApiCall::UserInput(request.clone()));
        match &self.user_input_error {
            Some(message) => Err(ApiError::Other(message.clone())),
            None => Ok(()),
        }
    }

    async fn stop_response(&self) -> Result<(), ApiError> {
        self.record(ApiCall::StopResponse);
        Ok(())
    }

    async fn list_chats(&self) -> Result<Vec<String>, ApiError> {
        self.record(ApiCall::ListChats);
        Ok(self.chats.lock().keys().cloned().collect())
    }

    async fn load_chat(&self, name: &str) -> Result<Vec<Message>, ApiError> {
        self.record(ApiCall::LoadChat(name.to_string()));
        self.chats
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::Other(format!("chat not found: {name}")))
    }

    async fn save_chat(&self, request: &SaveHistoryRequest) -> Result<(), ApiError> {
        self.record(ApiCall::SaveChat(request.clone()));
        self.chats
            .lock()
            .insert(request.nombre_chat.clone(), request.historial.clone());
        Ok(())
    }

    async fn delete_chat(&self, name: &str) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteChat(name.to_string()));
        self.chats.lock().remove(name);
        Ok(())
    }

    async fn models_and_formats(&self) -> Result<ModelsAndFormats, ApiError> {
        self.record(ApiCall::ModelsAndFormats);
        Ok(self.models.clone())
    }

    async fn load_model(&self, request: &LoadModelRequest) -> Result<(), ApiError> {
        self.record(ApiCall::LoadModel(request.clone()));
        Ok(())
    }

    async fn unload_model(&self) -> Result<(), ApiError> {
        self.record(ApiCall::UnloadModel);
        Ok(())
    }
}

/// Backend where every call fails with the same message.
#[derive(Debug, Clone)]
pub struct FailingApi {
    message: String,
}

impl FailingApi {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, ApiError> {
        Err(ApiError::Other(self.message.clone()))
    }
}

#[async_trait]
impl ChatApi for FailingApi {
    async fn send_user_input(&self, _request: &UserInputRequest) -> Result<(), ApiError> {
        self.fail()
    }

    async fn stop_response(&self) -> Result<(), ApiError> {
        self.fail()
    }

    async fn list_chats(&self) -> Result<Vec<String>, ApiError> {
        self.fail()
    }

    async fn load_chat(&self, _name: &str) -> Result<Vec<Message>, ApiError> {
        self.fail()
    }

    async fn save_chat(&self, _request: &SaveHistoryRequest) -> Result<(), ApiError> {
        self.fail()
    }

    async fn delete_chat(&self, _name: &str) -> Result<(), ApiError> {
        self.fail()
    }

    async fn models_and_formats(&self) -> Result<ModelsAndFormats, ApiError> {
        self.fail()
    }

    async fn load_model(&self, _request: &LoadModelRequest) -> Result<(), ApiError> {
        self.fail()
    }

    async fn unload_model(&self) -> Result<(), ApiError> {
        self.fail()
    }
}
