//! Async driver tying a [`Conversation`] to the backend API and channel.

use crate::api::ChatApi;
use crate::conversation::{Conversation, StreamOutcome};
use crate::error::{ApiError, ChannelError, IalabCoreError};
use ialab_rs_config::ModelDefaults;
use ialab_rs_protocol::{
    ChannelMessage, LoadModelRequest, Message, MessageContent, ModelsAndFormats, SaveHistoryRequest,
    StreamEvent, TurnId, UserInputRequest,
};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// What happened to a submitted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSubmission {
    /// Blank input or a turn already in flight; nothing was sent.
    Ignored,
    /// Backend accepted the request; the reply will stream in.
    Sent(TurnId),
    /// Backend rejected the request; the error banner is raised.
    Failed(TurnId),
}

/// One open chat bound to a backend.
pub struct ChatSession {
    conversation: Conversation,
    api: Arc<dyn ChatApi>,
    model_defaults: ModelDefaults,
}

impl ChatSession {
    pub fn new(conversation: Conversation, api: Arc<dyn ChatApi>) -> Self {
        Self {
            conversation,
            api,
            model_defaults: ModelDefaults::default(),
        }
    }

    /// Use these parameters for `load_model` instead of the defaults.
    pub fn with_model_defaults(mut self, defaults: ModelDefaults) -> Self {
        self.model_defaults = defaults;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Append the user message and send the turn.
    ///
    /// A successful send triggers a background save of the chat.
    pub async fn submit_user_turn(&mut self, input: impl Into<MessageContent>) -> TurnSubmission {
        let Some(prepared) = self.conversation.begin_user_turn(input) else {
            return TurnSubmission::Ignored;
        };
        self.send_prepared(prepared.turn_id, &prepared.request).await
    }

    /// Re-send the last request after a rejected send.
    pub async fn retry_last_turn(&mut self) -> TurnSubmission {
        let Some(prepared) = self.conversation.retry_last_turn() else {
            return TurnSubmission::Ignored;
        };
        self.send_prepared(prepared.turn_id, &prepared.request).await
    }

    async fn send_prepared(
        &mut self,
        turn_id: TurnId,
        request: &UserInputRequest,
    ) -> TurnSubmission {
        match self.api.send_user_input(request).await {
            Ok(()) => {
                debug!("user input accepted (turn_id={})", turn_id);
                self.persist();
                TurnSubmission::Sent(turn_id)
            }
            Err(err) => {
                self.conversation.fail_turn(turn_id, &err);
                TurnSubmission::Failed(turn_id)
            }
        }
    }

    /// Feed one stream event; committed replies are saved in the background.
    pub fn on_stream_event(&mut self, event: &StreamEvent) -> StreamOutcome {
        let outcome = self.conversation.apply_stream_event(event);
        if matches!(outcome, StreamOutcome::Committed(_)) {
            self.persist();
        }
        outcome
    }

    /// Route a channel event; returns `None` for events the conversation ignores.
    pub fn handle_channel_message(&mut self, message: &ChannelMessage) -> Option<StreamOutcome> {
        match message {
            ChannelMessage::ResponseDelta(event) => Some(self.on_stream_event(event)),
            ChannelMessage::ResponseStopped => {
                debug!("backend acknowledged stop");
                None
            }
            ChannelMessage::ConsoleOutput(_) => None,
        }
    }

    /// Stop locally at once and ask the backend to stop in the background.
    pub fn stop_active_turn(&mut self) -> Option<TurnId> {
        let turn_id = self.conversation.stop_active_turn()?;
        self.request_backend_stop(turn_id);
        Some(turn_id)
    }

    /// End the active turn after the receiver skipped `skipped` events.
    ///
    /// The reply can no longer be reassembled, so the turn fails with a
    /// notice and the backend is asked to stop generating.
    pub fn on_channel_lagged(&mut self, skipped: u64) -> Option<Message> {
        let (turn_id, notice) = self.conversation.interrupt_turn(skipped)?;
        self.request_backend_stop(turn_id);
        Some(notice)
    }

    fn request_backend_stop(&self, turn_id: TurnId) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(err) = api.stop_response().await {
                warn!("stop request failed (turn_id={}): {}", turn_id, err);
            }
        });
    }

    /// Pump channel events until the active turn ends.
    ///
    /// Skipped events fail the turn and surface as [`ChannelError::Lagged`].
    pub async fn drive_turn(
        &mut self,
        events: &mut broadcast::Receiver<ChannelMessage>,
    ) -> Result<(), IalabCoreError> {
        while self.conversation.is_loading() {
            match events.recv().await {
                Ok(message) => {
                    self.handle_channel_message(&message);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("channel lagged, events skipped (count={})", skipped);
                    self.on_channel_lagged(skipped);
                    return Err(ChannelError::Lagged(skipped).into());
                }
                Err(RecvError::Closed) => return Err(ChannelError::Closed.into()),
            }
        }
        Ok(())
    }

    pub fn reset_conversation(&mut self) {
        self.conversation.reset();
    }

    /// Names of stored chats.
    pub async fn list_chats(&self) -> Result<Vec<String>, ApiError> {
        self.api.list_chats().await
    }

    /// Replace the transcript with a stored chat.
    pub async fn open_chat(&mut self, name: &str) -> Result<(), IalabCoreError> {
        if self.conversation.is_loading() {
            return Err(IalabCoreError::TurnInProgress);
        }
        let messages = self.api.load_chat(name).await?;
        info!("chat opened (name={}, count={})", name, messages.len());
        self.conversation.load_messages(name, messages);
        Ok(())
    }

    /// Delete a stored chat, clearing the transcript if it is the open one.
    pub async fn delete_chat(&mut self, name: &str) -> Result<(), ApiError> {
        self.api.delete_chat(name).await?;
        if self.conversation.chat_name() == Some(name) {
            self.conversation.reset();
        }
        Ok(())
    }

    pub async fn list_models(&self) -> Result<ModelsAndFormats, ApiError> {
        self.api.models_and_formats().await
    }

    /// Load a model with the session's defaults and the current system prompt.
    pub async fn load_model(
        &self,
        model_path: &str,
        format: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = LoadModelRequest {
            model_path: model_path.to_string(),
            format: format.unwrap_or(self.model_defaults.format.as_str()).to_string(),
            temperature: self.model_defaults.temperature,
            gpu_layers: self.model_defaults.gpu_layers,
            context: self.model_defaults.context,
            system_message: self.conversation.system_prompt().to_string(),
        };
        info!(
            "loading model (path={}, format={})",
            request.model_path, request.format
        );
        self.api.load_model(&request).await
    }

    pub async fn unload_model(&self) -> Result<(), ApiError> {
        self.api.unload_model().await
    }

    /// Save the transcript in the background; failures are only logged.
    fn persist(&self) {
        let Some(name) = self.conversation.chat_name() else {
            return;
        };
        let request = SaveHistoryRequest {
            nombre_chat: name.to_string(),
            historial: self.conversation.messages().to_vec(),
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(err) = api.save_chat(&request).await {
                warn!("chat save failed (name={}): {}", request.nombre_chat, err);
            }
        });
    }
}
