//! reqwest-backed implementation of [`ChatApi`].

use super::ChatApi;
use crate::error::ApiError;
use async_trait::async_trait;
use ialab_rs_config::BackendConfig;
use ialab_rs_protocol::{
    ChatHistoryListing, LoadModelRequest, Message, ModelsAndFormats, SaveHistoryRequest,
    UserInputRequest,
};
use log::debug;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_INPUT: &str = "user_input";
const STOP_RESPONSE: &str = "stop_response";
const RECUPERAR_HISTORIAL: &str = "recuperar_historial";
const ACTUALIZAR_HISTORIAL: &str = "actualizar_historial";
const ELIMINAR_HISTORIAL: &str = "eliminar_historial";
const MODELS_AND_FORMATS: &str = "api/models-and-formats";
const LOAD_MODEL: &str = "load_model";
const UNLOAD_MODEL: &str = "unload_model";

/// HTTP client for the chat backend.
#[derive(Clone, Debug)]
pub struct HttpChatApi {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpChatApi {
    /// Build a client from backend settings.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client".to_string(),
                source,
            })?;
        Ok(Self::with_client(inner, &config.base_url))
    }

    /// Wrap an existing client.
    pub fn with_client(inner: reqwest::Client, base_url: &str) -> Self {
        Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!("backend request (endpoint={})", endpoint);
        let response = request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(endpoint, request).await?;
        response.json().await.map_err(|err| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }

    async fn history_listing(&self, name: Option<&str>) -> Result<ChatHistoryListing, ApiError> {
        let mut request = self.inner.get(self.url(RECUPERAR_HISTORIAL));
        if let Some(name) = name {
            request = request.query(&[("nombre_chat", name)]);
        }
        self.send_json(RECUPERAR_HISTORIAL, request).await
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_user_input(&self, request: &UserInputRequest) -> Result<(), ApiError> {
        let builder = self.inner.post(self.url(USER_INPUT)).json(request);
        self.send(USER_INPUT, builder).await?;
        Ok(())
    }

    async fn stop_response(&self) -> Result<(), ApiError> {
        let builder = self.inner.post(self.url(STOP_RESPONSE));
        self.send(STOP_RESPONSE, builder).await?;
        Ok(())
    }

    async fn list_chats(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.history_listing(None).await?.into_names())
    }

    async fn load_chat(&self, name: &str) -> Result<Vec<Message>, ApiError> {
        Ok(self.history_listing(Some(name)).await?.into_messages())
    }

    async fn save_chat(&self, request: &SaveHistoryRequest) -> Result<(), ApiError> {
        let builder = self.inner.post(self.url(ACTUALIZAR_HISTORIAL)).json(request);
        self.send(ACTUALIZAR_HISTORIAL, builder).await?;
        Ok(())
    }

    async fn delete_chat(&self, name: &str) -> Result<(), ApiError> {
        let builder = self
            .inner
            .delete(self.url(ELIMINAR_HISTORIAL))
            .query(&[("nombre_chat", name)]);
        self.send(ELIMINAR_HISTORIAL, builder).await?;
        Ok(())
    }

    async fn models_and_formats(&self) -> Result<ModelsAndFormats, ApiError> {
        let builder = self.inner.get(self.url(MODELS_AND_FORMATS));
        self.send_json(MODELS_AND_FORMATS, builder).await
    }

    async fn load_model(&self, request: &LoadModelRequest) -> Result<(), ApiError> {
        let form = request
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let builder = self.inner.post(self.url(LOAD_MODEL)).multipart(form);
        self.send(LOAD_MODEL, builder).await?;
        Ok(())
    }

    async fn unload_model(&self) -> Result<(), ApiError> {
        let builder = self.inner.post(self.url(UNLOAD_MODEL));
        self.send(UNLOAD_MODEL, builder).await?;
        Ok(())
    }
}
