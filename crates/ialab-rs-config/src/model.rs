//! Configuration schema for the IALab client.

use serde::{Deserialize, Serialize};

/// Root config for the IALab client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IalabConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub model: ModelDefaults,
    #[serde(default)]
    pub i18n: I18nConfig,
}

impl IalabConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> IalabConfigBuilder {
        IalabConfigBuilder::new()
    }
}

/// Builder for assembling an `IalabConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct IalabConfigBuilder {
    config: IalabConfig,
}

impl IalabConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: IalabConfig::default(),
        }
    }

    /// Replace the backend connection settings.
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.config.backend = backend;
        self
    }

    /// Replace the chat behaviour settings.
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Replace the default model load parameters.
    pub fn model(mut self, model: ModelDefaults) -> Self {
        self.config.model = model;
        self
    }

    /// Replace the localization settings.
    pub fn i18n(mut self, i18n: I18nConfig) -> Self {
        self.config.i18n = i18n;
        self
    }

    /// Finalize and return the built `IalabConfig`.
    pub fn build(self) -> IalabConfig {
        self.config
    }
}

/// Where the backend HTTP API and real-time channel live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Websocket URL of the real-time channel; derived from `base_url` when absent.
    #[serde(default)]
    pub channel_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            channel_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Websocket URL for the real-time channel.
    pub fn resolved_channel_url(&self) -> String {
        if let Some(url) = &self.channel_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{base}/ws")
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Conversation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// System prompt placed at the head of every conversation history.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Enable backend tool calling.
    #[serde(default)]
    pub tools: bool,
    /// Enable retrieval augmentation.
    #[serde(default)]
    pub rag: bool,
    /// Auto-dismiss delay for error banners; banners persist when unset.
    #[serde(default)]
    pub error_banner_timeout_ms: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            tools: false,
            rag: false,
            error_banner_timeout_ms: None,
        }
    }
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

/// Default parameters sent with `load_model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefaults {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub gpu_layers: u32,
    #[serde(default = "default_context")]
    pub context: u32,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            format: default_format(),
            temperature: default_temperature(),
            gpu_layers: 0,
            context: default_context(),
        }
    }
}

fn default_format() -> String {
    "chatml".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_context() -> u32 {
    2048
}

/// Localization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Selected UI language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Base language consulted when a lookup misses.
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,
    /// Directories holding `<language>/<namespace>.json5` string tables.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            fallback_language: default_fallback_language(),
            paths: Vec::new(),
        }
    }
}

fn default_language() -> String {
    "es".to_string()
}

fn default_fallback_language() -> String {
    "en".to_string()
}
