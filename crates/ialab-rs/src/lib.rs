//! Public SDK surface for IALab.
//!
//! This crate re-exports the core building blocks and provides helpers that
//! keep client setup consistent between the CLI and embedders.

/// Re-export for convenience.
pub use ialab_rs_config as config;
pub use ialab_rs_core as core;
/// Re-export for convenience.
pub use ialab_rs_protocol as protocol;
/// Re-export for convenience.
pub use ialab_rs_render as render;

use ialab_rs_config::{ConfigError, IalabConfig, StringTable};
use ialab_rs_core::{ApiError, ChatSession, Conversation, HttpChatApi, Notices, WsChannel};
use std::sync::Arc;
use thiserror::Error;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}

/// Failure while assembling a client from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("string tables: {0}")]
    Strings(#[from] ConfigError),
    #[error("http client: {0}")]
    Api(#[from] ApiError),
}

/// Session and channel wired from one configuration.
pub struct Client {
    pub session: ChatSession,
    pub channel: WsChannel,
}

impl Client {
    /// Build an unconnected client; call `channel.connect()` before chatting.
    pub fn from_config(config: &IalabConfig) -> Result<Self, SetupError> {
        let strings = StringTable::from_config(&config.i18n)?;
        let notices = Notices::from_strings(&strings, &config.i18n.language);
        let conversation = Conversation::new(&config.chat, notices);
        let api = HttpChatApi::new(&config.backend)?;
        let session = ChatSession::new(conversation, Arc::new(api))
            .with_model_defaults(config.model.clone());
        let channel = WsChannel::new(config.backend.resolved_channel_url());
        Ok(Self { session, channel })
    }
}
