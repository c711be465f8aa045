//! Real-time channel carrying streamed responses.

mod event_bus;
mod ws;

pub use event_bus::EventBus;
pub use ws::WsChannel;

use crate::error::ChannelError;
use async_trait::async_trait;
use ialab_rs_protocol::ChannelMessage;
use tokio::sync::broadcast;

/// Events buffered per subscriber; replies arrive one event per token.
pub(crate) const CHANNEL_BUFFER: usize = 4096;

/// Bidirectional event channel between the backend and the conversation.
///
/// Subscribers receive every named event and filter by variant.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    async fn connect(&self) -> Result<(), ChannelError>;

    async fn disconnect(&self);

    /// Receive every event delivered after this call.
    fn subscribe(&self) -> broadcast::Receiver<ChannelMessage>;

    /// Send an event toward the other side.
    async fn emit(&self, message: ChannelMessage) -> Result<(), ChannelError>;
}
