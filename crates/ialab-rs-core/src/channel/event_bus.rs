//! In-process channel for embedding and tests.

use super::{CHANNEL_BUFFER, RealtimeChannel};
use crate::error::ChannelError;
use async_trait::async_trait;
use ialab_rs_protocol::ChannelMessage;
use log::debug;
use tokio::sync::broadcast;

/// Broadcast-backed channel where every emitted event reaches all subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ChannelMessage>,
}

impl EventBus {
    /// Create a new event bus with the given channel buffer size.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer);
        debug!("event bus initialized (buffer={})", buffer);
        Self { sender }
    }

    /// Publish without awaiting; events with no subscriber are dropped.
    pub fn publish(&self, message: ChannelMessage) {
        let _ = self.sender.send(message);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(CHANNEL_BUFFER)
    }
}

#[async_trait]
impl RealtimeChannel for EventBus {
    async fn connect(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn disconnect(&self) {}

    fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.sender.subscribe()
    }

    async fn emit(&self, message: ChannelMessage) -> Result<(), ChannelError> {
        self.publish(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ialab_rs_protocol::StreamEvent;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn emitted_events_reach_every_subscriber() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let event = ChannelMessage::ResponseDelta(StreamEvent::delta("hi"));
        bus.emit(event.clone()).await.expect("emit");
        assert_eq!(first.recv().await.expect("first"), event);
        assert_eq!(second.recv().await.expect("second"), event);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::default();
        bus.publish(ChannelMessage::ResponseStopped);
        let mut late = bus.subscribe();
        bus.publish(ChannelMessage::ConsoleOutput("ready".to_string()));
        assert_eq!(
            late.recv().await.expect("late"),
            ChannelMessage::ConsoleOutput("ready".to_string())
        );
    }
}
