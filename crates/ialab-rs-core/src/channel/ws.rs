//! WebSocket transport for the real-time channel.
//!
//! Every frame is a JSON [`ChannelMessage`] envelope. A reader task fans
//! incoming frames out to subscribers; a writer task drains outgoing events.

use super::{CHANNEL_BUFFER, RealtimeChannel};
use crate::error::ChannelError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use ialab_rs_protocol::ChannelMessage;
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;

struct Connection {
    outgoing: mpsc::UnboundedSender<WsMessage>,
    reader: JoinHandle<()>,
}

/// Client side of the backend's WebSocket channel.
pub struct WsChannel {
    url: String,
    events: broadcast::Sender<ChannelMessage>,
    connection: Mutex<Option<Connection>>,
}

impl WsChannel {
    pub fn new(url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_BUFFER);
        Self {
            url: url.into(),
            events,
            connection: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the socket is open and still being read.
    pub fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .as_ref()
            .is_some_and(|conn| !conn.reader.is_finished())
    }
}

#[async_trait]
impl RealtimeChannel for WsChannel {
    async fn connect(&self) -> Result<(), ChannelError> {
        if self.is_connected() {
            return Ok(());
        }
        let (socket, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        info!("realtime channel connected (url={})", self.url);
        let (mut sink, mut stream) = socket.split();

        let events = self.events.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => {
                        match serde_json::from_str::<ChannelMessage>(&text) {
                            Ok(message) => {
                                let _ = events.send(message);
                            }
                            Err(err) => warn!("dropping malformed channel frame: {}", err),
                        }
                    }
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!("realtime channel read failed: {}", err);
                        break;
                    }
                }
            }
            debug!("realtime channel reader stopped");
        });

        let (outgoing, mut pending) = mpsc::unbounded_channel::<WsMessage>();
        tokio::spawn(async move {
            while let Some(frame) = pending.recv().await {
                if let Err(err) = sink.send(frame).await {
                    warn!("realtime channel write failed: {}", err);
                    return;
                }
            }
            let _ = sink.close().await;
        });

        let previous = self
            .connection
            .lock()
            .replace(Connection { outgoing, reader });
        if let Some(previous) = previous {
            previous.reader.abort();
        }
        Ok(())
    }

    async fn disconnect(&self) {
        let Some(conn) = self.connection.lock().take() else {
            return;
        };
        // Dropping the sender lets the writer send a close frame.
        drop(conn.outgoing);
        conn.reader.abort();
        info!("realtime channel disconnected (url={})", self.url);
    }

    fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.events.subscribe()
    }

    async fn emit(&self, message: ChannelMessage) -> Result<(), ChannelError> {
        let frame = WsMessage::Text(serde_json::to_string(&message)?);
        let guard = self.connection.lock();
        let conn = guard.as_ref().ok_or(ChannelError::NotConnected)?;
        conn.outgoing
            .send(frame)
            .map_err(|err| ChannelError::Send(err.to_string()))
    }
}
