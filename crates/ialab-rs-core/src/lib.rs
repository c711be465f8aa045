//! Conversation core for the IALab chat client.
//!
//! This crate owns the streaming aggregator that turns backend deltas into
//! committed messages, the HTTP and real-time transports it talks through, and
//! the session driver that wires them together.

pub mod api;
pub mod channel;
pub mod conversation;
pub mod error;
pub mod render;
pub mod session;

pub use api::{ChatApi, HttpChatApi};
pub use channel::{EventBus, RealtimeChannel, WsChannel};
pub use conversation::{Conversation, Notices, PreparedTurn, StreamOutcome, TurnPhase};
pub use error::{ApiError, ChannelError, ErrorBanner, IalabCoreError, NetworkErrorKind};
pub use render::segment_message;
pub use session::{ChatSession, TurnSubmission};
