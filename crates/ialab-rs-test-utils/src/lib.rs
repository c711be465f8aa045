//! Test helpers shared across IALab crates.

pub mod api;
pub mod stream;

pub use api::{ApiCall, FailingApi, RecordingApi};
pub use stream::{reply_events, settle};
