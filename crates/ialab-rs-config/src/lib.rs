//! Configuration models, layered config loading, and localized string tables.
//!
//! This crate owns the IALab client config schema, its validation, the
//! layer-merging logic, and the immutable string tables injected into
//! components that emit user-facing text.

mod error;
mod loader;
mod model;
mod strings;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
/// Localized string tables with base-language fallback.
pub use strings::{StringTable, StringTableBuilder};
