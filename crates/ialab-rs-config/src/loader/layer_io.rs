//! Reading `ialab.json5` layers from disk.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LoadedLayer,
    SchemaMode, schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read one layer file.
///
/// A missing file yields `None` unless the layer is `required`; runtime layers
/// named on the command line must exist.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
    required: bool,
) -> Result<Option<LoadedLayer>, ConfigError> {
    if !required && !path.exists() {
        debug!(
            "skipping absent layer (source={}, path={})",
            source.name(),
            path.display()
        );
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    let label = format!("{}({})", source.name(), path.display());
    schema::validate_layer_schema(&value, SchemaMode::Partial, &label)?;
    debug!(
        "layer read (source={}, keys={})",
        source.name(),
        value.as_object().map_or(0, |map| map.len())
    );
    Ok(Some(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    }))
}

/// Default system config path on Unix; None elsewhere.
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(super::SYSTEM_CONFIG_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// `~/.ialab/ialab.json5`, when a home directory is known.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    let home = UserDirs::new()?.home_dir().to_path_buf();
    Some(home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE))
}
