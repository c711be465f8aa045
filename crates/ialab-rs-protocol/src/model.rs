//! Model listing and loading payloads.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/models-and-formats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelsAndFormats {
    /// Models available on the backend.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    /// Chat formats the backend can apply.
    #[serde(default)]
    pub formats: Vec<String>,
}

/// Model entry, either a bare path or a path with its size in bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ModelEntry {
    /// Bare model path.
    Path(String),
    /// Model file with size.
    File {
        path: String,
        #[serde(default)]
        size: u64,
    },
}

impl ModelEntry {
    /// Model path regardless of shape.
    pub fn path(&self) -> &str {
        match self {
            ModelEntry::Path(path) => path,
            ModelEntry::File { path, .. } => path,
        }
    }

    /// Size in bytes when reported.
    pub fn size(&self) -> Option<u64> {
        match self {
            ModelEntry::Path(_) => None,
            ModelEntry::File { size, .. } => Some(*size),
        }
    }
}

/// Multipart body of `POST /load_model`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadModelRequest {
    /// Path of the model file on the backend.
    pub model_path: String,
    /// Chat format name.
    pub format: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Layers offloaded to the GPU.
    pub gpu_layers: u32,
    /// Context window size in tokens.
    pub context: u32,
    /// System prompt applied by the loaded model.
    pub system_message: String,
}

impl LoadModelRequest {
    /// Form fields in the order the backend documents them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model_path", self.model_path.clone()),
            ("format", self.format.clone()),
            ("temperature", self.temperature.to_string()),
            ("gpu_layers", self.gpu_layers.to_string()),
            ("context", self.context.to_string()),
            ("system_message", self.system_message.clone()),
        ]
    }
}
