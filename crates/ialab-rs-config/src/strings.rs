//! Localized string tables keyed by `(language, namespace)`.
//!
//! Tables are built once at startup and shared immutably. Lookups that miss in
//! the selected language fall back to the base language and never fail.

use crate::{ConfigError, I18nConfig};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Record = HashMap<String, String>;

/// Immutable `(language, namespace) -> record` mapping with base-language fallback.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    base_language: String,
    tables: HashMap<(String, String), Record>,
}

impl StringTable {
    /// Start an empty table falling back to `base_language`.
    pub fn builder(base_language: impl Into<String>) -> StringTableBuilder {
        StringTableBuilder {
            table: StringTable {
                base_language: base_language.into(),
                tables: HashMap::new(),
            },
        }
    }

    /// Built-in notices emitted by the conversation core, in `en` and `es`.
    pub fn builtin() -> Self {
        Self::builtin_builder("en").build()
    }

    /// Built-in strings overlaid with every table found under the configured paths.
    pub fn from_config(config: &I18nConfig) -> Result<Self, ConfigError> {
        let mut builder = Self::builtin_builder(&config.fallback_language);
        for path in &config.paths {
            builder = builder.load_dir(path)?;
        }
        Ok(builder.build())
    }

    fn builtin_builder(base_language: &str) -> StringTableBuilder {
        Self::builder(base_language)
            .insert("en", "chat", "stopped_by_user", "Response stopped by user.")
            .insert("en", "chat", "stream_error", "Error: {message}")
            .insert("en", "chat", "stream_lagged", "Reply interrupted: {count} stream events were lost.")
            .insert("en", "errors", "network", "Could not reach the server.")
            .insert("en", "errors", "timeout", "The server took too long to answer.")
            .insert("en", "errors", "model", "The model failed to respond.")
            .insert("en", "errors", "unknown", "Something went wrong.")
            .insert("es", "chat", "stopped_by_user", "Respuesta detenida por el usuario.")
            .insert("es", "chat", "stream_error", "Error: {message}")
            .insert("es", "chat", "stream_lagged", "Respuesta interrumpida: se perdieron {count} eventos.")
            .insert("es", "errors", "network", "No se pudo conectar con el servidor.")
            .insert("es", "errors", "timeout", "El servidor tardó demasiado en responder.")
            .insert("es", "errors", "model", "El modelo no pudo responder.")
            .insert("es", "errors", "unknown", "Algo salió mal.")
    }

    /// Base language consulted on misses.
    pub fn base_language(&self) -> &str {
        &self.base_language
    }

    /// Look up a key, falling back to the base language.
    pub fn lookup(&self, language: &str, namespace: &str, key: &str) -> Option<&str> {
        self.record(language, namespace)
            .and_then(|record| record.get(key))
            .or_else(|| {
                self.record(&self.base_language, namespace)
                    .and_then(|record| record.get(key))
            })
            .map(String::as_str)
    }

    /// Look up a key, returning the key itself when no language has it.
    pub fn text<'a>(&'a self, language: &str, namespace: &str, key: &'a str) -> &'a str {
        self.lookup(language, namespace, key).unwrap_or(key)
    }

    /// Full record for a namespace: base-language entries overlaid with the selected language.
    pub fn namespace(&self, language: &str, namespace: &str) -> HashMap<&str, &str> {
        let mut merged = HashMap::new();
        for lang in [self.base_language.as_str(), language] {
            if let Some(record) = self.record(lang, namespace) {
                merged.extend(record.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
        }
        merged
    }

    fn record(&self, language: &str, namespace: &str) -> Option<&Record> {
        self.tables
            .get(&(language.to_string(), namespace.to_string()))
    }
}

/// Incremental builder for a [`StringTable`].
#[derive(Debug, Clone)]
pub struct StringTableBuilder {
    table: StringTable,
}

impl StringTableBuilder {
    /// Insert or replace a single entry.
    pub fn insert(
        mut self,
        language: &str,
        namespace: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Self {
        self.record_mut(language, namespace)
            .insert(key.to_string(), value.into());
        self
    }

    /// Load `<dir>/<language>/<namespace>.json5` files; nested objects flatten to dotted keys.
    pub fn load_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!("string table directory missing (path={})", dir.display());
            return Ok(self);
        }
        for lang_entry in fs::read_dir(dir)? {
            let lang_path = lang_entry?.path();
            if !lang_path.is_dir() {
                continue;
            }
            let Some(language) = lang_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let language = language.to_string();
            for file_entry in fs::read_dir(&lang_path)? {
                let path = file_entry?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json5") {
                    continue;
                }
                let Some(namespace) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let namespace = namespace.to_string();
                let value: Value = json5::from_str(&fs::read_to_string(&path)?)?;
                let Value::Object(_) = value else {
                    return Err(ConfigError::InvalidStrings {
                        path: path.display().to_string(),
                        message: "expected object".to_string(),
                    });
                };
                let record = self.record_mut(&language, &namespace);
                flatten_into(record, "", &value);
                debug!(
                    "loaded string table (language={}, namespace={}, entries={})",
                    language,
                    namespace,
                    record.len()
                );
            }
        }
        Ok(self)
    }

    /// Finish building.
    pub fn build(self) -> StringTable {
        self.table
    }

    fn record_mut(&mut self, language: &str, namespace: &str) -> &mut Record {
        self.table
            .tables
            .entry((language.to_string(), namespace.to_string()))
            .or_default()
    }
}

fn flatten_into(record: &mut Record, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(record, &path, value);
            }
        }
        Value::String(text) => {
            record.insert(prefix.to_string(), text.clone());
        }
        Value::Null => {}
        other => {
            record.insert(prefix.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> StringTable {
        StringTable::builder("en")
            .insert("en", "header", "title", "Chat")
            .insert("en", "header", "subtitle", "Local models")
            .insert("en", "sidebar", "new_chat", "New chat")
            .insert("es", "header", "title", "Conversación")
            .build()
    }

    #[test]
    fn missing_key_falls_back_to_base_language() {
        let table = sample();
        assert_eq!(table.lookup("es", "header", "title"), Some("Conversación"));
        assert_eq!(table.lookup("es", "header", "subtitle"), Some("Local models"));
    }

    #[test]
    fn missing_namespace_falls_back_to_base_language() {
        let table = sample();
        assert_eq!(table.lookup("es", "sidebar", "new_chat"), Some("New chat"));
        assert_eq!(table.lookup("de", "sidebar", "new_chat"), Some("New chat"));
    }

    #[test]
    fn unknown_key_returns_key_text() {
        let table = sample();
        assert_eq!(table.lookup("es", "header", "nope"), None);
        assert_eq!(table.text("es", "header", "nope"), "nope");
    }

    #[test]
    fn namespace_overlays_selected_language() {
        let table = sample();
        let record = table.namespace("es", "header");
        assert_eq!(record.get("title"), Some(&"Conversación"));
        assert_eq!(record.get("subtitle"), Some(&"Local models"));
    }

    #[test]
    fn builtin_has_core_notices() {
        let table = StringTable::builtin();
        assert_eq!(
            table.text("es", "chat", "stopped_by_user"),
            "Respuesta detenida por el usuario."
        );
        assert_eq!(table.text("fr", "errors", "timeout"), "The server took too long to answer.");
    }

    #[test]
    fn loads_nested_tables_from_directory() {
        let temp = TempDir::new().expect("tmp");
        let es = temp.path().join("es");
        fs::create_dir_all(&es).expect("dir");
        fs::write(
            es.join("settings.json5"),
            "{ model: { temperature: 'Temperatura' }, save: 'Guardar' }",
        )
        .expect("write");

        let config = I18nConfig {
            language: "es".to_string(),
            fallback_language: "en".to_string(),
            paths: vec![temp.path().display().to_string()],
        };
        let table = StringTable::from_config(&config).expect("table");
        assert_eq!(table.lookup("es", "settings", "model.temperature"), Some("Temperatura"));
        assert_eq!(table.lookup("es", "settings", "save"), Some("Guardar"));
        assert_eq!(table.text("es", "chat", "stopped_by_user"), "Respuesta detenida por el usuario.");
    }

    #[test]
    fn rejects_non_object_table() {
        let temp = TempDir::new().expect("tmp");
        let en = temp.path().join("en");
        fs::create_dir_all(&en).expect("dir");
        fs::write(en.join("bad.json5"), "[1, 2]").expect("write");
        let err = StringTable::builder("en").load_dir(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStrings { .. }));
    }
}
