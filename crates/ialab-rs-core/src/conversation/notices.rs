//! Localized text the conversation writes into the transcript.

use crate::error::NetworkErrorKind;
use ialab_rs_config::StringTable;

/// Resolved notice strings for one UI language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notices {
    stopped_by_user: String,
    stream_error: String,
    stream_lagged: String,
    network: String,
    timeout: String,
    model: String,
    unknown: String,
}

impl Notices {
    /// Resolve notices for `language`, falling back to the table's base language.
    pub fn from_strings(strings: &StringTable, language: &str) -> Self {
        let text = |namespace: &str, key: &str| strings.text(language, namespace, key).to_string();
        Self {
            stopped_by_user: text("chat", "stopped_by_user"),
            stream_error: text("chat", "stream_error"),
            stream_lagged: text("chat", "stream_lagged"),
            network: text("errors", NetworkErrorKind::Network.as_str()),
            timeout: text("errors", NetworkErrorKind::Timeout.as_str()),
            model: text("errors", NetworkErrorKind::Model.as_str()),
            unknown: text("errors", NetworkErrorKind::Unknown.as_str()),
        }
    }

    pub fn stopped_by_user(&self) -> &str {
        &self.stopped_by_user
    }

    /// Transcript line for an `error` stream event.
    pub fn stream_error(&self, message: &str) -> String {
        self.stream_error.replace("{message}", message)
    }

    /// Transcript line for a reply cut short by skipped channel events.
    pub fn stream_lagged(&self, skipped: u64) -> String {
        self.stream_lagged.replace("{count}", &skipped.to_string())
    }

    /// Banner headline for a failed network call.
    pub fn banner_title(&self, kind: NetworkErrorKind) -> &str {
        match kind {
            NetworkErrorKind::Network => &self.network,
            NetworkErrorKind::Timeout => &self.timeout,
            NetworkErrorKind::Model => &self.model,
            NetworkErrorKind::Unknown => &self.unknown,
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::from_strings(&StringTable::builtin(), "en")
    }
}
