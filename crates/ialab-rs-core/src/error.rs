//! Error types for the conversation core.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum IalabCoreError {
    /// HTTP API call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    /// Real-time channel failure.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    /// A turn is already in flight.
    #[error("a turn is already in progress")]
    TurnInProgress,
}

/// Failure of a backend HTTP call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body did not have the expected shape.
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    /// Failure reported without transport details.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Categorize the failure for the error banner.
    pub fn kind(&self) -> NetworkErrorKind {
        match self {
            ApiError::Transport { source, .. } => {
                if source.is_timeout() {
                    NetworkErrorKind::Timeout
                } else if source.is_connect() {
                    NetworkErrorKind::Network
                } else {
                    NetworkErrorKind::classify(&source.to_string())
                }
            }
            ApiError::Status { status, body, .. } => match status {
                408 | 504 => NetworkErrorKind::Timeout,
                _ => NetworkErrorKind::classify(body),
            },
            ApiError::Decode { message, .. } => NetworkErrorKind::classify(message),
            ApiError::Other(message) => NetworkErrorKind::classify(message),
        }
    }
}

/// Failure of the real-time channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("channel is not connected")]
    NotConnected,
    #[error("channel closed")]
    Closed,
    #[error("channel lagged, {0} events skipped")]
    Lagged(u64),
    #[error("send failed: {0}")]
    Send(String),
    #[error("invalid channel frame: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Banner category for a failed network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorKind {
    Network,
    Timeout,
    Model,
    Unknown,
}

const TIMEOUT_KEYWORDS: &[&str] = &[
    "timeout",
    "timed out",
    "deadline",
    "tiempo de espera",
    "agotado",
];

const NETWORK_KEYWORDS: &[&str] = &[
    "network",
    "connection",
    "connect",
    "fetch",
    "unreachable",
    "refused",
    "dns",
    "de red",
    "conexión",
    "conexion",
];

const MODEL_KEYWORDS: &[&str] = &["model", "modelo", "gguf", "llama", "inference"];

impl NetworkErrorKind {
    /// Best-effort keyword match on an error message.
    ///
    /// Checked in order: timeout, network, model. Anything else is unknown.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|kw| message.contains(kw));
        if matches(TIMEOUT_KEYWORDS) {
            NetworkErrorKind::Timeout
        } else if matches(NETWORK_KEYWORDS) {
            NetworkErrorKind::Network
        } else if matches(MODEL_KEYWORDS) {
            NetworkErrorKind::Model
        } else {
            NetworkErrorKind::Unknown
        }
    }

    /// String-table key under the `errors` namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkErrorKind::Network => "network",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Model => "model",
            NetworkErrorKind::Unknown => "unknown",
        }
    }
}

/// Dismissible error shown after a failed network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: NetworkErrorKind,
    /// Localized headline for `kind`.
    pub title: String,
    /// Raw failure description.
    pub detail: String,
    pub raised_at: Instant,
    /// Banner stays until dismissed when unset.
    pub auto_dismiss: Option<Duration>,
}

impl ErrorBanner {
    /// Whether the banner has outlived its auto-dismiss delay.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.auto_dismiss
            .is_some_and(|delay| now.saturating_duration_since(self.raised_at) >= delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifier_checks_timeout_before_network() {
        assert_eq!(
            NetworkErrorKind::classify("connection timed out"),
            NetworkErrorKind::Timeout
        );
        assert_eq!(
            NetworkErrorKind::classify("Connection refused (os error 111)"),
            NetworkErrorKind::Network
        );
        assert_eq!(
            NetworkErrorKind::classify("No hay ningún modelo cargado"),
            NetworkErrorKind::Model
        );
        assert_eq!(
            NetworkErrorKind::classify("internal server error"),
            NetworkErrorKind::Unknown
        );
    }

    #[test]
    fn classifier_reads_spanish_messages() {
        assert_eq!(
            NetworkErrorKind::classify("Se agotó el tiempo de espera"),
            NetworkErrorKind::Timeout
        );
        assert_eq!(
            NetworkErrorKind::classify("Error de red"),
            NetworkErrorKind::Network
        );
    }

    #[test]
    fn status_errors_use_code_then_body() {
        let gateway = ApiError::Status {
            endpoint: "user_input".to_string(),
            status: 504,
            body: String::new(),
        };
        assert_eq!(gateway.kind(), NetworkErrorKind::Timeout);

        let no_model = ApiError::Status {
            endpoint: "user_input".to_string(),
            status: 500,
            body: "model not loaded".to_string(),
        };
        assert_eq!(no_model.kind(), NetworkErrorKind::Model);
    }

    #[test]
    fn banner_without_delay_never_expires() {
        let raised_at = Instant::now();
        let mut banner = ErrorBanner {
            kind: NetworkErrorKind::Unknown,
            title: "t".to_string(),
            detail: "d".to_string(),
            raised_at,
            auto_dismiss: None,
        };
        assert!(!banner.is_expired(raised_at + Duration::from_secs(3600)));

        banner.auto_dismiss = Some(Duration::from_secs(5));
        assert!(!banner.is_expired(raised_at + Duration::from_secs(4)));
        assert!(banner.is_expired(raised_at + Duration::from_secs(5)));
    }
}
