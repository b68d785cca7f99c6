use std::path::PathBuf;

use thiserror::Error;

/// Why a transport could not produce a JSON payload.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} unavailable: {message}")]
    Unavailable { url: String, message: String },
}

impl TransportError {
    /// A failure without an underlying I/O or HTTP cause.
    #[must_use]
    pub fn unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Failure of one endpoint's fetch task.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("loading {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("fetch task for {endpoint} did not complete: {source}")]
    Join {
        endpoint: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl LoadError {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. } | Self::Join { endpoint, .. } => endpoint,
        }
    }
}
