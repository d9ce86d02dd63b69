//! Error types for the remote service and the key-value persistence
//!
//! Polling channels classify failures through [`RemoteError::is_transient`]:
//! transient failures take the channel's retry path, the others are reported
//! and dropped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Response from {url} has an unexpected shape: expected {expected}, got {actual}")]
    UnexpectedShape {
        url: String,
        expected: &'static str,
        actual: String,
    },
}

impl RemoteError {
    pub fn transport(url: impl Into<String>, error: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            message: error.to_string(),
        }
    }

    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether the failure belongs to the network layer and should be retried.
    ///
    /// A response that arrived intact but carries the wrong shape is not
    /// transient: asking again right away would not change it.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. } => true,
            Self::UnexpectedShape { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
