//! Error types for the pcloud_drive crate.

use thiserror::Error;

/// Errors that can occur when interacting with pCloud.
#[derive(Error, Debug)]
pub enum PCloudError {
    /// The API answered with a non-zero `result`.
    #[error("[{code}] {message}")]
    Api { code: i64, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown API endpoint: {0} (expected \"us\" or \"eu\")")]
    UnknownEndpoint(String),
}

impl PCloudError {
    /// The provider's numeric error code, if this is an API error.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Result type alias for PCloudError.
pub type Result<T> = std::result::Result<T, PCloudError>;
