//! Error types for the claims query

use crate::api::ApiError;
use crate::pipeline::error::GENERIC_FAILURE_MESSAGE;
use thiserror::Error;

/// Error type for claims fetches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClaimsError {
    /// Non-2xx reply; only the status is shown.
    #[error("HTTP {0}")]
    Http(u16),

    #[error("{0}")]
    Transport(String),

    #[error("Invalid claims response: {0}")]
    Decode(String),
}

impl From<ApiError> for ClaimsError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, .. } => ClaimsError::Http(status),
            ApiError::Decode(message) => ClaimsError::Decode(message),
            other => {
                let message = other.to_string();
                if message.trim().is_empty() {
                    ClaimsError::Transport(GENERIC_FAILURE_MESSAGE.to_string())
                } else {
                    ClaimsError::Transport(message)
                }
            }
        }
    }
}
