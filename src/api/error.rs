//! Error types for the analysis service client.

use thiserror::Error;

/// Failure talking to the analysis service.
///
/// `Display` is what the user sees, so `Status` renders the response body
/// verbatim and `Transport` renders only the failure message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The base URL could not be parsed.
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (connect, timeout, DNS).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{body}")]
    Status { status: u16, body: String },

    /// The server answered 2xx but the body was not JSON.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// A downloaded artifact could not be written locally.
    #[error("Failed to write {path}: {message}")]
    Io { path: String, message: String },
}

impl ApiError {
    /// Map a reqwest error the way the CLI reports it.
    pub fn from_reqwest(err: reqwest::Error, base_url: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("Request timed out after {}s", timeout_seconds))
        } else if err.is_connect() {
            ApiError::Transport(format!(
                "Cannot connect to the analysis service at {}",
                base_url
            ))
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(format!("Failed to send request: {}", err))
        }
    }

    /// HTTP status code, if the server answered at all.
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
