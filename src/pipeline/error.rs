//! Error types for the analysis pipeline.

use super::orchestrator::Stage;
use crate::api::ApiError;
use thiserror::Error;

/// Shown when the server answers 2xx but leaves out a field the client needs.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Sunucudan beklenmeyen boş yanıt alındı";

/// Shown when a transport failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Beklenmeyen bir hata oluştu";

/// Why an analysis run stopped before producing a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Non-2xx reply; the body text is what the user sees.
    #[error("{body}")]
    Http {
        stage: Stage,
        status: u16,
        body: String,
    },

    /// 2xx reply without the field the next stage needs.
    #[error("{}", EMPTY_RESPONSE_MESSAGE)]
    EmptyResponse { stage: Stage },

    /// The request never got a usable reply.
    #[error("{message}")]
    Transport { stage: Stage, message: String },

    /// A newer run started; this one's results were discarded.
    #[error("Analysis superseded by a newer run")]
    Superseded,
}

impl PipelineError {
    /// Classify a client error raised while `stage` was in flight.
    pub fn from_api(stage: Stage, err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => {
                let body = if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body
                };
                PipelineError::Http {
                    stage,
                    status,
                    body,
                }
            }
            other => {
                let message = other.to_string();
                let message = if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message
                };
                PipelineError::Transport { stage, message }
            }
        }
    }

    /// Stage that failed, if the failure belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Http { stage, .. }
            | PipelineError::EmptyResponse { stage }
            | PipelineError::Transport { stage, .. } => Some(*stage),
            PipelineError::Superseded => None,
        }
    }
}
