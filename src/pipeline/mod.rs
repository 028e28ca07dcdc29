//! Analysis pipeline.
//!
//! This module contains the guide/analyze/review/report state machine and
//! the pure helpers that read each stage's response.

pub mod error;
pub mod extract;
pub mod orchestrator;

pub use orchestrator::{AnalysisSession, PipelineSettings};
