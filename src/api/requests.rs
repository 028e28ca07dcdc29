//! Request bodies sent to the analysis service.

use crate::models::ComplaintDetails;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// `POST /analyze`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub details: &'a ComplaintDetails,
    /// Guideline exactly as returned by `GET /guide/{method}`.
    pub guideline: &'a Value,
    pub directives: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

/// `POST /review`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest<'a> {
    pub text: &'a str,
    pub context: BTreeMap<&'static str, String>,
}

/// `POST /report`
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest<'a> {
    pub analysis: &'a Value,
    pub complaint_info: &'a ComplaintDetails,
    pub output_dir: &'a str,
}
