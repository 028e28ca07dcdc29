//! Response-shape discrimination for the analyze, review and report stages.
//!
//! Each function here is pure: it looks at a parsed JSON body and decides
//! which of the accepted shapes it is, without touching the network.

use crate::models::ReportLinks;
use serde_json::{Map, Value};

/// Separator between step responses when no full text is present.
pub const STEP_SEPARATOR: &str = "\n\n";

/// Accepted shapes of an analyze response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisText {
    /// `{"full_text": "..."}`
    FullText(String),
    /// `{"analysisText": "..."}`
    AnalysisText(String),
    /// `{"D1": {"response": "..."}, "D2": {"response": "..."}}`, in key order.
    Steps(Vec<String>),
    /// Nothing usable.
    Empty,
}

impl AnalysisText {
    /// Decide which shape `raw` has. Earlier shapes win.
    pub fn classify(raw: &Value) -> Self {
        let Some(map) = raw.as_object() else {
            return AnalysisText::Empty;
        };

        if let Some(text) = non_empty_str(map, "full_text") {
            return AnalysisText::FullText(text.to_string());
        }
        if let Some(text) = non_empty_str(map, "analysisText") {
            return AnalysisText::AnalysisText(text.to_string());
        }

        let steps: Vec<String> = map
            .values()
            .filter_map(Value::as_object)
            .filter_map(|step| non_empty_str(step, "response"))
            .map(String::from)
            .collect();

        if steps.is_empty() {
            AnalysisText::Empty
        } else {
            AnalysisText::Steps(steps)
        }
    }

    /// The full text, or `None` for [`AnalysisText::Empty`].
    pub fn into_text(self) -> Option<String> {
        match self {
            AnalysisText::FullText(text) | AnalysisText::AnalysisText(text) => Some(text),
            AnalysisText::Steps(steps) => Some(steps.join(STEP_SEPARATOR)),
            AnalysisText::Empty => None,
        }
    }
}

/// Review text from `{"result": "..."}`.
pub fn review_text(raw: &Value) -> Option<String> {
    raw.as_object()
        .and_then(|map| non_empty_str(map, "result"))
        .map(String::from)
}

/// Server-relative artifact paths from `{"pdf": "...", "excel": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub pdf: String,
    pub excel: Option<String>,
}

impl ReportPaths {
    /// `None` when `pdf` is missing or empty.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let map = raw.as_object()?;
        let pdf = non_empty_str(map, "pdf")?.to_string();
        let excel = non_empty_str(map, "excel").map(String::from);
        Some(Self { pdf, excel })
    }

    /// Prefix both paths with the API base.
    pub fn to_links(&self, api_base: &str) -> ReportLinks {
        ReportLinks {
            pdf: format!("{}{}", api_base, self.pdf),
            excel: self.excel.as_ref().map(|e| format!("{}{}", api_base, e)),
        }
    }
}

/// The `analysis` object sent to `/report`: the raw analyze response with the
/// review attached as one more step.
pub fn report_analysis(raw: &Value, review: &str) -> Value {
    let mut map = match raw {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::new();
            map.insert("analysis".to_string(), other.clone());
            map
        }
    };

    let mut step = Map::new();
    step.insert("response".to_string(), Value::String(review.to_string()));
    map.insert("full_report".to_string(), Value::Object(step));

    Value::Object(map)
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
