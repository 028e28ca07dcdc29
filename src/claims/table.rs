//! Tabular view of claim records.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Claim records laid out as rows over the first record's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsTable {
    /// Raw record keys, in the first record's order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ClaimsTable {
    pub fn from_records(records: &[Value]) -> Self {
        let columns: Vec<String> = records
            .first()
            .and_then(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| format_cell(record.get(column)))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Column headers for display.
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| column_label(c)).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `part_code` -> `Part Code`.
pub fn column_label(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Display text for one cell. Missing and null cells are blank.
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => date_part(s).unwrap_or_else(|| s.clone()),
        Some(other) => other.to_string(),
    }
}

/// Date part of an ISO date-time string such as `2024-01-24T00:00:00`.
fn date_part(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
}
