//! Markdown and JSON report generation.
//!
//! This module renders a finished analysis run, and a claims query result,
//! as Markdown or JSON documents.

use crate::claims::table::ClaimsTable;
use crate::models::{AnalysisReport, ComplaintDetails, ReportLinks, ReportMetadata};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Shown instead of a table when a claims query returned nothing.
pub const NO_CLAIMS_MESSAGE: &str = "Kayıt bulunamadı";

/// Generate a complete Markdown report for an analysis run.
pub fn generate_markdown_report(report: &AnalysisReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {} Analysis Report\n\n", report.method));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_details_section(&report.details));
    output.push_str(&generate_method_section(report));

    output.push_str("## Analysis\n\n");
    output.push_str(report.analysis_text.trim_end());
    output.push_str("\n\n");

    output.push_str("## Review\n\n");
    output.push_str(report.review_text.trim_end());
    output.push_str("\n\n");

    output.push_str(&generate_links_section(&report.links));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Service:** {}\n", metadata.api_base));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the complaint details table.
fn generate_details_section(details: &ComplaintDetails) -> String {
    let mut section = String::new();

    section.push_str("## Complaint\n\n");
    section.push_str("| Field | Value |\n");
    section.push_str("|:---|:---|\n");
    for (label, value) in [
        ("Customer", &details.customer),
        ("Subject", &details.subject),
        ("Part Code", &details.part_code),
    ] {
        section.push_str(&format!("| {} | {} |\n", label, escape_cell(value)));
    }
    section.push('\n');

    if !details.complaint.is_empty() {
        section.push_str(&format!("> {}\n\n", details.complaint.replace('\n', "\n> ")));
    }

    section
}

fn generate_method_section(report: &AnalysisReport) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Method: {}\n\n", report.method));
    section.push_str(report.method.guide_text());
    section.push_str("\n\n");

    if !report.directives.is_empty() {
        section.push_str(&format!("**Directives:** {}\n\n", report.directives));
    }

    section
}

fn generate_links_section(links: &ReportLinks) -> String {
    let mut section = String::new();

    section.push_str("## Artifacts\n\n");
    section.push_str(&format!("- [PDF report]({})\n", links.pdf));
    if let Some(ref excel) = links.excel {
        section.push_str(&format!("- [Excel report]({})\n", excel));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by QReporter v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// `Fetched N claims`, or the empty-result message.
pub fn claims_summary(count: usize) -> String {
    if count == 0 {
        NO_CLAIMS_MESSAGE.to_string()
    } else {
        format!("Fetched {} claims", count)
    }
}

/// Render claim records as a Markdown table.
pub fn generate_claims_table(table: &ClaimsTable) -> String {
    if table.is_empty() {
        return format!("{}\n", NO_CLAIMS_MESSAGE);
    }

    let mut output = String::new();
    let labels = table.labels();

    output.push_str(&format!("| {} |\n", labels.join(" | ")));
    output.push_str(&format!("|{}\n", ":---|".repeat(labels.len())));

    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    output
}

/// Generate a Markdown document for a claims query.
pub fn generate_claims_markdown(records: &[Value], raw_payloads: &[Value]) -> String {
    let mut output = String::new();
    let table = ClaimsTable::from_records(records);

    output.push_str("# Claims\n\n");
    output.push_str(&format!("{}\n\n", claims_summary(table.len())));
    output.push_str(&generate_claims_table(&table));
    output.push('\n');

    if !raw_payloads.is_empty() {
        output.push_str("## Unrecognized Responses\n\n");
        for raw in raw_payloads {
            output.push_str("```json\n");
            output.push_str(&serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()));
            output.push_str("\n```\n\n");
        }
    }

    output.push_str(&generate_footer());
    output
}

#[derive(Serialize)]
struct ClaimsExport<'a> {
    generated_at: DateTime<Utc>,
    count: usize,
    columns: Vec<String>,
    records: &'a [Value],
    #[serde(skip_serializing_if = "<[Value]>::is_empty")]
    raw_payloads: &'a [Value],
}

/// Generate a JSON document for a claims query.
pub fn generate_claims_json(records: &[Value], raw_payloads: &[Value]) -> Result<String> {
    let export = ClaimsExport {
        generated_at: Utc::now(),
        count: records.len(),
        columns: ClaimsTable::from_records(records).columns,
        records,
        raw_payloads,
    };
    serde_json::to_string_pretty(&export).map_err(Into::into)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}
