//! Report rendering.

mod generator;

pub use generator::{
    claims_summary, generate_claims_json, generate_claims_markdown, generate_claims_table,
    generate_json_report, generate_markdown_report,
};
