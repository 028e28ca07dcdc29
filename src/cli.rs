//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::claims::{ClaimsFilters, ClaimsValues};
use crate::models::{ComplaintDetails, Method, OptionField};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QReporter - complaint analysis client for a quality-management service
///
/// Runs the guide, analysis, review and report stages for a customer
/// complaint and queries recorded claims. Markdown/JSON reports.
///
/// Examples:
///   qreporter analyze --method 8D --complaint "Cracked housing" --customer ACME
///   qreporter analyze -m A3 --complaint "Leak" --download --format json
///   qreporter claims --customer ACME --year 2023 --year 2024
///   qreporter claims --keyword leak --start-year 2020 --end-year 2022
///   qreporter options customer
///   qreporter guide DMAIC
///   qreporter --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analysis service base URL
    ///
    /// Overrides [api].base_url from .qreporter.toml.
    #[arg(long, value_name = "URL", env = "QREPORTER_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .qreporter.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    ///
    /// Analysis and review are LLM-backed and can take minutes.
    /// Default: from config or 600s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Generate a default .qreporter.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the guideline, analyze, review and generate report artifacts
    Analyze(AnalyzeArgs),

    /// Query recorded claims
    Claims(ClaimsArgs),

    /// List autocomplete values for a complaint field
    Options {
        #[arg(value_enum)]
        field: OptionField,
    },

    /// Print the guide text for a method (all methods when omitted)
    Guide {
        #[arg(value_enum)]
        method: Option<Method>,
    },

    /// Ask the service to rescan 8D reports
    #[command(name = "scan-8d")]
    Scan8d,

    /// Store a complaint on the service
    AddComplaint(ComplaintArgs),
}

/// Complaint fields shared by `analyze` and `add-complaint`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ComplaintArgs {
    /// Complaint text
    #[arg(long, default_value = "")]
    pub complaint: String,

    /// Customer name
    #[arg(long, default_value = "")]
    pub customer: String,

    /// Complaint subject
    #[arg(long, default_value = "")]
    pub subject: String,

    /// Related part code
    #[arg(long, default_value = "")]
    pub part_code: String,
}

impl ComplaintArgs {
    pub fn to_details(&self) -> ComplaintDetails {
        ComplaintDetails {
            complaint: self.complaint.clone(),
            customer: self.customer.clone(),
            subject: self.subject.clone(),
            part_code: self.part_code.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Problem-solving method
    #[arg(short, long, value_enum)]
    pub method: Method,

    #[command(flatten)]
    pub complaint: ComplaintArgs,

    /// Extra instructions for the analysis
    #[arg(short, long, default_value = "")]
    pub directives: String,

    /// Language of the generated analysis
    ///
    /// Default: from config or "Türkçe"
    #[arg(long)]
    pub language: Option<String>,

    /// Output file path for the run report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Download the PDF and Excel artifacts after a successful run
    #[arg(long)]
    pub download: bool,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ClaimsArgs {
    /// Filter by complaint text
    #[arg(long)]
    pub complaint: Option<String>,

    /// Filter by customer name
    #[arg(long)]
    pub customer: Option<String>,

    /// Filter by subject
    #[arg(long)]
    pub subject: Option<String>,

    /// Filter by part code
    #[arg(long)]
    pub part_code: Option<String>,

    /// Free-text search over stored complaints
    #[arg(long)]
    pub keyword: Option<String>,

    /// Restrict to a year (repeat to fetch several years)
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<u16>,

    /// First year of an inclusive year range
    #[arg(long, value_name = "YEAR")]
    pub start_year: Option<u16>,

    /// Last year of an inclusive year range
    #[arg(long, value_name = "YEAR")]
    pub end_year: Option<u16>,

    /// Write the claims table to a file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,
}

impl ClaimsArgs {
    /// Filter toggles and values. Passing a value switches its filter on.
    pub fn to_query(&self) -> (ClaimsFilters, ClaimsValues) {
        let filters = ClaimsFilters {
            use_complaint: self.complaint.is_some(),
            use_customer: self.customer.is_some(),
            use_subject: self.subject.is_some(),
            use_part_code: self.part_code.is_some(),
            use_keyword: self.keyword.is_some(),
            years: self.years.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
        };
        let values = ClaimsValues {
            complaint: self.complaint.clone().unwrap_or_default(),
            customer: self.customer.clone().unwrap_or_default(),
            subject: self.subject.clone().unwrap_or_default(),
            part_code: self.part_code.clone().unwrap_or_default(),
            keyword: self.keyword.clone().unwrap_or_default(),
        };
        (filters, values)
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("No command given. Run with --help to see available commands".to_string());
        }

        // Validate service URL format
        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(Command::Claims(ref claims)) = self.command {
            let years = claims
                .years
                .iter()
                .chain(claims.start_year.iter())
                .chain(claims.end_year.iter());
            for year in years {
                if !(1900..=9999).contains(year) {
                    return Err(format!("Invalid year: {}", year));
                }
            }

            if let (Some(start), Some(end)) = (claims.start_year, claims.end_year) {
                if start > end {
                    return Err(format!(
                        "--start-year {} is after --end-year {}",
                        start, end
                    ));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general].verbose`; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
