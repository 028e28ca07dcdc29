//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.qreporter.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".qreporter.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Claims query settings.
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "qreporter_report.md".to_string()
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service base URL; report paths are appended to it verbatim.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Language hint sent with every analysis.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            language: default_language(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    600 // LLM-backed stages are slow
}

fn default_language() -> String {
    "Türkçe".to_string()
}

/// Claims query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsConfig {
    /// Query-string key for each filter.
    #[serde(default)]
    pub field_keys: ClaimsFieldKeys,

    /// Query-string key for the year filter.
    #[serde(default = "default_year_key")]
    pub year_key: String,

    /// Query-string keys for the inclusive year range.
    #[serde(default = "default_start_year_key")]
    pub start_year_key: String,

    #[serde(default = "default_end_year_key")]
    pub end_year_key: String,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            field_keys: ClaimsFieldKeys::default(),
            year_key: default_year_key(),
            start_year_key: default_start_year_key(),
            end_year_key: default_end_year_key(),
        }
    }
}

fn default_year_key() -> String {
    "year".to_string()
}

fn default_start_year_key() -> String {
    "start_year".to_string()
}

fn default_end_year_key() -> String {
    "end_year".to_string()
}

/// Server-side column names the claims endpoint filters on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsFieldKeys {
    #[serde(default = "default_complaint_key")]
    pub complaint: String,

    #[serde(default = "default_customer_key")]
    pub customer: String,

    #[serde(default = "default_subject_key")]
    pub subject: String,

    #[serde(default = "default_part_code_key")]
    pub part_code: String,

    /// Free-text search; the only filter that matches stored complaints.
    #[serde(default = "default_keyword_key")]
    pub keyword: String,
}

impl Default for ClaimsFieldKeys {
    fn default() -> Self {
        Self {
            complaint: default_complaint_key(),
            customer: default_customer_key(),
            subject: default_subject_key(),
            part_code: default_part_code_key(),
            keyword: default_keyword_key(),
        }
    }
}

fn default_complaint_key() -> String {
    "complaint".to_string()
}

fn default_customer_key() -> String {
    "Müşteri Adı".to_string()
}

fn default_subject_key() -> String {
    "Konu".to_string()
}

fn default_part_code_key() -> String {
    "Parça Numarası".to_string()
}

fn default_keyword_key() -> String {
    "keyword".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Server-side directory passed to `/report`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Local directory for `--download`.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            download_dir: default_download_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "reports".to_string()
}

fn default_download_dir() -> String {
    ".".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.qreporter.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.api.base_url = api_url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(crate::cli::Command::Analyze(ref analyze)) = args.command {
            if let Some(ref language) = analyze.language {
                self.api.language = language.clone();
            }
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
