//! QReporter - complaint analysis client for a quality-management service
//!
//! A CLI tool that walks a customer complaint through the service's guide,
//! analysis, review and report stages, and queries recorded claims.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, failed stage, etc.)

mod api;
mod claims;
mod cli;
mod config;
mod models;
mod pipeline;
mod report;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use api::ApiClient;
use claims::{ClaimsBrowser, ClaimsTable, FieldKeys};
use cli::{AnalyzeArgs, Args, ClaimsArgs, Command, ComplaintArgs, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Method, OptionField, ReportLinks};
use pipeline::{AnalysisSession, PipelineSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so [general].verbose can raise the log level
    let (mut config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("QReporter v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .qreporter.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the service URL, claims field keys, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch the selected command. Returns the process exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let Some(ref command) = args.command else {
        return Ok(0);
    };

    if let Command::Guide { method } = command {
        print_guides(*method);
        return Ok(0);
    }

    let client = ApiClient::new(&config.api.base_url, config.api.timeout_seconds)
        .context("Invalid analysis service URL")?;
    debug!("Using analysis service at {}", client.base_url());

    match command {
        Command::Analyze(analyze) => run_analyze(&client, &config, analyze, args.quiet).await,
        Command::Claims(claims) => run_claims(&client, &config, claims, args.quiet).await,
        Command::Options { field } => run_options(&client, *field).await,
        Command::Scan8d => run_scan_8d(&client, args.quiet).await,
        Command::AddComplaint(complaint) => run_add_complaint(&client, complaint).await,
        Command::Guide { .. } => Ok(0),
    }
}

/// Run the full analysis pipeline for one complaint.
async fn run_analyze(
    client: &ApiClient,
    config: &Config,
    args: &AnalyzeArgs,
    quiet: bool,
) -> Result<i32> {
    let details = args.complaint.to_details();

    println!("🔬 Running {} analysis...", args.method);
    println!("   Service: {}", client.base_url());
    println!("   Language: {}", config.api.language);
    println!("   Timeout: {}s\n", config.api.timeout_seconds);

    let spinner = stage_spinner(quiet);
    let stage_display = spinner.clone();

    let settings = PipelineSettings {
        language: Some(config.api.language.clone()),
        output_dir: config.report.output_dir.clone(),
    };
    let session = AnalysisSession::new(client.clone(), settings).with_stage_observer(move |stage| {
        if stage.is_working() {
            stage_display.set_message(format!("{}...", stage));
        }
    });

    let outcome = session.run_analysis(&details, args.method, &args.directives).await;
    spinner.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            let stage = e
                .stage()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Analysis".to_string());
            eprintln!("\n❌ {} failed: {}", stage, e);

            let state = session.snapshot().await;
            if let Some(raw) = state.raw_analysis {
                eprintln!("\nRaw analysis response:");
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&raw).unwrap_or_else(|_| raw.to_string())
                );
            }
            return Ok(1);
        }
    };

    println!("📋 Analysis:\n");
    println!("{}\n", report.analysis_text.trim_end());
    println!("🧐 Review:\n");
    println!("{}\n", report.review_text.trim_end());

    println!("📎 Report artifacts:");
    println!("   PDF: {}", report.links.pdf);
    if let Some(ref excel) = report.links.excel {
        println!("   Excel: {}", excel);
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(config, args.format));
    let content = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    std::fs::write(&output_path, &content)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if args.download {
        let dir = Path::new(&config.report.download_dir);
        download_artifacts(client, &report.links, dir).await?;
    }

    println!("\n   Duration: {:.1}s", report.metadata.duration_seconds);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Query claims and print them as a table.
async fn run_claims(
    client: &ApiClient,
    config: &Config,
    args: &ClaimsArgs,
    quiet: bool,
) -> Result<i32> {
    let (filters, values) = args.to_query();
    let mut browser = ClaimsBrowser::new(client.clone(), FieldKeys::from(&config.claims));

    let spinner = stage_spinner(quiet);
    spinner.set_message("Fetching claims...");
    let fetched = browser.fetch_claims(&filters, &values).await;
    spinner.finish_and_clear();

    if let Err(e) = fetched {
        debug!("Claims fetch error: {:?}", e);
    }
    if let Some(message) = browser.view().error() {
        eprintln!("\n❌ Claims query failed: {}", message);
        return Ok(1);
    }

    let records = browser.view().records();
    let raw_payloads = browser.view().raw_payloads();
    let table = ClaimsTable::from_records(records);

    println!("📊 {}\n", report::claims_summary(table.len()));
    if !table.is_empty() {
        println!("{}", report::generate_claims_table(&table));
    }
    for raw in raw_payloads {
        println!("⚠️  Unrecognized response:");
        println!(
            "{}",
            serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
        );
    }

    if let Some(ref output) = args.output {
        let content = match args.format {
            OutputFormat::Json => report::generate_claims_json(records, raw_payloads)?,
            OutputFormat::Markdown => report::generate_claims_markdown(records, raw_payloads),
        };
        std::fs::write(output, &content)
            .with_context(|| format!("Failed to write claims to {}", output.display()))?;
        println!("✅ Claims saved to: {}", output.display());
    }

    Ok(0)
}

/// Print autocomplete values for one field.
async fn run_options(client: &ApiClient, field: OptionField) -> Result<i32> {
    let values = client.fetch_options(field).await;

    if values.is_empty() {
        println!("No {} options available.", field);
    } else {
        for value in &values {
            println!("{}", value);
        }
    }

    Ok(0)
}

/// Print the guide text for one or all methods.
fn print_guides(method: Option<Method>) {
    for info in Method::all()
        .filter(|m| method.map_or(true, |wanted| wanted == *m))
        .map(|m| m.info())
    {
        println!("📘 {}\n", info.name);
        println!("{}\n", info.guide_text);
    }
}

async fn run_scan_8d(client: &ApiClient, quiet: bool) -> Result<i32> {
    let spinner = stage_spinner(quiet);
    spinner.set_message("Scanning 8D reports...");
    let scanned = client.scan_8d().await;
    spinner.finish_and_clear();

    match scanned {
        Ok(Some(count)) => println!("✅ Scanned {} 8D reports.", count),
        Ok(None) => println!("✅ 8D scan complete."),
        Err(e) => {
            eprintln!("\n❌ 8D scan failed: {}", e);
            return Ok(1);
        }
    }

    Ok(0)
}

async fn run_add_complaint(client: &ApiClient, args: &ComplaintArgs) -> Result<i32> {
    let details = args.to_details();
    if details.complaint.trim().is_empty() {
        warn!("Saving a complaint with empty text");
    }

    match client.add_complaint(&details).await {
        Ok(status) => {
            println!("✅ Complaint saved ({}).", status);
            Ok(0)
        }
        Err(e) => {
            eprintln!("\n❌ Failed to save complaint: {}", e);
            Ok(1)
        }
    }
}

/// Download the PDF and Excel artifacts into `dir`.
async fn download_artifacts(client: &ApiClient, links: &ReportLinks, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let urls = std::iter::once((&links.pdf, "report.pdf"))
        .chain(links.excel.as_ref().map(|excel| (excel, "report.xlsx")));

    for (url, fallback) in urls {
        let dest = dir.join(artifact_file_name(url, fallback));
        let bytes = client
            .download(url, &dest)
            .await
            .with_context(|| format!("Failed to download {}", url))?;
        println!("   ⬇️  {} ({} bytes)", dest.display(), bytes);
    }

    Ok(())
}

/// Last path segment of an artifact URL.
fn artifact_file_name<'a>(url: &'a str, fallback: &'a str) -> &'a str {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
}

/// Report path when `--output` is not given.
fn default_output_path(config: &Config, format: OutputFormat) -> PathBuf {
    let path = PathBuf::from(&config.general.output);
    match format {
        OutputFormat::Json => path.with_extension("json"),
        OutputFormat::Markdown => path,
    }
}

/// Spinner that shows the current stage; hidden in quiet mode.
fn stage_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so it reports the file it used instead of
/// logging it. A broken default file falls back to defaults with a warning.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, Some(PathBuf::from(CONFIG_FILE_NAME)))),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok((Config::default(), None))
        }
    }
}
