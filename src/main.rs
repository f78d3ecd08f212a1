//! CLI entry point for the exploration and report pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use eda_explorer::narrative::{LocalNarrative, NarrativeProvider};
use eda_explorer::{
    CleaningEngine, CleaningSummary, Dataset, QueryExecutor, ReportAssembler, ReportOptions,
    ReportPipeline, SessionStore,
};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "ai")]
use eda_explorer::narrative::{GeminiConfig, GeminiProvider};
#[cfg(feature = "ai")]
use std::env;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Dataset exploration and PDF report pipeline",
    long_about = "Ingest a CSV, apply cleaning operations, run ad-hoc queries and \
                  assemble an illustrated PDF report.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for narrative generation (optional; \
                  without it narratives are produced offline)\n\n\
                  EXAMPLES:\n  \
                  # Clean everything and build the report\n  \
                  eda-explorer -i data.csv --all --report\n\n  \
                  # One ad-hoc query\n  \
                  eda-explorer -i data.csv --query \"mean(age)\"\n\n  \
                  # Fully offline report\n  \
                  eda-explorer -i data.csv --report --offline"
)]
struct Args {
    /// Path to the CSV file to explore
    #[arg(short, long)]
    input: String,

    /// Output directory for plots and the PDF
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Fill missing values (median / mode / forward-backward fill)
    #[arg(long)]
    impute: bool,

    /// Remove exact duplicate rows
    #[arg(long)]
    dedup: bool,

    /// Narrow integral float columns and settle categorical tags
    #[arg(long)]
    coerce: bool,

    /// Remove rows outside the IQR bounds of any numeric column
    #[arg(long)]
    filter_outliers: bool,

    /// Run all cleaning operations (impute, dedup, coerce, filter-outliers)
    #[arg(short, long)]
    all: bool,

    /// Snapshot the cleaned dataset as the explicit baseline after the
    /// cleaning operations
    #[arg(long)]
    commit: bool,

    /// Ad-hoc query expression to run against the cleaned dataset
    #[arg(short, long)]
    query: Option<String>,

    /// Generate the PDF report
    #[arg(short, long)]
    report: bool,

    /// Report title
    #[arg(long, default_value = "Exploratory Data Analysis Report")]
    title: String,

    /// Use the offline narrative provider even when an API key is set
    #[arg(long)]
    offline: bool,

    /// Narrative model override (e.g. "gemini-1.5-pro")
    #[arg(long)]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(long)]
    quiet: bool,

    /// Output a JSON run summary to stdout instead of the human-readable one
    ///
    /// Disables all logs so stdout carries only the JSON.
    #[arg(long)]
    json: bool,
}

/// Machine-readable run summary for `--json`.
#[derive(Serialize)]
struct RunSummary {
    input: String,
    original_shape: (usize, usize),
    final_shape: (usize, usize),
    operations: Vec<CleaningSummary>,
    query: Option<String>,
    query_result: Option<String>,
    report_pdf: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let frame = load_csv_with_fallbacks(&args.input)?;
    let mut session = SessionStore::ingest(frame)?;
    let original_shape = session.original().shape();
    info!("Dataset loaded successfully: {:?}", original_shape);

    let mut operations = Vec::new();
    run_cleaning(&args, &mut session, &mut operations)?;

    let mut query_result = None;
    if let Some(expression) = &args.query {
        query_result = Some(execute_query(expression, session.working()));
    }

    let mut report_pdf = None;
    if args.report {
        let options = ReportOptions::builder()
            .title(&args.title)
            .output_dir(&args.output)
            .build()?;
        let provider = build_provider(&args);
        let pipeline = ReportPipeline::new(provider, options.clone());
        let sections = pipeline.generate(session.working())?;
        let pdf = ReportAssembler::new(options).assemble(&sections)?;
        report_pdf = Some(pdf);
    }

    let summary = RunSummary {
        input: args.input.clone(),
        original_shape,
        final_shape: session.working().shape(),
        operations,
        query: args.query.clone(),
        query_result,
        report_pdf,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human_readable_summary(&summary);
    Ok(())
}

/// Apply the requested cleaning operations in a fixed order.
fn run_cleaning(
    args: &Args,
    session: &mut SessionStore,
    operations: &mut Vec<CleaningSummary>,
) -> Result<()> {
    let mut apply = |run: bool,
                     op: fn(&Dataset) -> eda_explorer::Result<(Dataset, CleaningSummary)>|
     -> Result<()> {
        if run {
            let (cleaned, summary) = op(session.working())?;
            session.replace_working(cleaned);
            operations.push(summary);
        }
        Ok(())
    };

    apply(args.all || args.impute, CleaningEngine::impute_missing)?;
    apply(args.all || args.dedup, CleaningEngine::deduplicate)?;
    apply(args.all || args.coerce, CleaningEngine::coerce_types)?;
    apply(args.all || args.filter_outliers, CleaningEngine::filter_outliers)?;

    if args.commit {
        let (committed, summary) = CleaningEngine::commit(session.working());
        session.replace_working(committed);
        operations.push(summary);
    }
    Ok(())
}

/// Run an ad-hoc query against the working dataset.
///
/// A query fault never aborts the run; the error becomes the visible query
/// result and the rest of the pipeline continues.
fn execute_query(expression: &str, dataset: &Dataset) -> String {
    match QueryExecutor::run(expression, dataset) {
        Ok(result) => result.render(),
        Err(e) => {
            warn!("Query failed: {}", e);
            format!("query error: {}", e)
        }
    }
}

/// Pick the narrative provider from flags and environment.
#[cfg(feature = "ai")]
fn build_provider(args: &Args) -> Arc<dyn NarrativeProvider> {
    if args.offline {
        info!("Narratives run offline (--offline)");
        return Arc::new(LocalNarrative);
    }

    let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("GEMINI_API_KEY not set. Narratives fall back to the offline provider.");
        return Arc::new(LocalNarrative);
    }

    let mut builder = GeminiConfig::builder();
    if let Some(model) = &args.model {
        builder = builder.model(model);
    }
    match GeminiProvider::with_config(api_key, builder.build()) {
        Ok(provider) => {
            info!("Narratives via Gemini ({})", provider.model().unwrap_or("-"));
            Arc::new(provider)
        }
        Err(e) => {
            warn!("Could not build Gemini client ({}), running offline", e);
            Arc::new(LocalNarrative)
        }
    }
}

#[cfg(not(feature = "ai"))]
fn build_provider(args: &Args) -> Arc<dyn NarrativeProvider> {
    if !args.offline {
        warn!("AI support not compiled in. Using the offline narrative provider.");
        warn!("Compile with --features ai to enable hosted narratives.");
    }
    Arc::new(LocalNarrative)
}

/// Load a CSV with progressively more permissive strategies.
fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: pre-clean the content
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Could not read file {}: {}", path, e))?;
    let cleaned = clean_csv_content(&content);

    use std::io::Cursor;
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .map_err(|e| anyhow!("All CSV loading strategies failed: {}", e))
}

/// Strip a BOM, normalize line endings and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` intentionally: this is the primary CLI output and should
/// stay visible regardless of log level.
fn print_human_readable_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("EXPLORATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("  Input:   {}", summary.input);
    println!(
        "  Shape:   {} x {}  ->  {} x {}",
        summary.original_shape.0,
        summary.original_shape.1,
        summary.final_shape.0,
        summary.final_shape.1
    );
    println!();

    if !summary.operations.is_empty() {
        println!("CLEANING OPERATIONS");
        println!("{}", "-".repeat(40));
        for op in &summary.operations {
            println!("  {}", op.digest());
            for message in &op.messages {
                println!("    - {}", message);
            }
            for warning in &op.warnings {
                println!("    ! {}", warning);
            }
        }
        println!();
    }

    if let Some(query) = &summary.query {
        println!("QUERY");
        println!("{}", "-".repeat(40));
        println!("  {}", query);
        println!();
        if let Some(result) = &summary.query_result {
            println!("{}", result);
            println!();
        }
    }

    if let Some(pdf) = &summary.report_pdf {
        println!("REPORT");
        println!("{}", "-".repeat(40));
        println!("  {}", pdf.display());
        println!();
    }

    println!("{}", "=".repeat(80));
}
