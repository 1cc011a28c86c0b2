//! # unusual-ranges
//!
//! Command-line interface for detecting unusual price-movement ranges.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anomaly::{
    critical_value, detect_with_timeout, AnomalyError, DetectionConfig, FormattedRange,
    GapThresholdPolicy, Garch11, PriceSeriesInput, RangeOrdering, TestPolicy,
    UnusualRangePipeline,
};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TIME_COLUMNS: &[&str] = &["time", "date", "timestamp", "datetime"];
const PRICE_COLUMNS: &[&str] = &["price", "close", "value", "adj_close"];

/// Exit status when the pipeline ran but flagged nothing.
const EXIT_NO_ANOMALIES: i32 = 2;

#[derive(Parser)]
#[command(name = "unusual-ranges")]
#[command(about = "Detect unusual price-movement ranges", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect unusual ranges and print them as [start, end] date pairs
    Detect {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Abort detection after this many milliseconds
        #[arg(long, env = "UNUSUAL_RANGES_TIMEOUT_MS")]
        timeout_ms: Option<u64>,

        /// Print an empty list instead of failing when nothing is flagged
        #[arg(long)]
        allow_empty: bool,

        /// Emit the full detection report instead of the ranges only
        #[arg(long, conflicts_with = "timeout_ms")]
        report: bool,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit the volatility model and print the per-day conditional volatility
    Volatility {
        #[command(flatten)]
        source: SourceArgs,

        /// TOML configuration file
        #[arg(long, env = "UNUSUAL_RANGES_CONFIG")]
        config: Option<PathBuf>,

        /// Output file for the JSON fit (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Input file (CSV or JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// CSV column holding timestamps (default: time, date, timestamp)
    #[arg(long)]
    time_column: Option<String>,

    /// CSV column holding prices (default: price, close, value)
    #[arg(long)]
    price_column: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct TuningArgs {
    /// TOML configuration file
    #[arg(long, env = "UNUSUAL_RANGES_CONFIG")]
    config: Option<PathBuf>,

    /// Two-tailed significance level in (0, 1)
    #[arg(short = 'c', long, env = "UNUSUAL_RANGES_CONFIDENCE_LEVEL")]
    confidence_level: Option<f64>,

    /// Tests a day must fail to be flagged
    #[arg(long, value_enum)]
    test_policy: Option<TestPolicyArg>,

    /// Merge threshold between flagged days
    #[arg(long, value_enum)]
    gap_policy: Option<GapPolicyArg>,

    /// Output ordering of the ranges
    #[arg(long, value_enum)]
    ordering: Option<OrderingArg>,

    /// Days a single-day range is widened by
    #[arg(long)]
    widen_days: Option<i64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TestPolicyArg {
    VolatilityOnly,
    Combined,
}

impl From<TestPolicyArg> for TestPolicy {
    fn from(arg: TestPolicyArg) -> Self {
        match arg {
            TestPolicyArg::VolatilityOnly => TestPolicy::VolatilityOnly,
            TestPolicyArg::Combined => TestPolicy::Combined,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GapPolicyArg {
    MeanPlusStdDev,
    Median,
}

impl From<GapPolicyArg> for GapThresholdPolicy {
    fn from(arg: GapPolicyArg) -> Self {
        match arg {
            GapPolicyArg::MeanPlusStdDev => GapThresholdPolicy::MeanPlusStdDev,
            GapPolicyArg::Median => GapThresholdPolicy::Median,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderingArg {
    Chronological,
    SpanDescending,
}

impl From<OrderingArg> for RangeOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Chronological => RangeOrdering::Chronological,
            OrderingArg::SpanDescending => RangeOrdering::SpanDescending,
        }
    }
}

/// One row of a record-oriented JSON input.
#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(alias = "date", alias = "timestamp", alias = "datetime")]
    time: String,
    #[serde(alias = "close", alias = "value")]
    price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSeries {
    Records(Vec<PriceRecord>),
    Columns(PriceSeriesInput),
}

impl From<JsonSeries> for PriceSeriesInput {
    fn from(series: JsonSeries) -> Self {
        match series {
            JsonSeries::Columns(input) => input,
            JsonSeries::Records(records) => {
                let (time, price) = records.into_iter().map(|r| (r.time, r.price)).unzip();
                PriceSeriesInput::new(time, price)
            }
        }
    }
}

/// Per-day row of the `volatility` command.
#[derive(Debug, Serialize)]
struct VolatilityRow {
    date: String,
    change: f64,
    volatility: f64,
    /// `|change| / volatility`, compared against the critical value.
    score: f64,
    flagged: bool,
}

#[derive(Debug, Serialize)]
struct VolatilityOutput {
    model: String,
    mu: f64,
    omega: f64,
    alpha: f64,
    beta: f64,
    persistence: f64,
    long_run_variance: f64,
    log_likelihood: f64,
    iterations: usize,
    confidence_level: f64,
    critical_value: f64,
    days: Vec<VolatilityRow>,
}

// ============================================================================
// Input loading
// ============================================================================

/// Find a column by explicit name, or by the first matching default name.
fn column_index(
    headers: &csv::StringRecord,
    explicit: Option<&str>,
    defaults: &[&str],
) -> Result<usize> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    match explicit {
        Some(name) => position(name).ok_or_else(|| anyhow!("Column '{}' not found", name)),
        None => defaults
            .iter()
            .find_map(|name| position(*name))
            .ok_or_else(|| anyhow!("None of the columns {:?} found", defaults)),
    }
}

/// Load a series from a CSV file with a header row
fn load_csv_series(path: &Path, source: &SourceArgs) -> Result<PriceSeriesInput> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers().context("Failed to read CSV headers")?.clone();
    let time_idx = column_index(&headers, source.time_column.as_deref(), TIME_COLUMNS)?;
    let price_idx = column_index(&headers, source.price_column.as_deref(), PRICE_COLUMNS)?;

    let mut time = Vec::new();
    let mut price = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV record {}", row + 1))?;
        let raw_time = record
            .get(time_idx)
            .ok_or_else(|| anyhow!("Row {} has no time field", row + 1))?;
        let raw_price = record
            .get(price_idx)
            .ok_or_else(|| anyhow!("Row {} has no price field", row + 1))?;
        let value: f64 = raw_price
            .trim()
            .parse()
            .with_context(|| format!("Row {}: invalid price '{}'", row + 1, raw_price))?;
        time.push(raw_time.trim().to_string());
        price.push(value);
    }

    Ok(PriceSeriesInput::new(time, price))
}

/// Load a series from a JSON file: `{"time": [...], "price": [...]}` or an
/// array of `{"time": ..., "price": ...}` records
fn load_json_series(path: &Path) -> Result<PriceSeriesInput> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let series: JsonSeries = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(series.into())
}

/// Load data from file (auto-detect format)
fn load_series(source: &SourceArgs) -> Result<PriceSeriesInput> {
    let path = source.input.as_path();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let input = match ext.as_str() {
        "csv" => load_csv_series(path, source)?,
        "json" => load_json_series(path)?,
        // Try JSON first, then CSV
        _ => load_json_series(path).or_else(|_| load_csv_series(path, source))?,
    };

    info!(
        points = input.price.as_ref().map_or(0, Vec::len),
        path = %path.display(),
        "loaded price series"
    );
    Ok(input)
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config_file(path: Option<&Path>) -> Result<DetectionConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(DetectionConfig::default()),
    }
}

/// Config file (or defaults), then command-line overrides.
fn resolve_config(tuning: &TuningArgs) -> Result<DetectionConfig> {
    let mut config = load_config_file(tuning.config.as_deref())?;

    if let Some(level) = tuning.confidence_level {
        config.confidence_level = level;
    }
    if let Some(policy) = tuning.test_policy {
        config.test_policy = policy.into();
    }
    if let Some(policy) = tuning.gap_policy {
        config.gap_policy = policy.into();
    }
    if let Some(ordering) = tuning.ordering {
        config.ordering = ordering.into();
    }
    if let Some(days) = tuning.widen_days {
        config.widen_days = days;
    }

    config.validate()?;
    debug!(?config, "resolved detection config");
    Ok(config)
}

// ============================================================================
// Commands
// ============================================================================

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "results written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn detect_ranges(
    input: PriceSeriesInput,
    config: DetectionConfig,
    timeout_ms: Option<u64>,
) -> std::result::Result<Vec<FormattedRange>, AnomalyError> {
    match timeout_ms {
        Some(ms) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| AnomalyError::TaskFailed(e.to_string()))?;
            runtime.block_on(detect_with_timeout(
                input,
                config,
                Some(Duration::from_millis(ms)),
            ))
        }
        None => UnusualRangePipeline::new(config)?.run_input(&input),
    }
}

/// Run detect command
fn run_detect(
    source: &SourceArgs,
    tuning: &TuningArgs,
    timeout_ms: Option<u64>,
    allow_empty: bool,
    report: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(tuning)?;
    let input = load_series(source)?;

    if report {
        let series = input.to_time_series()?;
        let report = UnusualRangePipeline::new(config)?.analyze(&series)?;
        return write_json(&report, output);
    }

    let ranges = match detect_ranges(input, config, timeout_ms) {
        Ok(ranges) => ranges,
        Err(AnomalyError::NoAnomaliesFound { .. }) if allow_empty => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    write_json(&ranges, output)
}

/// Run volatility command
fn run_volatility(source: &SourceArgs, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config_file(config)?;
    config.validate()?;
    let critical = critical_value(config.confidence_level)?;
    let series = load_series(source)?.to_time_series()?;
    let changes = series.daily_changes();

    let model = Garch11::from_config(config.garch);
    let fit = model.fit_model(&changes)?;

    let days: Vec<VolatilityRow> = series
        .change_dates()
        .iter()
        .zip(&changes)
        .zip(&fit.conditional_volatility)
        .map(|((date, change), vol)| {
            let score = change.abs() / vol;
            VolatilityRow {
                date: date.format("%Y-%m-%d").to_string(),
                change: *change,
                volatility: *vol,
                score,
                flagged: score > critical,
            }
        })
        .collect();

    let result = VolatilityOutput {
        model: "garch(1,1)".to_string(),
        mu: fit.mu,
        omega: fit.omega,
        alpha: fit.alpha,
        beta: fit.beta,
        persistence: fit.persistence(),
        long_run_variance: fit.long_run_variance(),
        log_likelihood: fit.log_likelihood,
        iterations: fit.iterations,
        confidence_level: config.confidence_level,
        critical_value: critical,
        days,
    };

    if output.is_some() {
        return write_json(&result, output);
    }

    println!("Model: {}", result.model);
    println!(
        "mu={:.6} omega={:.6} alpha={:.4} beta={:.4} persistence={:.4}",
        result.mu, result.omega, result.alpha, result.beta, result.persistence
    );
    println!(
        "log-likelihood={:.4} iterations={}",
        result.log_likelihood, result.iterations
    );
    println!(
        "critical value={:.4} (confidence level {})",
        result.critical_value, result.confidence_level
    );
    println!(
        "\n{:<12} {:>14} {:>14} {:>8} {:>8}",
        "date", "change", "volatility", "score", "flagged"
    );
    for row in &result.days {
        println!(
            "{:<12} {:>14.4} {:>14.4} {:>8.3} {:>8}",
            row.date,
            row.change,
            row.volatility,
            row.score,
            if row.flagged { "*" } else { "" }
        );
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Detect {
            source,
            tuning,
            timeout_ms,
            allow_empty,
            report,
            output,
        } => run_detect(
            &source,
            &tuning,
            timeout_ms,
            allow_empty,
            report,
            output.as_deref(),
        ),

        Commands::Volatility {
            source,
            config,
            output,
        } => run_volatility(&source, config.as_deref(), output.as_deref()),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AnomalyError>() {
        Some(AnomalyError::NoAnomaliesFound { .. }) => EXIT_NO_ANOMALIES,
        _ => 1,
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
