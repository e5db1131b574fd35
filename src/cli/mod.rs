//! Command-line interface for flowsight.
//!
//! Provides scriptable access to the process mining pipeline with
//! four commands:
//! - `serve`: Run the HTTP API server
//! - `analyze`: Analyze a CSV event log and print the report
//! - `generate`: Generate a synthetic event log
//! - `completions`: Generate shell completion scripts

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

/// Process mining toolkit: event logs in, transition graphs and
/// inefficiency reports out.
#[derive(Debug, Parser)]
#[command(name = "flowsight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to custom configuration file.
    #[arg(short = 'c', long, global = true, env = "FLOWSIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info", env = "FLOWSIGHT_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "FLOWSIGHT_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// Errors, warnings, and informational messages.
    #[default]
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Analyze a CSV event log and print the report.
    Analyze(AnalyzeArgs),
    /// Generate a synthetic event log.
    Generate(GenerateArgs),
    /// Generate shell completion scripts.
    Completions(CompletionsArgs),
}

/// Arguments for the `serve` command.
#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides configuration).
    #[arg(short = 'p', long, env = "FLOWSIGHT_PORT")]
    pub port: Option<u16>,
}

/// Arguments for the `analyze` command.
#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    /// CSV event log to analyze.
    pub file: PathBuf,

    /// Print the aggregated graph instead of the metrics report.
    #[arg(short = 'g', long)]
    pub graph: bool,

    /// Emit compact JSON on a single line.
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the `generate` command.
#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Output CSV file.
    #[arg(short = 'o', long, default_value = "event_log.csv")]
    pub output: PathBuf,

    /// Number of process instances.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub instances: usize,

    /// Maximum events per instance.
    #[arg(long, default_value_t = 10)]
    pub max_events: usize,

    /// Instances that may receive an injected self-loop.
    #[arg(long, default_value_t = 5)]
    pub self_loops: usize,

    /// Instances that may receive an injected ping-pong.
    #[arg(long, default_value_t = 5)]
    pub ping_pongs: usize,

    /// Instances that may receive an injected duration anomaly.
    #[arg(long, default_value_t = 5)]
    pub anomalies: usize,

    /// Instances that may receive an injected error outcome.
    #[arg(long, default_value_t = 5)]
    pub errors: usize,

    /// Probability (0.0-1.0) that an instance is left incomplete.
    #[arg(long, default_value_t = 0.1)]
    pub incomplete_rate: f64,

    /// RNG seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the `completions` command.
#[derive(Debug, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Generate shell completions to stdout.
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "flowsight", &mut io::stdout());
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Commands::Serve(args) => commands::serve::run(&config, args),
        Commands::Analyze(args) => commands::analyze::run(&config, args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}
