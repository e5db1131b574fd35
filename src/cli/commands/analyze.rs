//! Analyze command implementation.
//!
//! One-shot pipeline: parse a CSV event log, build the model, print the
//! metrics report (or the graph) as JSON to stdout.

use crate::api::ProcessMiner;
use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{FlowsightError, Result};

/// Analyze an event log file and print the result.
pub fn run(config: &Config, args: &AnalyzeArgs) -> Result<()> {
    let mut miner = ProcessMiner::with_analyzer(config.analyzer.to_analyzer());
    miner.build_from_path(&args.file)?;

    let json = if args.graph {
        to_json(miner.graph(), args.compact)?
    } else {
        to_json(&miner.metrics_report(), args.compact)?
    };

    println!("{json}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let result = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    result.map_err(|e| FlowsightError::serialization("Failed to encode report", e))
}
