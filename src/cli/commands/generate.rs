//! Generate command implementation.
//!
//! Writes a synthetic CSV event log for demos and detector testing.

use crate::cli::GenerateArgs;
use crate::error::{FlowsightError, Result};
use crate::generator::{GeneratorConfig, LogGenerator};

/// Generate a synthetic event log at the requested path.
pub fn run(args: &GenerateArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.incomplete_rate) {
        return Err(FlowsightError::InvalidArgument {
            name: "incomplete-rate".to_string(),
            reason: format!("must be within 0.0..=1.0, got {}", args.incomplete_rate),
        });
    }
    if args.instances == 0 {
        return Err(FlowsightError::InvalidArgument {
            name: "instances".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let config = GeneratorConfig {
        instances: args.instances,
        max_events: args.max_events,
        self_loops: args.self_loops,
        ping_pongs: args.ping_pongs,
        anomalies: args.anomalies,
        errors: args.errors,
        incomplete_rate: args.incomplete_rate,
        seed: args.seed,
    };

    LogGenerator::new(config).write_to_path(&args.output)?;
    println!("Event log written to {}", args.output.display());
    Ok(())
}
