//! Serve command implementation.
//!
//! Spins up a tokio runtime and runs the HTTP API until interrupted.

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::error::{FlowsightError, Result};
use crate::server;

/// Run the HTTP server with the effective configuration.
pub fn run(config: &Config, args: &ServeArgs) -> Result<()> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| FlowsightError::io("Failed to start async runtime", e))?;
    runtime.block_on(server::serve(config))
}
