//! Configuration management for flowsight.
//!
//! TOML configuration with two sections:
//! - `[server]`: listen port and upload size limit,
//! - `[analyzer]`: completion markers and the error outcome sentinel
//!   (locale/deployment specific, hence configuration).
//!
//! Every field has a default, so a missing or partial file is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analytics::Analyzer;
use crate::error::{FlowsightError, Result};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metrics analyzer settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted upload body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Metrics analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Case-insensitive substring marking a completed instance's first
    /// activity.
    #[serde(default = "default_start_marker")]
    pub start_marker: String,
    /// Case-insensitive substring marking a completed instance's last
    /// activity.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
    /// Outcome value that marks an event as failed.
    #[serde(default = "default_error_outcome")]
    pub error_outcome: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            error_outcome: default_error_outcome(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    // Matches the upstream ingest bound of 3 GiB.
    3 * 1024 * 1024 * 1024
}

fn default_start_marker() -> String {
    "start".to_string()
}

fn default_end_marker() -> String {
    "end".to_string()
}

fn default_error_outcome() -> String {
    "error".to_string()
}

impl Config {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlowsightError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;
        toml::from_str(&content).map_err(|e| FlowsightError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Load from an optional path; defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }
}

impl AnalyzerConfig {
    /// Build an [`Analyzer`] from these settings.
    #[must_use]
    pub fn to_analyzer(&self) -> Analyzer {
        Analyzer::new()
            .with_markers(&self.start_marker, &self.end_marker)
            .with_error_outcome(&self.error_outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analyzer.start_marker, "start");
        assert_eq!(config.analyzer.error_outcome, "error");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [analyzer]
            start_marker = "begin"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_upload_bytes, 3 * 1024 * 1024 * 1024);
        assert_eq!(config.analyzer.start_marker, "begin");
        assert_eq!(config.analyzer.end_marker, "end");
    }

    #[test]
    fn load_or_default_without_path() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
