//! flowsight: process mining over CSV event logs.
//!
//! Rebuilds the actually-executed process model from timestamped event
//! logs: groups events into per-case sessions, aggregates them into a
//! frequency- and duration-weighted transition graph, and runs a fixed
//! catalog of twelve inefficiency detectors over the sessions.
//!
//! # Pipeline
//!
//! ```text
//! CSV event log ──parse──▶ events ──group──▶ sessions ─┬─▶ transition graph
//!                                                      └─▶ metrics report
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use flowsight::ProcessMiner;
//!
//! let csv = "case_id,timestamp,activity,result\n\
//!            order-1,2024-01-15T10:00:00Z,Process start,success\n\
//!            order-1,2024-01-15T10:04:00Z,Review,success\n\
//!            order-1,2024-01-15T10:09:00Z,End,success\n";
//!
//! let mut miner = ProcessMiner::new();
//! miner.build_from_str(csv)?;
//!
//! let graph = miner.graph();
//! assert!(graph.edge("Process start", "Review").is_some());
//!
//! let report = miner.metrics_report();
//! assert_eq!(report.total_process_instances, 1);
//! # Ok::<(), flowsight::FlowsightError>(())
//! ```
//!
//! The `serve` CLI command exposes the same pipeline over HTTP; see
//! [`server`] for the route table.

pub mod analytics;
pub mod api;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod server;

pub use api::ProcessMiner;
pub use error::{FlowsightError, Result};

/// Crate version, from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, from Cargo.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::analytics::{Analyzer, MetricsReport};
    pub use crate::api::ProcessMiner;
    pub use crate::builder::graph::{Edge, Graph, Node};
    pub use crate::error::{FlowsightError, Result};
    pub use crate::model::{Event, Session};
    pub use crate::parser::EventLogParser;
}
