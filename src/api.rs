//! High-level facade for process mining operations.
//!
//! [`ProcessMiner`] is the single owner of all mutable model state, with a
//! build → read → clear lifecycle:
//!
//! ```rust
//! use flowsight::ProcessMiner;
//!
//! let csv = "case_id,timestamp,activity,result\n\
//!            c1,2024-01-15T10:00:00Z,Start,success\n\
//!            c1,2024-01-15T10:05:00Z,End,success\n";
//!
//! let mut miner = ProcessMiner::new();
//! miner.build_from_str(csv)?;
//!
//! let graph = miner.graph();
//! let report = miner.metrics_report();
//! assert_eq!(report.total_process_instances, 1);
//!
//! miner.clear();
//! # Ok::<(), flowsight::FlowsightError>(())
//! ```
//!
//! Builds are atomic: events are staged into a fresh builder and committed
//! only when the whole ingest parses, so a failed build never corrupts the
//! previous model.

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::analytics::{Analyzer, MetricsReport};
use crate::builder::graph::{Graph, GraphAggregator};
use crate::builder::{SessionBuilder, SessionMap};
use crate::error::Result;
use crate::parser::EventLogParser;

/// Owner of the session map and aggregated graph.
#[derive(Debug, Default)]
pub struct ProcessMiner {
    sessions: SessionMap,
    graph: Graph,
    analyzer: Analyzer,
}

impl ProcessMiner {
    /// Create an empty miner with default analyzer settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a miner with a custom analyzer (localized completion markers,
    /// error sentinel).
    #[must_use]
    pub fn with_analyzer(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            ..Self::default()
        }
    }

    /// Build the model from a CSV file, replacing any prior state.
    pub fn build_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let events = EventLogParser::new().parse_path(path)?;
        self.commit(events);
        Ok(())
    }

    /// Build the model from any CSV reader, replacing any prior state.
    pub fn build_from_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let events = EventLogParser::new().parse_reader(reader)?;
        self.commit(events);
        Ok(())
    }

    /// Build the model from an in-memory CSV string.
    pub fn build_from_str(&mut self, content: &str) -> Result<()> {
        self.build_from_reader(content.as_bytes())
    }

    /// Stage parsed events into a fresh builder and swap the new state in.
    fn commit(&mut self, events: Vec<crate::model::Event>) {
        let mut builder = SessionBuilder::new();
        builder.ingest_all(events);
        self.sessions = builder.into_sessions();
        self.graph = GraphAggregator::new().aggregate(&self.sessions);
        info!(
            sessions = self.sessions.len(),
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            "model built"
        );
    }

    /// Read-only snapshot of the aggregated graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Borrow the session map.
    #[must_use]
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    /// Recompute the metrics report over current session state.
    ///
    /// Never cached: detectors are cheap relative to ingest and the report
    /// must reflect the exact current sessions.
    #[must_use]
    pub fn metrics_report(&self) -> MetricsReport {
        self.analyzer.analyze(&self.sessions)
    }

    /// Discard and reallocate all container state. All-or-nothing.
    pub fn clear(&mut self) {
        self.sessions = SessionMap::new();
        self.graph = Graph::default();
        info!("model cleared");
    }
}
