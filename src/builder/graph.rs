//! Graph aggregation: turning sessions into a transition graph.
//!
//! The aggregator maintains one node per distinct activity label and one
//! edge per distinct ordered (from, to) label pair observed consecutively
//! within any session. Identity is label-addressed, never event-addressed,
//! so the processing order of sessions does not affect the final topology.
//!
//! Synthetic `start`/`end` boundary nodes mark case entry and exit; boundary
//! edges are dashed and carry no duration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::SessionMap;

/// Identifier of the synthetic entry node.
pub const START_NODE_ID: &str = "start";
/// Identifier of the synthetic exit node.
pub const END_NODE_ID: &str = "end";

const NODE_COLOR: &str = "blue";
const START_NODE_COLOR: &str = "green";
const END_NODE_COLOR: &str = "red";

/// Line style of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    /// Regular activity transition.
    #[default]
    Solid,
    /// Synthetic boundary transition (case entry/exit).
    Dashed,
}

/// One activity in the aggregated graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identity (the activity label, or `start`/`end`).
    pub id: String,
    /// Display label.
    pub label: String,
    /// Number of times the activity appears across all sessions (for
    /// boundary nodes: the number of sessions).
    pub count: u64,
    /// Display color.
    pub color: String,
}

/// One observed transition between two activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source activity label.
    pub from: String,
    /// Target activity label.
    pub to: String,
    /// Number of times this exact transition was observed.
    pub count: u64,
    /// Running mean of observed transition durations in seconds.
    ///
    /// `None` for boundary edges, which carry no duration.
    pub avg_duration: Option<f64>,
    /// Display label: count plus formatted average duration.
    pub label: String,
    /// Line style; boundary edges are dashed.
    pub style: EdgeStyle,
}

/// Aggregated, frequency- and duration-weighted transition graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// All nodes: one per distinct activity label plus `start`/`end`.
    pub nodes: Vec<Node>,
    /// All edges: one per distinct transition plus boundary edges.
    pub edges: Vec<Edge>,
}

/// Builds a [`Graph`] from a full session map.
#[derive(Debug, Default)]
pub struct GraphAggregator {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<(String, String), Edge>,
}

impl GraphAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate every session into the final graph.
    #[must_use]
    pub fn aggregate(mut self, sessions: &SessionMap) -> Graph {
        for session in sessions.values() {
            self.process_session(session);
        }
        self.finalize(sessions)
    }

    /// Fold one session into the node and edge maps.
    fn process_session(&mut self, session: &crate::model::Session) {
        for event in &session.events {
            self.node_entry(&event.activity).count += 1;
        }

        for pair in session.events.windows(2) {
            // Recorded as-is: negative when timestamps are out of order.
            let duration = pair[0].seconds_until(&pair[1]);
            let edge = self.edge_entry(&pair[0].activity, &pair[1].activity, EdgeStyle::Solid);
            edge.count += 1;
            // Incremental running mean, O(1) per update.
            let avg = edge.avg_duration.unwrap_or(0.0);
            edge.avg_duration = Some(avg + (duration - avg) / edge.count as f64);
        }
    }

    /// Attach boundary nodes/edges and produce the output graph.
    fn finalize(mut self, sessions: &SessionMap) -> Graph {
        let session_count = sessions.len() as u64;

        for session in sessions.values() {
            let (Some(first), Some(last)) = (session.events.first(), session.events.last())
            else {
                continue;
            };
            self.edge_entry(START_NODE_ID, &first.activity, EdgeStyle::Dashed)
                .count += 1;
            self.edge_entry(&last.activity, END_NODE_ID, EdgeStyle::Dashed)
                .count += 1;
        }

        let mut nodes: Vec<Node> = self.nodes.into_values().collect();
        nodes.push(Node {
            id: START_NODE_ID.to_string(),
            label: "Start".to_string(),
            count: session_count,
            color: START_NODE_COLOR.to_string(),
        });
        nodes.push(Node {
            id: END_NODE_ID.to_string(),
            label: "End".to_string(),
            count: session_count,
            color: END_NODE_COLOR.to_string(),
        });

        let edges = self
            .edges
            .into_values()
            .map(|mut edge| {
                edge.label = match edge.avg_duration {
                    Some(avg) => format!("{}\n{avg:.2} sec avg", edge.count),
                    None => edge.count.to_string(),
                };
                edge
            })
            .collect();

        Graph { nodes, edges }
    }

    fn node_entry(&mut self, label: &str) -> &mut Node {
        self.nodes
            .entry(label.to_string())
            .or_insert_with(|| Node {
                id: label.to_string(),
                label: label.to_string(),
                count: 0,
                color: NODE_COLOR.to_string(),
            })
    }

    fn edge_entry(&mut self, from: &str, to: &str, style: EdgeStyle) -> &mut Edge {
        self.edges
            .entry((from.to_string(), to.to_string()))
            .or_insert_with(|| Edge {
                from: from.to_string(),
                to: to.to_string(),
                count: 0,
                avg_duration: None,
                label: String::new(),
                style,
            })
    }
}

impl Graph {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up an edge by endpoints.
    #[must_use]
    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}
