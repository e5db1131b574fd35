//! Core data model for event logs.
//!
//! An event log is a flat sequence of [`Event`] records; events sharing a
//! case id form a [`Session`] (one process instance). Ordering within a
//! session is defined by arrival order in the source, not re-sorted by
//! timestamp — out-of-order timestamps are a data-quality condition the
//! analyzer detects, it never silently fixes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome value assigned when the source record carries no outcome field.
pub const DEFAULT_OUTCOME: &str = "success";

/// One normalized event log line.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Case (process instance) identifier.
    pub case_id: String,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Activity label. Graph nodes and edges are addressed by this label.
    pub activity: String,
    /// Outcome of the event, e.g. "success" or "error".
    pub outcome: String,
}

impl Event {
    /// Create a new event with an explicit outcome.
    #[must_use]
    pub fn new(
        case_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        activity: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            timestamp,
            activity: activity.into(),
            outcome: outcome.into(),
        }
    }

    /// Whether the timestamp carries a usable value.
    ///
    /// The Unix epoch is treated as the "missing timestamp" sentinel;
    /// strictly parsed logs never produce it, but programmatically built
    /// events might.
    #[must_use]
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != DateTime::<Utc>::UNIX_EPOCH
    }

    /// Elapsed seconds from `self` to `other` (negative when out of order).
    #[must_use]
    pub fn seconds_until(&self, other: &Event) -> f64 {
        (other.timestamp - self.timestamp).num_milliseconds() as f64 / 1000.0
    }
}

/// Ordered sequence of events sharing one case id.
///
/// Created lazily on the first event for a case, grows by append, and is
/// never mutated after the full ingest completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Events in arrival order.
    pub events: Vec<Event>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, preserving arrival order.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of events in the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the session holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whole-session duration in seconds: last timestamp minus first.
    ///
    /// Returns `None` for sessions with fewer than two events, where no
    /// duration can be computed.
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) if self.events.len() >= 2 => {
                Some(first.seconds_until(last))
            }
            _ => None,
        }
    }

    /// The exact ordered sequence of activity labels.
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    /// The path joined into a single key, used for path frequency and
    /// variability calculations.
    #[must_use]
    pub fn path_key(&self) -> String {
        self.path().join("→")
    }
}
