//! Session building: grouping raw events into per-case sequences.
//!
//! The [`SessionBuilder`] accepts one event at a time, as records stream
//! from the CSV parser, and accumulates them into a [`SessionMap`] keyed by
//! case id. No reordering, no deduplication, no cross-case logic: within a
//! session events keep their arrival order.

pub mod graph;

use indexmap::IndexMap;

use crate::model::{Event, Session};

/// Sessions keyed by case id, in first-seen order.
///
/// Insertion order is what makes downstream output deterministic: the graph
/// aggregator and every detector walk this map in the order cases first
/// appeared in the source.
pub type SessionMap = IndexMap<String, Session>;

/// Groups raw events into per-case ordered sequences.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    sessions: SessionMap,
}

impl SessionBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event to its session, creating the session lazily on the
    /// first event for a case id.
    pub fn ingest(&mut self, event: Event) {
        self.sessions
            .entry(event.case_id.clone())
            .or_default()
            .push(event);
    }

    /// Append every event from an iterator.
    pub fn ingest_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.ingest(event);
        }
    }

    /// Number of sessions accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions have been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Borrow the accumulated sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    /// Finish building and take ownership of the session map.
    #[must_use]
    pub fn into_sessions(self) -> SessionMap {
        self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_OUTCOME;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn groups_by_case_preserving_arrival_order() {
        let mut builder = SessionBuilder::new();
        builder.ingest_all([
            Event::new("c1", ts(0), "A", DEFAULT_OUTCOME),
            Event::new("c2", ts(5), "X", DEFAULT_OUTCOME),
            // Out-of-order timestamp stays where it arrived
            Event::new("c1", ts(2), "B", DEFAULT_OUTCOME),
            Event::new("c1", ts(1), "C", DEFAULT_OUTCOME),
        ]);

        let sessions = builder.into_sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions["c1"].path(), vec!["A", "B", "C"]);
        assert_eq!(sessions["c2"].path(), vec!["X"]);

        // First-seen order of cases
        let keys: Vec<_> = sessions.keys().collect();
        assert_eq!(keys, vec!["c1", "c2"]);
    }

    #[test]
    fn no_deduplication() {
        let mut builder = SessionBuilder::new();
        let event = Event::new("c1", ts(0), "A", DEFAULT_OUTCOME);
        builder.ingest(event.clone());
        builder.ingest(event);
        assert_eq!(builder.sessions()["c1"].len(), 2);
    }
}
