//! CSV event log parsing.
//!
//! Reads raw event records from CSV input in strict mode: the first
//! malformed record aborts the whole ingest with the offending record's
//! context. Expected column layout:
//!
//! | column | meaning          |
//! |--------|------------------|
//! | 0      | case identifier  |
//! | 1      | timestamp text   |
//! | 2      | activity label   |
//! | 3      | outcome (optional, defaults to `success`) |
//!
//! Timestamps are tried against a fixed, ordered list of accepted formats;
//! the first match wins and a text matching none of them is a parse error.
//!
//! # Example
//!
//! ```rust
//! use flowsight::parser::EventLogParser;
//!
//! let csv = "case_id,timestamp,activity,result\n\
//!            case_1,2024-01-15T10:00:00Z,Process start,success\n";
//! let events = EventLogParser::new().parse_str(csv)?;
//! assert_eq!(events.len(), 1);
//! # Ok::<(), flowsight::FlowsightError>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{FlowsightError, Result};
use crate::model::{Event, DEFAULT_OUTCOME};

/// Naive timestamp formats accepted after RFC 3339, in priority order.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Parse a timestamp using the fixed priority list of accepted formats.
///
/// RFC 3339 (with offset) is tried first; naive formats are interpreted as
/// UTC. Returns `None` when no format matches.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Statistics about a parse run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseStats {
    /// Records successfully converted into events.
    pub records_parsed: usize,
}

/// Strict CSV event log parser.
#[derive(Debug)]
pub struct EventLogParser {
    /// Whether the input starts with a header row (skipped when true).
    has_headers: bool,
    stats: ParseStats,
}

impl Default for EventLogParser {
    fn default() -> Self {
        Self {
            has_headers: true,
            stats: ParseStats::default(),
        }
    }
}

impl EventLogParser {
    /// Create a new parser with default settings (header row expected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the input starts with a header row.
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Statistics from the most recent parse run.
    #[must_use]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Parse an event log from a file path.
    pub fn parse_path(&mut self, path: impl AsRef<Path>) -> Result<Vec<Event>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FlowsightError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)
            .map_err(|e| FlowsightError::io(format!("Failed to open {}", path.display()), e))?;
        self.parse_reader(file)
    }

    /// Parse an event log from an in-memory string.
    pub fn parse_str(&mut self, content: &str) -> Result<Vec<Event>> {
        self.parse_reader(content.as_bytes())
    }

    /// Parse an event log from any reader.
    ///
    /// Strict: returns the first error encountered, with the record number
    /// and offending field in the message. No events are returned for a
    /// failed parse.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<Vec<Event>> {
        self.stats = ParseStats::default();

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut events = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record_number = index + 1;
            let record = record
                .map_err(|e| FlowsightError::csv(format!("record {record_number}"), e))?;
            events.push(Self::record_to_event(record_number, &record)?);
        }

        self.stats.records_parsed = events.len();
        debug!(records = events.len(), "event log parsed");
        Ok(events)
    }

    /// Convert one raw CSV record into an [`Event`].
    fn record_to_event(record_number: usize, record: &StringRecord) -> Result<Event> {
        if record.len() < 3 {
            return Err(FlowsightError::parse(
                record_number,
                format!("record contains fewer than 3 fields: {:?}", record),
            ));
        }

        let timestamp_text = &record[1];
        let timestamp = parse_timestamp(timestamp_text).ok_or_else(|| {
            FlowsightError::parse(
                record_number,
                format!("unrecognized timestamp format: '{timestamp_text}'"),
            )
        })?;

        let outcome = match record.get(3) {
            Some(field) if !field.is_empty() => field.to_string(),
            _ => DEFAULT_OUTCOME.to_string(),
        };

        Ok(Event {
            case_id: record[0].to_string(),
            timestamp,
            activity: record[2].to_string(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("2024-01-15T10:30:00Z")]
    #[case("2024-01-15T10:30:00+00:00")]
    #[case("2024-01-15 10:30:00")]
    #[case("15.01.2024 10:30:00")]
    #[case("15.01.2024 10:30")]
    fn accepted_timestamp_formats(#[case] text: &str) {
        let ts = parse_timestamp(text).expect("format should be accepted");
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
    }

    #[test]
    fn rejected_timestamp_format() {
        assert!(parse_timestamp("Jan 15, 2024").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn parses_records_with_header() {
        let csv = "case_id,timestamp,activity,result\n\
                   case_1,2024-01-15T10:00:00Z,Process start,success\n\
                   case_1,2024-01-15T10:05:00Z,Review,error\n";
        let mut parser = EventLogParser::new();
        let events = parser.parse_str(csv).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].case_id, "case_1");
        assert_eq!(events[0].activity, "Process start");
        assert_eq!(events[1].outcome, "error");
        assert_eq!(parser.stats().records_parsed, 2);
    }

    #[test]
    fn outcome_defaults_when_absent() {
        let csv = "case_id,timestamp,activity\n\
                   case_1,2024-01-15T10:00:00Z,Process start\n";
        let events = EventLogParser::new().parse_str(csv).unwrap();
        assert_eq!(events[0].outcome, DEFAULT_OUTCOME);
    }

    #[test]
    fn too_few_fields_aborts_ingest() {
        let csv = "case_id,timestamp,activity\n\
                   case_1,2024-01-15T10:00:00Z,Process start\n\
                   case_2,2024-01-15T11:00:00Z\n";
        let err = EventLogParser::new().parse_str(csv).unwrap_err();
        assert!(matches!(err, FlowsightError::ParseError { record: 2, .. }));
    }

    #[test]
    fn bad_timestamp_aborts_ingest() {
        let csv = "case_id,timestamp,activity\n\
                   case_1,not-a-time,Process start\n";
        let err = EventLogParser::new().parse_str(csv).unwrap_err();
        match err {
            FlowsightError::ParseError { record, message } => {
                assert_eq!(record, 1);
                assert!(message.contains("not-a-time"));
            }
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn headerless_mode() {
        let csv = "case_1,2024-01-15T10:00:00Z,Process start,success\n";
        let events = EventLogParser::new()
            .with_headers(false)
            .parse_str(csv)
            .unwrap();
        assert_eq!(events.len(), 1);
    }
}
