//! Metrics analysis for process event logs.
//!
//! The [`Analyzer`] consumes the full session map (independently of the
//! graph aggregator) and produces a [`MetricsReport`]:
//! - instance/event totals and mean/median case duration,
//! - top-5 most frequent activities and full paths,
//! - one [`InefficiencyMetric`] per catalog entry, aggregated from the raw
//!   detector findings. Metrics with zero occurrences still appear with
//!   zero aggregates.

pub mod catalog;
pub mod detectors;
pub mod stats;

use indexmap::IndexMap;
use serde::Serialize;

use crate::builder::SessionMap;
pub use catalog::{MetricDefinition, MetricKind};

/// Sentinel instance id for log-wide findings.
pub const ALL_INSTANCES: &str = "ALL";

/// How many activities/paths the frequency rankings keep.
const TOP_N: usize = 5;

/// One concrete finding of a metric condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricOccurrence {
    /// Case id, or [`ALL_INSTANCES`] for log-wide findings.
    pub instance_id: String,
    /// Metric value of this occurrence.
    pub value: f64,
    /// Time lost to this occurrence, in seconds.
    pub wasted_duration_seconds: f64,
    /// Short human-readable detail.
    pub details: String,
}

/// Aggregation of all occurrences for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct InefficiencyMetric {
    /// The static catalog definition.
    pub definition: MetricDefinition,
    /// Occurrences in detection order (not sorted).
    pub occurrences: Vec<MetricOccurrence>,
    /// Sum of occurrence values, rounded to one decimal at the end.
    pub total_value: f64,
    /// Sum of wasted seconds across occurrences.
    pub total_wasted_duration: f64,
    /// Number of occurrences.
    pub count: usize,
    /// True iff at least one occurrence strictly exceeded the threshold.
    pub exceeded: bool,
}

impl InefficiencyMetric {
    fn empty(kind: MetricKind) -> Self {
        Self {
            definition: kind.definition(),
            occurrences: Vec::new(),
            total_value: 0.0,
            total_wasted_duration: 0.0,
            count: 0,
            exceeded: false,
        }
    }
}

/// Frequency of one activity label across the whole log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCount {
    /// Activity label.
    pub activity: String,
    /// Number of events carrying this label.
    pub count: u64,
}

/// Frequency of one exact full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCount {
    /// The ordered activity labels of the path.
    pub path: Vec<String>,
    /// Number of sessions following exactly this path.
    pub count: u64,
}

/// Top-level analysis output.
///
/// Ties in the top-5 rankings are broken deterministically: count
/// descending, then activity label / joined path lexicographically
/// ascending.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of process instances (sessions).
    pub total_process_instances: usize,
    /// Number of events across all sessions.
    pub total_events: usize,
    /// Mean whole-instance duration in seconds (instances with ≥2 events).
    pub average_process_duration: f64,
    /// Median whole-instance duration in seconds.
    pub median_process_duration: f64,
    /// Top-5 most frequent activities.
    pub most_frequent_activities: Vec<ActivityCount>,
    /// Top-5 most frequent full paths.
    pub most_frequent_paths: Vec<PathCount>,
    /// One entry per catalog metric, in catalog order.
    pub metrics: Vec<InefficiencyMetric>,
}

/// The metrics analyzer.
///
/// Completion markers and the error sentinel are locale/deployment specific,
/// so they are configuration, not constants.
#[derive(Debug, Clone)]
pub struct Analyzer {
    start_marker: String,
    end_marker: String,
    error_outcome: String,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            start_marker: "start".to_string(),
            end_marker: "end".to_string(),
            error_outcome: "error".to_string(),
        }
    }
}

impl Analyzer {
    /// Create an analyzer with default markers ("start"/"end"/"error").
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the completion markers (case-insensitive substrings matched
    /// against the first and last activity of a session).
    #[must_use]
    pub fn with_markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_marker = start.into();
        self.end_marker = end.into();
        self
    }

    /// Set the outcome value that marks an event as failed.
    #[must_use]
    pub fn with_error_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.error_outcome = outcome.into();
        self
    }

    /// Run every detector over the sessions and assemble the report.
    #[must_use]
    pub fn analyze(&self, sessions: &SessionMap) -> MetricsReport {
        let total_events = sessions.values().map(crate::model::Session::len).sum();

        // Whole-instance durations (instances with ≥2 events only).
        let mut instance_durations: Vec<f64> = sessions
            .values()
            .filter_map(crate::model::Session::duration_seconds)
            .collect();
        instance_durations.sort_by(f64::total_cmp);
        let average_process_duration = stats::mean(&instance_durations);
        let median_process_duration = stats::median_of_sorted(&instance_durations);

        // Detectors run independently over the same immutable sessions;
        // merge order only affects the internal occurrence ordering.
        let mut findings = detectors::detect_looping(sessions);
        findings.extend(detectors::detect_duration(sessions));
        findings.extend(detectors::detect_manual_stages(sessions));
        findings.extend(detectors::detect_complexity(sessions));
        findings.extend(detectors::detect_completion(
            sessions,
            &self.start_marker,
            &self.end_marker,
        ));
        findings.extend(detectors::detect_errors(sessions, &self.error_outcome));

        MetricsReport {
            total_process_instances: sessions.len(),
            total_events,
            average_process_duration,
            median_process_duration,
            most_frequent_activities: top_activities(sessions),
            most_frequent_paths: top_paths(sessions),
            metrics: merge_findings(findings),
        }
    }
}

/// Merge raw findings into one aggregate per catalog entry.
fn merge_findings(findings: Vec<detectors::Finding>) -> Vec<InefficiencyMetric> {
    let mut aggregated: IndexMap<MetricKind, InefficiencyMetric> = MetricKind::ALL
        .iter()
        .map(|&kind| (kind, InefficiencyMetric::empty(kind)))
        .collect();

    for (kind, occurrence) in findings {
        let metric = aggregated
            .get_mut(&kind)
            .expect("every metric kind is pre-initialized");
        metric.total_value += occurrence.value;
        metric.total_wasted_duration += occurrence.wasted_duration_seconds;
        metric.count += 1;
        if occurrence.value > metric.definition.threshold {
            // Sticky: once exceeded, stays exceeded.
            metric.exceeded = true;
        }
        metric.occurrences.push(occurrence);
    }

    aggregated
        .into_values()
        .map(|mut metric| {
            metric.total_value = stats::round1(metric.total_value);
            metric
        })
        .collect()
}

/// Top-5 activities by frequency, ties broken lexicographically.
fn top_activities(sessions: &SessionMap) -> Vec<ActivityCount> {
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for session in sessions.values() {
        for event in &session.events {
            *counts.entry(event.activity.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<ActivityCount> = counts
        .into_iter()
        .map(|(activity, count)| ActivityCount {
            activity: activity.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.activity.cmp(&b.activity)));
    ranked.truncate(TOP_N);
    ranked
}

/// Top-5 exact paths by frequency, ties broken lexicographically on the
/// joined path.
fn top_paths(sessions: &SessionMap) -> Vec<PathCount> {
    let mut counts: IndexMap<String, (Vec<String>, u64)> = IndexMap::new();
    for session in sessions.values() {
        if session.is_empty() {
            continue;
        }
        let key = session.path_key();
        let entry = counts.entry(key).or_insert_with(|| {
            (
                session.path().iter().map(ToString::to_string).collect(),
                0,
            )
        });
        entry.1 += 1;
    }

    let mut ranked: Vec<(String, Vec<String>, u64)> = counts
        .into_iter()
        .map(|(key, (path, count))| (key, path, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_N);
    ranked
        .into_iter()
        .map(|(_, path, count)| PathCount { path, count })
        .collect()
}
