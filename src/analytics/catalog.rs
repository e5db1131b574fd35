//! The static metric catalog.
//!
//! Every inefficiency metric the analyzer can report is one variant of
//! [`MetricKind`]; the closed enum gives compile-time exhaustiveness where
//! the report is assembled. Each kind maps to a static [`MetricDefinition`]
//! with a human description and a default threshold.

use serde::Serialize;

/// Static description of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDefinition {
    /// Display name.
    pub name: &'static str,
    /// Category grouping (looping, duration, logging, ...).
    pub category: &'static str,
    /// How the metric is calculated.
    pub calculation: &'static str,
    /// What a finding means and its effect on the process.
    pub impact: &'static str,
    /// Threshold an occurrence value must strictly exceed to flag the metric.
    pub threshold: f64,
}

/// Closed enumeration of every metric in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Same activity repeated back-to-back (A→A).
    SelfLoop,
    /// Return to the activity two steps back (A→B→A).
    ReturnToPreviousStage,
    /// Alternating pair of activities (A→B→A→B).
    PingPong,
    /// Return to the session's first activity.
    ReturnToStart,
    /// Any activity repeated anywhere within a session.
    Rework,
    /// Stage duration beyond the IQR outlier threshold.
    AnomalouslyLongStage,
    /// Positive trend in stage durations across the whole log.
    IncreasingStageDurationTrend,
    /// Positive trend in whole-instance durations.
    IncreasingInstanceDurationTrend,
    /// Single stage consuming most of an instance's total time.
    ManualStage,
    /// Nearly every instance follows a unique path.
    HighVariability,
    /// Instances not running from the start marker to the end marker.
    LowCompletionRate,
    /// More instances with errors than without.
    HighErrorRate,
}

impl MetricKind {
    /// Every catalog entry, in report order. Metrics with zero occurrences
    /// still appear in the report, so this is the authoritative ordering.
    pub const ALL: [MetricKind; 12] = [
        MetricKind::SelfLoop,
        MetricKind::ReturnToPreviousStage,
        MetricKind::PingPong,
        MetricKind::ReturnToStart,
        MetricKind::Rework,
        MetricKind::AnomalouslyLongStage,
        MetricKind::IncreasingStageDurationTrend,
        MetricKind::IncreasingInstanceDurationTrend,
        MetricKind::ManualStage,
        MetricKind::HighVariability,
        MetricKind::LowCompletionRate,
        MetricKind::HighErrorRate,
    ];

    /// The static definition for this metric.
    #[must_use]
    pub const fn definition(self) -> MetricDefinition {
        match self {
            Self::SelfLoop => MetricDefinition {
                name: "Self-Loop",
                category: "Looping",
                calculation: "Detects the same operation repeated back-to-back (A→A)",
                impact: "Points at technical faults, task bouncing or duplicated \
                         log entries. Inflates instance duration.",
                threshold: 0.0,
            },
            Self::ReturnToPreviousStage => MetricDefinition {
                name: "Return to Previous Stage",
                category: "Looping",
                calculation: "Detects a return to the operation two steps back (A→B→A)",
                impact: "Work sent back for correction; signals rework or errors \
                         in the process.",
                threshold: 0.0,
            },
            Self::PingPong => MetricDefinition {
                name: "Ping-Pong",
                category: "Looping",
                calculation: "Detects a repeated alternation of two operations (A→B→A→B)",
                impact: "Inefficient hand-offs between stages or routing errors.",
                threshold: 0.0,
            },
            Self::ReturnToStart => MetricDefinition {
                name: "Return to Start",
                category: "Looping",
                calculation: "Detects a return to the first operation of the instance",
                impact: "Process restarted after critical errors or unmet conditions.",
                threshold: 0.0,
            },
            Self::Rework => MetricDefinition {
                name: "Rework",
                category: "Looping",
                calculation: "Counts repetitions of any operation within an instance",
                impact: "Corrections and do-overs that stretch the execution time.",
                threshold: 0.0,
            },
            Self::AnomalouslyLongStage => MetricDefinition {
                name: "Anomalously Long Stage",
                category: "Duration",
                calculation: "Flags stage durations beyond the interquartile outlier \
                              bound (> Q3 + 1.5*IQR)",
                impact: "Bottlenecks or performance problems at specific stages.",
                threshold: 0.0,
            },
            Self::IncreasingStageDurationTrend => MetricDefinition {
                name: "Increasing Stage Duration Trend",
                category: "Duration",
                calculation: "Linear regression over stage durations (positive slope)",
                impact: "Performance degradation or growing task complexity over time.",
                threshold: 0.0,
            },
            Self::IncreasingInstanceDurationTrend => MetricDefinition {
                name: "Increasing Process Instance Duration Trend",
                category: "Duration",
                calculation: "Linear regression over whole-instance durations",
                impact: "Overall process performance deteriorating over time.",
                threshold: 0.0,
            },
            Self::ManualStage => MetricDefinition {
                name: "Manual/Unlogged Stage",
                category: "Logging",
                calculation: "Finds stages consuming more than 80% of an instance's time",
                impact: "Unlogged gaps make the process impossible to assess; \
                         likely manual work.",
                threshold: 80.0,
            },
            Self::HighVariability => MetricDefinition {
                name: "High Process Variability",
                category: "Complexity",
                calculation: "Ratio of unique paths to total instances (>80%)",
                impact: "Every path is unique: the process cannot be standardized, \
                         visualized or optimized.",
                threshold: 80.0,
            },
            Self::LowCompletionRate => MetricDefinition {
                name: "Low Process Completion Rate",
                category: "Completion",
                calculation: "Share of instances that run the full cycle (start→end)",
                impact: "The process is interrupted or never reaches its end, \
                         reducing effectiveness.",
                threshold: 100.0,
            },
            Self::HighErrorRate => MetricDefinition {
                name: "High Error Rate",
                category: "Quality",
                calculation: "Compares instances with errors against successful ones",
                impact: "Unstable process: errors outnumber successful executions.",
                threshold: 0.0,
            },
        }
    }
}
