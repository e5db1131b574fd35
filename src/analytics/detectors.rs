//! The detector routines behind the metrics analyzer.
//!
//! Every detector consumes the same immutable session map independently and
//! returns raw `(kind, occurrence)` findings; the analyzer merges them into
//! the per-metric aggregates. Detectors never mutate their input, so they
//! can run in any order.
//!
//! Data-quality conditions (sessions with fewer than two events, missing or
//! out-of-order timestamps) are logged and excluded only from the specific
//! computation that cannot proceed; they never abort an analysis.

use tracing::warn;

use super::catalog::MetricKind;
use super::stats::{linear_regression, mean, quartiles, round1};
use super::{MetricOccurrence, ALL_INSTANCES};
use crate::builder::SessionMap;

/// One raw detection, before merging.
pub type Finding = (MetricKind, MetricOccurrence);

/// Slope-angle threshold (degrees) above which the stage duration trend is
/// reported.
const STAGE_TREND_ANGLE_DEGREES: f64 = 5.0;

/// IQR multiplier for the outlier bound.
const OUTLIER_IQR_FACTOR: f64 = 1.5;

/// Minimum sample size for quartile-based outlier detection.
const MIN_IQR_SAMPLE: usize = 4;

/// Looping patterns: self-loops, distance-2 returns, ping-pong windows,
/// returns to the first activity, and per-label rework counts.
pub fn detect_looping(sessions: &SessionMap) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (case_id, session) in sessions {
        let events = &session.events;
        if events.len() < 2 {
            continue;
        }

        // Self-Loop: adjacent pair with equal labels.
        for i in 1..events.len() {
            if events[i].activity == events[i - 1].activity {
                findings.push((
                    MetricKind::SelfLoop,
                    MetricOccurrence {
                        instance_id: case_id.clone(),
                        value: 1.0,
                        wasted_duration_seconds: events[i - 1].seconds_until(&events[i]),
                        details: format!("step {i}: '{}'", events[i].activity),
                    },
                ));
            }
        }

        // Return to Previous Stage: distance-2 repeat.
        for i in 2..events.len() {
            if events[i].activity == events[i - 2].activity {
                findings.push((
                    MetricKind::ReturnToPreviousStage,
                    MetricOccurrence {
                        instance_id: case_id.clone(),
                        value: 1.0,
                        wasted_duration_seconds: events[i - 2].seconds_until(&events[i]),
                        details: format!("step {i}: '{}'", events[i].activity),
                    },
                ));
            }
        }

        // Ping-Pong: A→B→A→B over a 4-event window. The wasted duration is
        // the time between the two earlier matched events (i-3 and i-1), not
        // the full pattern span.
        for i in 3..events.len() {
            if events[i].activity == events[i - 2].activity
                && events[i - 1].activity == events[i - 3].activity
            {
                findings.push((
                    MetricKind::PingPong,
                    MetricOccurrence {
                        instance_id: case_id.clone(),
                        value: 1.0,
                        wasted_duration_seconds: events[i - 3].seconds_until(&events[i - 1]),
                        details: format!(
                            "step {i}: '{}' ↔ '{}'",
                            events[i - 1].activity,
                            events[i].activity
                        ),
                    },
                ));
            }
        }

        // Return to Start: any later event repeating the first activity.
        let first_activity = &events[0].activity;
        for (i, event) in events.iter().enumerate().skip(1) {
            if event.activity == *first_activity {
                findings.push((
                    MetricKind::ReturnToStart,
                    MetricOccurrence {
                        instance_id: case_id.clone(),
                        value: 1.0,
                        wasted_duration_seconds: 0.0,
                        details: format!("step {i}: return to '{}'", event.activity),
                    },
                ));
            }
        }

        // Rework: group event indices by label; a label seen k>1 times costs
        // the elapsed time from each repeated occurrence (except the last)
        // to its immediate next event.
        let mut indices_by_label: indexmap::IndexMap<&str, Vec<usize>> =
            indexmap::IndexMap::new();
        for (i, event) in events.iter().enumerate() {
            indices_by_label
                .entry(event.activity.as_str())
                .or_default()
                .push(i);
        }

        for (label, indices) in &indices_by_label {
            if indices.len() < 2 {
                continue;
            }
            let mut wasted = 0.0;
            for &index in &indices[..indices.len() - 1] {
                if index + 1 < events.len() {
                    wasted += events[index].seconds_until(&events[index + 1]);
                }
            }
            findings.push((
                MetricKind::Rework,
                MetricOccurrence {
                    instance_id: case_id.clone(),
                    value: (indices.len() - 1) as f64,
                    wasted_duration_seconds: wasted,
                    details: format!("stage '{label}' repeated {} times", indices.len()),
                },
            ));
        }
    }

    findings
}

/// Duration metrics: IQR outliers, the stage duration trend, and the
/// whole-instance duration trend.
pub fn detect_duration(sessions: &SessionMap) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Collect usable consecutive-pair durations across the whole log.
    let mut durations = Vec::new();
    for (case_id, session) in sessions {
        let events = &session.events;
        if events.len() < 2 {
            warn!(case_id, "instance has fewer than two events, no duration can be computed");
            continue;
        }
        for (i, pair) in events.windows(2).enumerate() {
            if !pair[0].has_timestamp() || !pair[1].has_timestamp() {
                warn!(case_id, pair_index = i, "missing timestamp, skipping duration");
                continue;
            }
            if pair[1].timestamp < pair[0].timestamp {
                warn!(case_id, pair_index = i, "out-of-order timestamps, skipping duration");
                continue;
            }
            durations.push(pair[0].seconds_until(&pair[1]));
        }
    }

    if durations.is_empty() {
        warn!("no durations available for duration metrics");
        return findings;
    }

    let average = mean(&durations);

    // IQR outliers need at least four samples; below that the detector
    // yields nothing but the trend fits below still run.
    if durations.len() >= MIN_IQR_SAMPLE {
        let mut sorted = durations.clone();
        sorted.sort_by(f64::total_cmp);
        let (q1, q3) = quartiles(&sorted);
        let outlier_threshold = q3 + OUTLIER_IQR_FACTOR * (q3 - q1);

        // Re-scan every raw consecutive pair, including the ones excluded
        // from the sample above.
        for (case_id, session) in sessions {
            for pair in session.events.windows(2) {
                let duration = pair[0].seconds_until(&pair[1]);
                if duration > outlier_threshold {
                    findings.push((
                        MetricKind::AnomalouslyLongStage,
                        MetricOccurrence {
                            instance_id: case_id.clone(),
                            value: duration,
                            wasted_duration_seconds: 0.0,
                            details: format!(
                                "stage '{}': {duration:.2} sec (avg: {average:.2} sec)",
                                pair[0].activity
                            ),
                        },
                    ));
                }
            }
        }
    } else {
        warn!(count = durations.len(), "insufficient sample for IQR outlier detection");
    }

    // Stage duration trend, fitted over collection order.
    let (slope, _) = linear_regression(&durations);
    if slope.atan().to_degrees() > STAGE_TREND_ANGLE_DEGREES {
        findings.push((
            MetricKind::IncreasingStageDurationTrend,
            MetricOccurrence {
                instance_id: ALL_INSTANCES.to_string(),
                value: slope,
                wasted_duration_seconds: 0.0,
                details: format!("slope: {slope:.4} sec/step"),
            },
        ));
    }

    // Whole-instance duration trend.
    let instance_durations: Vec<f64> = sessions
        .values()
        .filter_map(crate::model::Session::duration_seconds)
        .collect();
    if instance_durations.len() > 1 {
        let (instance_slope, _) = linear_regression(&instance_durations);
        if instance_slope > 0.0 {
            findings.push((
                MetricKind::IncreasingInstanceDurationTrend,
                MetricOccurrence {
                    instance_id: ALL_INSTANCES.to_string(),
                    value: instance_slope,
                    wasted_duration_seconds: 0.0,
                    details: format!("slope: {instance_slope:.4} sec/instance"),
                },
            ));
        }
    }

    findings
}

/// Manual/unlogged stages: any single stage consuming more than the
/// threshold share of its instance's total duration.
pub fn detect_manual_stages(sessions: &SessionMap) -> Vec<Finding> {
    let threshold = MetricKind::ManualStage.definition().threshold;
    let mut findings = Vec::new();

    for (case_id, session) in sessions {
        let Some(total) = session.duration_seconds() else {
            continue;
        };
        if total <= 0.0 {
            continue;
        }

        for pair in session.events.windows(2) {
            let stage = pair[0].seconds_until(&pair[1]);
            let percentage = stage / total * 100.0;
            if percentage > threshold {
                findings.push((
                    MetricKind::ManualStage,
                    MetricOccurrence {
                        instance_id: case_id.clone(),
                        value: round1(percentage),
                        wasted_duration_seconds: 0.0,
                        details: format!(
                            "stage '{}': {percentage:.1}% of instance time ({stage:.2} sec)",
                            pair[0].activity
                        ),
                    },
                ));
            }
        }
    }

    findings
}

/// Process variability: the share of instances following a unique path.
pub fn detect_complexity(sessions: &SessionMap) -> Vec<Finding> {
    let total = sessions.len();
    if total == 0 {
        return Vec::new();
    }

    let unique_paths: std::collections::HashSet<String> =
        sessions.values().map(crate::model::Session::path_key).collect();
    let variability = unique_paths.len() as f64 / total as f64 * 100.0;

    if variability > MetricKind::HighVariability.definition().threshold {
        vec![(
            MetricKind::HighVariability,
            MetricOccurrence {
                instance_id: ALL_INSTANCES.to_string(),
                value: round1(variability),
                wasted_duration_seconds: 0.0,
                details: format!(
                    "{} unique paths across {total} instances",
                    unique_paths.len()
                ),
            },
        )]
    } else {
        Vec::new()
    }
}

/// Completion rate: an instance counts as completed when its first activity
/// contains `start_marker` and its last contains `end_marker`, both matched
/// as case-insensitive substrings.
pub fn detect_completion(
    sessions: &SessionMap,
    start_marker: &str,
    end_marker: &str,
) -> Vec<Finding> {
    let total = sessions.len();
    if total == 0 {
        return Vec::new();
    }

    let start_marker = start_marker.to_lowercase();
    let end_marker = end_marker.to_lowercase();

    let completed = sessions
        .values()
        .filter(|session| {
            session.events.len() >= 2
                && session.events[0]
                    .activity
                    .to_lowercase()
                    .contains(&start_marker)
                && session.events[session.events.len() - 1]
                    .activity
                    .to_lowercase()
                    .contains(&end_marker)
        })
        .count();

    let completion_rate = completed as f64 / total as f64 * 100.0;
    if completion_rate < 100.0 {
        vec![(
            MetricKind::LowCompletionRate,
            MetricOccurrence {
                instance_id: ALL_INSTANCES.to_string(),
                value: round1(completion_rate),
                wasted_duration_seconds: 0.0,
                details: format!("{completed} of {total} instances completed"),
            },
        )]
    } else {
        Vec::new()
    }
}

/// Error rate: flags the log when instances containing an error outcome
/// outnumber the ones without.
pub fn detect_errors(sessions: &SessionMap, error_outcome: &str) -> Vec<Finding> {
    let mut error_instances = 0u64;
    let mut success_instances = 0u64;

    for session in sessions.values() {
        if session.events.iter().any(|e| e.outcome == error_outcome) {
            error_instances += 1;
        } else {
            success_instances += 1;
        }
    }

    if error_instances > success_instances {
        vec![(
            MetricKind::HighErrorRate,
            MetricOccurrence {
                instance_id: ALL_INSTANCES.to_string(),
                value: error_instances as f64,
                wasted_duration_seconds: 0.0,
                details: format!(
                    "{error_instances} error instances vs {success_instances} successful"
                ),
            },
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SessionBuilder;
    use crate::model::{Event, DEFAULT_OUTCOME};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn case(case_id: &str, steps: &[(&str, i64)]) -> Vec<Event> {
        steps
            .iter()
            .map(|(activity, secs)| Event::new(case_id, ts(*secs), *activity, DEFAULT_OUTCOME))
            .collect()
    }

    fn sessions_from(events: Vec<Event>) -> SessionMap {
        let mut builder = SessionBuilder::new();
        builder.ingest_all(events);
        builder.into_sessions()
    }

    fn count_kind(findings: &[Finding], kind: MetricKind) -> usize {
        findings.iter().filter(|(k, _)| *k == kind).count()
    }

    #[test]
    fn self_loop_with_wasted_duration() {
        let sessions = sessions_from(case("c1", &[("A", 0), ("A", 15), ("B", 30)]));
        let findings = detect_looping(&sessions);

        assert_eq!(count_kind(&findings, MetricKind::SelfLoop), 1);
        let (_, occurrence) = findings
            .iter()
            .find(|(k, _)| *k == MetricKind::SelfLoop)
            .unwrap();
        assert_eq!(occurrence.value, 1.0);
        assert_eq!(occurrence.wasted_duration_seconds, 15.0);
    }

    #[test]
    fn a_b_a_is_return_not_self_loop() {
        let sessions = sessions_from(case("c1", &[("A", 0), ("B", 10), ("A", 20)]));
        let findings = detect_looping(&sessions);

        assert_eq!(count_kind(&findings, MetricKind::SelfLoop), 0);
        assert_eq!(count_kind(&findings, MetricKind::ReturnToPreviousStage), 1);
        // The distance-2 repeat of the first activity also counts as a
        // return to start and as rework.
        assert_eq!(count_kind(&findings, MetricKind::ReturnToStart), 1);
        assert_eq!(count_kind(&findings, MetricKind::Rework), 1);
    }

    #[test]
    fn ping_pong_wasted_duration_uses_earlier_pair() {
        // A(0) → B(10) → A(25) → B(45): the matched earlier events are
        // index 0 and index 2, so wasted time is 25 seconds, not the full
        // 45-second pattern span.
        let sessions = sessions_from(case("c1", &[("A", 0), ("B", 10), ("A", 25), ("B", 45)]));
        let findings = detect_looping(&sessions);

        let ping_pongs: Vec<_> = findings
            .iter()
            .filter(|(k, _)| *k == MetricKind::PingPong)
            .collect();
        assert_eq!(ping_pongs.len(), 1);
        assert_eq!(ping_pongs[0].1.wasted_duration_seconds, 25.0);
    }

    #[test]
    fn rework_value_and_wasted_time() {
        // A appears 3 times (indices 0, 2, 4); wasted = (A0→B1) + (A2→B3).
        let sessions = sessions_from(case(
            "c1",
            &[("A", 0), ("B", 10), ("A", 30), ("B", 60), ("A", 100)],
        ));
        let findings = detect_looping(&sessions);

        let (_, rework) = findings
            .iter()
            .find(|(k, _)| *k == MetricKind::Rework)
            .unwrap();
        assert_eq!(rework.value, 2.0);
        assert_eq!(rework.wasted_duration_seconds, 10.0 + 30.0);
    }

    #[test]
    fn single_event_sessions_yield_no_looping_findings() {
        let sessions = sessions_from(case("c1", &[("A", 0)]));
        assert!(detect_looping(&sessions).is_empty());
    }

    #[test]
    fn iqr_needs_four_durations_but_trends_still_run() {
        // Three durations only: no outlier findings, but a steep upward
        // trend is still reported.
        let sessions = sessions_from(case(
            "c1",
            &[("A", 0), ("B", 10), ("C", 40), ("D", 130)],
        ));
        let findings = detect_duration(&sessions);

        assert_eq!(count_kind(&findings, MetricKind::AnomalouslyLongStage), 0);
        assert_eq!(
            count_kind(&findings, MetricKind::IncreasingStageDurationTrend),
            1
        );
    }

    #[test]
    fn outlier_detection_flags_extreme_stage() {
        // Uniform 10s stages plus one 10000s stage.
        let mut events = case(
            "c1",
            &[("A", 0), ("B", 10), ("C", 20), ("D", 30), ("E", 40)],
        );
        events.extend(case("c2", &[("A", 0), ("B", 10000)]));
        let findings = detect_duration(&sessions_from(events));

        let outliers: Vec<_> = findings
            .iter()
            .filter(|(k, _)| *k == MetricKind::AnomalouslyLongStage)
            .collect();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].1.instance_id, "c2");
        assert_eq!(outliers[0].1.value, 10000.0);
    }

    #[test]
    fn out_of_order_pairs_are_excluded_from_sample() {
        // The negative pair is skipped, leaving three usable durations, so
        // no IQR pass happens.
        let sessions = sessions_from(case(
            "c1",
            &[("A", 0), ("B", 10), ("C", 5), ("D", 15), ("E", 25)],
        ));
        let findings = detect_duration(&sessions);
        assert_eq!(count_kind(&findings, MetricKind::AnomalouslyLongStage), 0);
    }

    #[test]
    fn instance_trend_needs_two_instances() {
        let sessions = sessions_from(case("c1", &[("A", 0), ("B", 100)]));
        let findings = detect_duration(&sessions);
        assert_eq!(
            count_kind(&findings, MetricKind::IncreasingInstanceDurationTrend),
            0
        );

        let mut events = case("c1", &[("A", 0), ("B", 100)]);
        events.extend(case("c2", &[("A", 0), ("B", 300)]));
        let findings = detect_duration(&sessions_from(events));
        assert_eq!(
            count_kind(&findings, MetricKind::IncreasingInstanceDurationTrend),
            1
        );
    }

    #[test]
    fn manual_stage_over_80_percent() {
        let sessions = sessions_from(case("c1", &[("A", 0), ("B", 10), ("C", 100)]));
        let findings = detect_manual_stages(&sessions);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].1.value, 90.0);
        assert!(findings[0].1.details.contains("'B'"));
    }

    #[test]
    fn manual_stage_skips_zero_duration_instances() {
        let sessions = sessions_from(case("c1", &[("A", 0), ("B", 0)]));
        assert!(detect_manual_stages(&sessions).is_empty());
    }

    #[test]
    fn variability_below_threshold_yields_nothing() {
        // 4 identical paths + 1 unique = 40% variability.
        let mut events = Vec::new();
        for i in 0..4 {
            events.extend(case(
                &format!("c{i}"),
                &[("Start", 0), ("X", 10), ("End", 20)],
            ));
        }
        events.extend(case("c4", &[("Start", 0), ("Y", 10), ("Z", 20), ("End", 30)]));

        assert!(detect_complexity(&sessions_from(events)).is_empty());
    }

    #[test]
    fn variability_above_threshold_flags_log() {
        let mut events = case("c1", &[("A", 0), ("B", 10)]);
        events.extend(case("c2", &[("A", 0), ("C", 10)]));
        let findings = detect_complexity(&sessions_from(events));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].1.instance_id, ALL_INSTANCES);
        assert_eq!(findings[0].1.value, 100.0);
    }

    #[test]
    fn completion_markers_are_case_insensitive_substrings() {
        let mut events = case("c1", &[("Process START", 0), ("Work", 10), ("the end", 20)]);
        events.extend(case("c2", &[("Work", 0), ("More work", 10)]));
        let findings = detect_completion(&sessions_from(events), "start", "end");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].1.value, 50.0);
        assert_eq!(findings[0].1.details, "1 of 2 instances completed");
    }

    #[test]
    fn full_completion_yields_nothing() {
        let events = case("c1", &[("Start", 0), ("End", 10)]);
        assert!(detect_completion(&sessions_from(events), "start", "end").is_empty());
    }

    #[test]
    fn error_rate_requires_strict_majority() {
        let mut events = vec![
            Event::new("c1", ts(0), "A", "error"),
            Event::new("c2", ts(0), "A", DEFAULT_OUTCOME),
        ];
        assert!(detect_errors(&sessions_from(events.clone()), "error").is_empty());

        events.push(Event::new("c3", ts(0), "A", "error"));
        let findings = detect_errors(&sessions_from(events), "error");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].1.value, 2.0);
    }
}
