//! Synthetic event log generation.
//!
//! Produces CSV event logs with a controllable amount of injected
//! inefficiencies (self-loops, ping-pongs, duration anomalies, errors,
//! incomplete instances), useful for demos and for exercising the
//! detectors end to end.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{FlowsightError, Result};

/// Parameters for synthetic log generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of process instances to emit.
    pub instances: usize,
    /// Maximum events per instance (each instance gets 3..=max).
    pub max_events: usize,
    /// How many instances may receive an injected self-loop.
    pub self_loops: usize,
    /// How many instances may receive an injected ping-pong.
    pub ping_pongs: usize,
    /// How many instances may receive an injected duration anomaly.
    pub anomalies: usize,
    /// How many instances may receive an injected error outcome.
    pub errors: usize,
    /// Probability in `0.0..=1.0` that an instance is left without its
    /// final event.
    pub incomplete_rate: f64,
    /// Optional RNG seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instances: 100,
            max_events: 10,
            self_loops: 5,
            ping_pongs: 5,
            anomalies: 5,
            errors: 5,
            incomplete_rate: 0.1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
struct GeneratedEvent {
    case_id: String,
    timestamp: DateTime<Utc>,
    activity: String,
    result: String,
}

/// Synthetic event log generator.
#[derive(Debug)]
pub struct LogGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl LogGenerator {
    /// Create a generator from a configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// Generate a log and write it as CSV to `path`.
    pub fn write_to_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| {
            FlowsightError::io(format!("Failed to create output file: {}", path.display()), e)
        })?;
        self.write_to(file)?;
        info!(path = %path.display(), instances = self.config.instances, "synthetic log written");
        Ok(())
    }

    /// Generate a log and write it as CSV to any writer.
    pub fn write_to<W: Write>(&mut self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(["case_id", "timestamp", "activity", "result"])
            .map_err(|e| FlowsightError::csv("Failed to write header", e))?;

        let mut budget = InjectionBudget {
            self_loops: self.config.self_loops,
            ping_pongs: self.config.ping_pongs,
            anomalies: self.config.anomalies,
            errors: self.config.errors,
        };

        let mut start_time = Utc::now();
        for i in 0..self.config.instances {
            let case_id = format!("case_{}", i + 1);
            let events = self.generate_instance(&case_id, start_time, &mut budget);
            start_time += Duration::minutes(self.rng.random_range(0..60));

            for event in events {
                csv_writer
                    .write_record([
                        event.case_id.as_str(),
                        &event.timestamp.to_rfc3339(),
                        &event.activity,
                        &event.result,
                    ])
                    .map_err(|e| FlowsightError::csv("Failed to write event record", e))?;
            }
        }

        csv_writer
            .flush()
            .map_err(|e| FlowsightError::io("Failed to flush CSV output", e))?;
        Ok(())
    }

    fn generate_instance(
        &mut self,
        case_id: &str,
        start_time: DateTime<Utc>,
        budget: &mut InjectionBudget,
    ) -> Vec<GeneratedEvent> {
        let max = self.config.max_events.max(4);
        let num_events = self.rng.random_range(3..max);
        let mut current_time = start_time;

        let mut events = vec![GeneratedEvent {
            case_id: case_id.to_string(),
            timestamp: current_time,
            activity: "Process start".to_string(),
            result: "success".to_string(),
        }];

        for _ in 1..num_events {
            let letter = (b'A' + self.rng.random_range(0..5u8)) as char;
            current_time += Duration::minutes(self.rng.random_range(5..15));
            events.push(GeneratedEvent {
                case_id: case_id.to_string(),
                timestamp: current_time,
                activity: format!("Stage {letter}"),
                result: "success".to_string(),
            });
        }

        if budget.self_loops > 0 && self.rng.random_bool(0.5) {
            self.inject_self_loop(&mut events);
            budget.self_loops -= 1;
        }
        if budget.ping_pongs > 0 && self.rng.random_bool(0.5) {
            self.inject_ping_pong(&mut events);
            budget.ping_pongs -= 1;
        }
        if budget.anomalies > 0 && self.rng.random_bool(0.5) {
            self.inject_anomaly(&mut events);
            budget.anomalies -= 1;
        }
        if budget.errors > 0 && self.rng.random_bool(0.5) {
            self.inject_error(&mut events);
            budget.errors -= 1;
        }

        // Terminal event is skipped for a share of instances, so the
        // completion-rate detector has something to find.
        if !self.rng.random_bool(self.config.incomplete_rate.clamp(0.0, 1.0)) {
            let last_time = events.last().map_or(current_time, |e| e.timestamp);
            events.push(GeneratedEvent {
                case_id: case_id.to_string(),
                timestamp: last_time + Duration::minutes(self.rng.random_range(5..15)),
                activity: "End".to_string(),
                result: "success".to_string(),
            });
        }

        events
    }

    /// Duplicate a random event right after itself, one minute later.
    fn inject_self_loop(&mut self, events: &mut Vec<GeneratedEvent>) {
        if events.len() < 2 {
            return;
        }
        let index = self.rng.random_range(1..events.len());
        let mut repeat = events[index - 1].clone();
        repeat.timestamp += Duration::minutes(1);
        events.insert(index, repeat);
    }

    /// Turn a random adjacent pair A,B into A,B,A,B.
    fn inject_ping_pong(&mut self, events: &mut Vec<GeneratedEvent>) {
        if events.len() < 2 {
            return;
        }
        let index = self.rng.random_range(1..events.len());
        let mut ping = events[index - 1].clone();
        let mut pong = events[index].clone();
        pong.timestamp = ping.timestamp + Duration::minutes(1);
        ping.timestamp = pong.timestamp + Duration::minutes(1);
        events.insert(index + 1, ping);
        events.insert(index + 1, pong);
    }

    /// Stretch one random stage to 60-180 minutes.
    fn inject_anomaly(&mut self, events: &mut [GeneratedEvent]) {
        if events.len() < 2 {
            return;
        }
        let index = self.rng.random_range(1..events.len());
        events[index].timestamp =
            events[index - 1].timestamp + Duration::minutes(self.rng.random_range(60..180));
    }

    /// Mark one random event as failed.
    fn inject_error(&mut self, events: &mut [GeneratedEvent]) {
        if events.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..events.len());
        events[index].result = "error".to_string();
    }
}

#[derive(Debug)]
struct InjectionBudget {
    self_loops: usize,
    ping_pongs: usize,
    anomalies: usize,
    errors: usize,
}
