//! Measurements and their rendering.

use crate::config::Executor;
use crate::error::Result;
use crate::workload::Workload;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Sequential,
    Concurrent,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sequential => write!(f, "Sequential"),
            Mode::Concurrent => write!(f, "Concurrent"),
        }
    }
}

/// Wall-clock time for one batch of tasks
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub mode: Mode,
    pub tasks: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: completed {} tasks in {:.2} seconds",
            self.mode,
            self.tasks,
            self.elapsed.as_secs_f64()
        )
    }
}

fn as_secs_f64<S>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Both measurements of a run plus the parameters that produced them.
///
/// `measurements` keeps the order in which the modes ran.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub cores: usize,
    pub tasks: usize,
    pub workload: Workload,
    pub executor: Executor,
    pub measurements: Vec<Measurement>,
    pub speedup: Option<f64>,
}

impl Report {
    pub fn new(
        cores: usize,
        workload: Workload,
        executor: Executor,
        measurements: Vec<Measurement>,
    ) -> Self {
        let tasks = measurements.first().map_or(0, |m| m.tasks);
        let speedup = speedup(&measurements);
        Self {
            cores,
            tasks,
            workload,
            executor,
            measurements,
            speedup,
        }
    }

    pub fn get(&self, mode: Mode) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.mode == mode)
    }

    /// One line per measurement.
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for m in &self.measurements {
            out.push_str(&m.to_string());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Human => Ok(self.to_human()),
            OutputFormat::Json => {
                let mut json = self.to_json()?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// Sequential time divided by concurrent time.
fn speedup(measurements: &[Measurement]) -> Option<f64> {
    let secs = |mode: Mode| {
        measurements
            .iter()
            .find(|m| m.mode == mode)
            .map(|m| m.elapsed.as_secs_f64())
    };
    let sequential = secs(Mode::Sequential)?;
    let concurrent = secs(Mode::Concurrent)?;
    if concurrent > 0.0 {
        Some(sequential / concurrent)
    } else {
        None
    }
}
