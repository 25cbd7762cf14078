//! Command-line configuration.
//!
//! Every flag is optional. With no arguments the benchmark runs one task per
//! logical CPU, using the SHA-256 workload on plain OS threads.

use crate::report::OutputFormat;
use crate::workload::{Workload, WorkloadKind};
use clap::Parser;
use serde::Serialize;
use std::fmt;

/// Kind of execution context used by the concurrent mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Executor {
    /// One OS thread per task, joined through a wait group
    #[default]
    Threads,
    /// Parallel iterator over a dedicated rayon pool
    Rayon,
    /// Blocking tasks on a tokio runtime, joined by awaiting every handle
    Tokio,
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Threads => write!(f, "threads"),
            Executor::Rayon => write!(f, "rayon"),
            Executor::Tokio => write!(f, "tokio"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cpu_fanout")]
#[command(version, about = "Time CPU-bound tasks run sequentially versus concurrently")]
pub struct Cli {
    /// Number of tasks per mode (defaults to the logical CPU count)
    #[arg(short = 'n', long)]
    pub tasks: Option<usize>,

    /// Computation performed by each task
    #[arg(short, long, value_enum, default_value_t = WorkloadKind::Sha256)]
    pub workload: WorkloadKind,

    /// Iterations per task (defaults depend on the workload)
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Execution contexts used by the concurrent mode
    #[arg(short, long, value_enum, default_value_t = Executor::Threads)]
    pub executor: Executor,

    /// Run the concurrent mode before the sequential one
    #[arg(long)]
    pub concurrent_first: bool,

    /// Result format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn task_count(&self) -> usize {
        self.tasks.unwrap_or_else(num_cpus::get)
    }

    pub fn workload(&self) -> Workload {
        let iterations = self
            .iterations
            .unwrap_or_else(|| self.workload.default_iterations());
        Workload::new(self.workload, iterations)
    }
}
