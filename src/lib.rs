//! CPU fan-out benchmark.
//!
//! Runs the same CPU-bound workload `n` times, first one after another on the
//! calling thread and then fanned out across concurrent execution contexts,
//! and reports the wall-clock time of each batch.
//!
//! ```no_run
//! use cpu_fanout::{TaskRunner, Workload};
//!
//! let workload = Workload::default();
//! let runner = TaskRunner::new(move |_| workload.execute());
//! let n = num_cpus::get();
//!
//! println!("{}", runner.run_sequential(n));
//! println!("{}", runner.run_concurrent(n).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod wait_group;
pub mod workload;

pub use config::{Cli, Executor};
pub use error::{BenchError, Result};
pub use report::{Measurement, Mode, OutputFormat, Report};
pub use runner::TaskRunner;
pub use wait_group::WaitGroup;
pub use workload::{Workload, WorkloadKind};
