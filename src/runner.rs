//! Sequential and concurrent dispatch of identical tasks.

use crate::config::Executor;
use crate::error::{BenchError, Result};
use crate::report::{Measurement, Mode};
use crate::wait_group::WaitGroup;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Runs a workload `n` times under either dispatch policy and times it.
///
/// The workload receives the task index in `0..n`. It must not share mutable
/// state between invocations; the runner never synchronizes on its behalf
/// beyond waiting for completion.
pub struct TaskRunner<F> {
    work: Arc<F>,
    executor: Executor,
}

impl<F> TaskRunner<F>
where
    F: Fn(usize) + Send + Sync + 'static,
{
    pub fn new(work: F) -> Self {
        Self::with_executor(work, Executor::default())
    }

    pub fn with_executor(work: F, executor: Executor) -> Self {
        Self {
            work: Arc::new(work),
            executor,
        }
    }

    pub fn executor(&self) -> Executor {
        self.executor
    }

    /// Run the workload `n` times back to back on the calling thread.
    pub fn run_sequential(&self, n: usize) -> Measurement {
        let start = Instant::now();
        for i in 0..n {
            (self.work)(i);
        }
        let elapsed = start.elapsed();

        Measurement {
            mode: Mode::Sequential,
            tasks: n,
            elapsed,
        }
    }

    /// Run `n` copies of the workload concurrently and return once all finished.
    pub fn run_concurrent(&self, n: usize) -> Result<Measurement> {
        let elapsed = match self.executor {
            Executor::Threads => self.fan_out_threads(n)?,
            Executor::Rayon => self.fan_out_rayon(n)?,
            Executor::Tokio => self.fan_out_tokio(n)?,
        };

        Ok(Measurement {
            mode: Mode::Concurrent,
            tasks: n,
            elapsed,
        })
    }

    fn fan_out_threads(&self, n: usize) -> Result<Duration> {
        let wg = WaitGroup::new();
        let mut spawn_error = None;

        let start = Instant::now();
        for i in 0..n {
            wg.add(1);
            let done = wg.guard();
            let work = Arc::clone(&self.work);
            let spawned = thread::Builder::new()
                .name(format!("task-{i}"))
                .spawn(move || {
                    let _done = done;
                    work(i);
                });
            // A failed spawn drops the closure, and with it the guard.
            if let Err(e) = spawned {
                spawn_error = Some(e);
                break;
            }
        }
        wg.wait();
        let elapsed = start.elapsed();

        if let Some(e) = spawn_error {
            return Err(BenchError::Spawn(e));
        }
        match wg.panicked() {
            0 => Ok(elapsed),
            count => Err(BenchError::TaskPanicked { count }),
        }
    }

    fn fan_out_rayon(&self, n: usize) -> Result<Duration> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n.max(1))
            .thread_name(|i| format!("rayon-task-{i}"))
            .build()?;
        debug!(threads = pool.current_num_threads(), "rayon pool ready");

        let work = &*self.work;
        let panicked = AtomicUsize::new(0);
        let start = Instant::now();
        pool.install(|| {
            (0..n).into_par_iter().for_each(|i| {
                if panic::catch_unwind(AssertUnwindSafe(|| work(i))).is_err() {
                    panicked.fetch_add(1, Ordering::Relaxed);
                }
            })
        });
        let elapsed = start.elapsed();

        match panicked.into_inner() {
            0 => Ok(elapsed),
            count => Err(BenchError::TaskPanicked { count }),
        }
    }

    fn fan_out_tokio(&self, n: usize) -> Result<Duration> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(n.max(1))
            .thread_name("tokio-task")
            .build()
            .map_err(BenchError::Runtime)?;

        let work = Arc::clone(&self.work);
        runtime.block_on(async move {
            let start = Instant::now();
            let handles: Vec<_> = (0..n)
                .map(|i| {
                    let work = Arc::clone(&work);
                    tokio::task::spawn_blocking(move || work(i))
                })
                .collect();

            let mut panicked = 0;
            for handle in handles {
                if handle.await.is_err() {
                    panicked += 1;
                }
            }
            let elapsed = start.elapsed();

            match panicked {
                0 => Ok(elapsed),
                count => Err(BenchError::TaskPanicked { count }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    const EXECUTORS: [Executor; 3] = [Executor::Threads, Executor::Rayon, Executor::Tokio];

    fn counting_runner(
        executor: Executor,
    ) -> (TaskRunner<impl Fn(usize) + Send + Sync + 'static>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let runner = TaskRunner::with_executor(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            executor,
        );
        (runner, calls)
    }

    #[test]
    fn sequential_invokes_exactly_n_times_in_order() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let runner = TaskRunner::new(move |i| log.lock().unwrap().push(i));

        let m = runner.run_sequential(5);
        assert_eq!(m.mode, Mode::Sequential);
        assert_eq!(m.tasks, 5);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_tasks_invoke_nothing() {
        for executor in EXECUTORS {
            let (runner, calls) = counting_runner(executor);
            let seq = runner.run_sequential(0);
            let conc = runner.run_concurrent(0).unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            assert_eq!(seq.tasks, 0);
            assert_eq!(conc.tasks, 0);
            assert!(seq.elapsed < Duration::from_millis(100));
            assert!(conc.elapsed < Duration::from_millis(100));
        }
    }

    #[test]
    fn concurrent_invokes_exactly_n_times() {
        for executor in EXECUTORS {
            let (runner, calls) = counting_runner(executor);
            let m = runner.run_concurrent(16).unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 16, "executor {executor}");
            assert_eq!(m.mode, Mode::Concurrent);
            assert_eq!(m.tasks, 16);
        }
    }

    #[test]
    fn concurrent_returns_after_every_task_finished() {
        const N: usize = 6;
        for executor in EXECUTORS {
            let flags: Arc<Vec<AtomicBool>> =
                Arc::new((0..N).map(|_| AtomicBool::new(false)).collect());
            let slots = Arc::clone(&flags);
            let runner = TaskRunner::with_executor(
                move |i| {
                    thread::sleep(Duration::from_millis(10 * (N - i) as u64));
                    slots[i].store(true, Ordering::SeqCst);
                },
                executor,
            );

            runner.run_concurrent(N).unwrap();
            assert!(
                flags.iter().all(|f| f.load(Ordering::SeqCst)),
                "executor {executor} returned early"
            );
        }
    }

    #[test]
    fn panicking_task_is_reported() {
        for executor in EXECUTORS {
            let runner = TaskRunner::with_executor(
                |i| {
                    if i == 1 {
                        panic!("task {i} failed");
                    }
                },
                executor,
            );
            match runner.run_concurrent(3) {
                Err(BenchError::TaskPanicked { count }) => assert_eq!(count, 1),
                other => panic!("expected TaskPanicked, got {other:?}"),
            }
        }
    }

    #[test]
    fn repeated_runs_are_independent() {
        let (runner, calls) = counting_runner(Executor::Threads);
        for _ in 0..10 {
            runner.run_concurrent(4).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 40);
    }
}
