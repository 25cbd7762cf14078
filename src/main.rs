// CPU fan-out benchmark: sequential vs concurrent
// Same workload, same task count, timed once per mode

use clap::Parser;
use cpu_fanout::{Cli, Report, TaskRunner};
use std::io::Write;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "cpu_fanout=debug"
    } else {
        "cpu_fanout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cores = num_cpus::get();
    let tasks = cli.task_count();
    let workload = cli.workload();
    info!(
        tasks,
        cores,
        workload = %workload.kind,
        iterations = workload.iterations,
        executor = %cli.executor,
        "running {tasks} tasks on {cores} CPU cores"
    );

    let runner = TaskRunner::with_executor(move |_| workload.execute(), cli.executor);

    let mut measurements = Vec::with_capacity(2);
    if cli.concurrent_first {
        info!("concurrent run started");
        measurements.push(runner.run_concurrent(tasks)?);
        info!("sequential run started");
        measurements.push(runner.run_sequential(tasks));
    } else {
        info!("sequential run started");
        measurements.push(runner.run_sequential(tasks));
        info!("concurrent run started");
        measurements.push(runner.run_concurrent(tasks)?);
    }

    let report = Report::new(cores, workload, cli.executor, measurements);
    if let Some(speedup) = report.speedup {
        info!("speedup: {speedup:.2}x");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.render(cli.format)?.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
