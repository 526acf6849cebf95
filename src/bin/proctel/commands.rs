use console::style;
use log::{debug, info, warn};
use proctel::utils::humanize_bytes;
use proctel::{ExitOutcome, ResourceSnapshot, ResourceTelemetry, spawn, try_wait};
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Settings for `proctel run`
pub struct RunConfig {
    pub program: String,
    pub args: Vec<String>,
    pub stdin_from: Option<PathBuf>,
    pub interval: Duration,
    pub json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    pid: i32,
    exit_code: i32,
    exec_failed: bool,
    signal: Option<i32>,
    samples: usize,
    peak_resident_set_kb: u64,
    peak_pss_kb: u64,
    cpu_jiffies: u64,
}

#[derive(Serialize)]
struct SelfReport {
    #[serde(flatten)]
    snapshot: ResourceSnapshot,
    threads: Option<usize>,
    total_system_memory_kb: u64,
}

/// Launch, sample until exit, print a summary. Returns the exit code to use.
pub fn run_program(
    config: RunConfig,
    telemetry: &ResourceTelemetry,
) -> Result<i32, Box<dyn Error>> {
    // Open before spawning so a bad path never leaves an orphaned child.
    let stdin_source = config.stdin_from.as_ref().map(File::open).transpose()?;

    info!("Executing: {} {:?}", config.program, config.args);
    let mut child = spawn(
        &config.program,
        config.args.as_slice(),
        stdin_source.is_some(),
    )?;
    let pid = child.pid;

    let feeder = match (stdin_source, child.take_input()) {
        (Some(mut source), Some(mut input)) => Some(thread::spawn(move || {
            if let Err(e) = io::copy(&mut source, &mut input) {
                warn!("Feeding stdin of pid {} stopped: {}", pid, e);
            }
        })),
        _ => None,
    };

    let mut samples = 0;
    let mut cpu_jiffies = 0;
    let mut peak_rss = 0;
    let mut peak_pss = 0;

    let outcome = loop {
        if let Some(outcome) = try_wait(pid)? {
            break outcome;
        }

        let snapshot = telemetry.snapshot(pid.as_raw());
        samples += 1;
        peak_rss = peak_rss.max(snapshot.resident_set_kb);
        peak_pss = peak_pss.max(snapshot.pss_kb);
        cpu_jiffies = cpu_jiffies.max(snapshot.cpu_jiffies);
        print_sample(&snapshot, config.json)?;

        thread::sleep(config.interval);
    };

    if let Some(handle) = feeder {
        if handle.join().is_err() {
            warn!("stdin feeder for pid {} panicked", pid);
        }
    }

    debug!("pid {} finished with {:?}", pid, outcome);

    let summary = RunSummary {
        pid: pid.as_raw(),
        exit_code: outcome.code(),
        exec_failed: outcome == ExitOutcome::ExecFailed,
        signal: match outcome {
            ExitOutcome::Signaled(signal) => Some(signal),
            _ => None,
        },
        samples,
        peak_resident_set_kb: peak_rss,
        peak_pss_kb: peak_pss,
        cpu_jiffies,
    };
    print_summary(&summary, config.json)?;

    Ok(summary.exit_code)
}

pub fn stat_process(
    pid: i32,
    telemetry: &ResourceTelemetry,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let snapshot = telemetry.snapshot(pid);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{} {}", style("pid").dim(), style(snapshot.pid).bold());
    println!("  cpu_jiffies      {}", snapshot.cpu_jiffies);
    println!(
        "  resident_set     {}",
        humanize_bytes(snapshot.resident_set_kb * 1024)
    );
    println!("  pss              {}", humanize_bytes(snapshot.pss_kb * 1024));
    println!(
        "  private_dirty    {}",
        humanize_bytes(snapshot.private_dirty_kb * 1024)
    );
    Ok(())
}

pub fn show_self(telemetry: &ResourceTelemetry, json: bool) -> Result<(), Box<dyn Error>> {
    let report = SelfReport {
        snapshot: telemetry.snapshot(std::process::id() as i32),
        threads: telemetry.thread_count(),
        total_system_memory_kb: telemetry.total_system_memory_kb(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    stat_process(report.snapshot.pid, telemetry, false)?;
    match report.threads {
        Some(threads) => println!("  threads          {}", threads),
        None => println!("  threads          {}", style("unknown").yellow()),
    }
    println!(
        "  system_memory    {}",
        humanize_bytes(report.total_system_memory_kb * 1024)
    );
    Ok(())
}

fn print_sample(snapshot: &ResourceSnapshot, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!(
            "{}={} {}={} {}={} {}={}",
            style("cpu_jiffies").dim(),
            snapshot.cpu_jiffies,
            style("rss_kb").dim(),
            snapshot.resident_set_kb,
            style("pss_kb").dim(),
            snapshot.pss_kb,
            style("dirty_kb").dim(),
            snapshot.private_dirty_kb,
        );
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    let exit_code_styled = if summary.exit_code == 0 {
        style(summary.exit_code).green().bold()
    } else {
        style(summary.exit_code).red().bold()
    };

    print!(
        "{}={} | {}={} | {}={} | {}={}",
        style("exit_code").dim(),
        exit_code_styled,
        style("samples").dim(),
        style(summary.samples).bold(),
        style("peak_rss").dim(),
        style(humanize_bytes(summary.peak_resident_set_kb * 1024)).bold(),
        style("peak_pss").dim(),
        style(humanize_bytes(summary.peak_pss_kb * 1024)).bold(),
    );

    if summary.exec_failed {
        print!(
            " | {}={}",
            style("exec_failed").red(),
            style("true").red().bold()
        );
    }
    if let Some(signal) = summary.signal {
        print!(" | {}={}", style("signal").red(), style(signal).red().bold());
    }

    println!();
    Ok(())
}
