//! proctel CLI - launch processes and watch their resource usage

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{RunConfig, run_program, show_self, stat_process};
use console::style;
use log::debug;
use proctel::{ProcFs, ResourceTelemetry};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    let telemetry = ResourceTelemetry::new(ProcFs::new(&cli.proc_root));
    debug!("Reading telemetry from {}", telemetry.procfs().root().display());

    let result = match cli.command {
        Commands::Run {
            stdin_from,
            interval_ms,
            program,
            args,
        } => {
            let config = RunConfig {
                program,
                args,
                stdin_from,
                interval: Duration::from_millis(interval_ms.max(1)),
                json: cli.json,
            };
            run_program(config, &telemetry).map(Some)
        }
        Commands::Stat { pid } => stat_process(pid, &telemetry, cli.json).map(|_| None),
        Commands::SelfInfo => show_self(&telemetry, cli.json).map(|_| None),
    };

    match result {
        Ok(Some(code)) => std::process::exit(code),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}
