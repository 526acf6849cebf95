use clap::{Parser, Subcommand};
use proctel::monitoring::DEFAULT_PROC_ROOT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proctel")]
#[command(version, about = "Launch processes and read their resource usage from /proc", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Run a program, sampling CPU and memory every 200ms
    proctel run --interval-ms 200 -- python3 script.py

    # Feed a file to the program's stdin
    proctel run --stdin-from input.txt wc -l

    # One-off readings
    proctel stat 1234
    proctel --json stat 1234
    proctel self
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root of the proc filesystem
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PROC_ROOT, global = true)]
    pub proc_root: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch a program and sample its resources until it exits
    Run {
        /// File whose contents are written to the program's stdin
        #[arg(long, value_name = "FILE")]
        stdin_from: Option<PathBuf>,

        /// Sampling interval in milliseconds
        #[arg(short, long, value_name = "MS", default_value_t = 500)]
        interval_ms: u64,

        /// Program to run
        program: String,

        /// Program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print one reading for a running process
    Stat {
        /// Process ID
        pid: i32,
    },

    /// Print readings for this process, plus thread count and system memory
    #[command(name = "self")]
    SelfInfo,
}
