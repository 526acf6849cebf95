//! proctel: process launching and resource telemetry for Linux
//!
//! Starts child processes without leaking the parent's descriptors into
//! them, and reads per-process CPU and memory figures from `/proc`.
//!
//! # Modules
//!
//! - **execution**: fork/exec launcher, descriptor scrubber, fork window
//! - **monitoring**: stat and smaps readers, telemetry façade
//!
//! # Example
//!
//! ```ignore
//! use proctel::{ResourceTelemetry, spawn, wait_for_exit};
//!
//! let child = spawn("/bin/sleep", &["1"], false)?;
//! let telemetry = ResourceTelemetry::default();
//! println!("rss: {} kB", telemetry.resident_set_kb(child.pid.as_raw()));
//! let outcome = wait_for_exit(child.pid)?;
//! ```

// Core modules
pub mod errors;
pub mod utils;

// Layered modules
pub mod execution;
pub mod monitoring;

// Public API
pub use errors::{Result, SpawnError};
pub use execution::{
    EXEC_FAILURE_STATUS, ExitOutcome, LaunchRequest, LaunchResult, ProcessLauncher, spawn,
    try_wait, wait_for_exit,
};
pub use monitoring::{
    MemoryMapReader, MemoryMapSample, ProcFs, ProcessStatReader, ResourceSnapshot,
    ResourceTelemetry,
};
