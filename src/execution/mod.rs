//! Execution layer: fork/exec launching with descriptor scrubbing
//!
//! This module starts child processes without leaking the parent's
//! descriptors into them.
//!
//! # Features
//!
//! - **Launcher**: fork, optional stdin pipe, `execvp`
//! - **Scrubber**: closes inherited descriptors via `/proc/self/fd`, with an
//!   `OPEN_MAX` sweep when `/proc` is unavailable
//! - **Fork window**: `ChildWindow` limits the child to allocation-free calls
//!
//! # Examples
//!
//! ```ignore
//! use proctel::execution::{spawn, wait_for_exit};
//! use std::io::Write;
//!
//! let mut child = spawn("cat", &[] as &[&str], true)?;
//! child.take_input().unwrap().write_all(b"hello\n")?;
//! let outcome = wait_for_exit(child.pid)?;
//! ```

pub mod child;
pub mod image;
pub mod launcher;
pub mod scrub;

pub use child::{ChildWindow, EXEC_FAILURE_STATUS};
pub use image::ExecImage;
pub use launcher::{
    ExitOutcome, LaunchRequest, LaunchResult, ProcessLauncher, spawn, try_wait, wait_for_exit,
};
pub use scrub::{RESERVED_DESCRIPTORS, scrub};

#[cfg(test)]
mod tests;
