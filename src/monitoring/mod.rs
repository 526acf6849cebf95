//! Monitoring layer: per-process resource readings from `/proc`
//!
//! # Features
//!
//! - **Stat reader**: positional fields of `/proc/<pid>/stat`
//! - **Memory map reader**: PSS and private-dirty totals from smaps
//! - **Telemetry**: CPU jiffies, RSS, PSS and private-dirty per pid
//!
//! Readings never fail: a process that vanished between lookup and read
//! simply reports zeros. Each call opens and closes its own handle, so
//! readers can be shared across threads freely.
//!
//! # Examples
//!
//! ```ignore
//! use proctel::monitoring::ResourceTelemetry;
//!
//! let telemetry = ResourceTelemetry::default();
//! let before = telemetry.cpu_jiffies(pid);
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! let used = telemetry.cpu_jiffies(pid) - before;
//! ```

pub mod parse;
pub mod procfs;
pub mod smaps;
pub mod stat;
pub mod telemetry;

pub use procfs::{DEFAULT_PROC_ROOT, ProcFs};
pub use smaps::{MemoryMapReader, MemoryMapSample};
pub use stat::{ProcessStatReader, RSS_FIELD, STIME_FIELD, UTIME_FIELD, field_from_line};
pub use telemetry::{ResourceSnapshot, ResourceTelemetry};
