//! Resource telemetry for a process ID
//!
//! Every accessor is a fresh read of `/proc`: no caching, no smoothing.
//! CPU jiffies are a monotonic counter, so rates need two samples; RSS and
//! PSS are point-in-time gauges. Missing data reads as zero.

use super::parse::{lenient_u64, value_after_tag};
use super::procfs::ProcFs;
use super::smaps::{MemoryMapReader, MemoryMapSample};
use super::stat::{ProcessStatReader, RSS_FIELD, STIME_FIELD, UTIME_FIELD};
use crate::utils;
use log::{error, trace};
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader};

const MEM_TOTAL_TAG: &[u8] = b"MemTotal:";

/// All four readings for one process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSnapshot {
    pub pid: i32,
    /// utime + stime, in clock ticks
    pub cpu_jiffies: u64,
    pub resident_set_kb: u64,
    pub pss_kb: u64,
    pub private_dirty_kb: u64,
}

/// Façade over the stat and smaps readers
#[derive(Debug, Clone)]
pub struct ResourceTelemetry {
    procfs: ProcFs,
    stat: ProcessStatReader,
    smaps: MemoryMapReader,
    page_size: u64,
}

impl Default for ResourceTelemetry {
    fn default() -> Self {
        Self::new(ProcFs::default())
    }
}

impl ResourceTelemetry {
    pub fn new(procfs: ProcFs) -> Self {
        Self {
            stat: ProcessStatReader::new(procfs.clone()),
            smaps: MemoryMapReader::new(procfs.clone()),
            procfs,
            page_size: utils::page_size(),
        }
    }

    /// Override the page size used to convert RSS pages to kB.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// The proc mount every reading comes from
    pub fn procfs(&self) -> &ProcFs {
        &self.procfs
    }

    /// User plus kernel CPU time in clock ticks
    pub fn cpu_jiffies(&self, pid: i32) -> u64 {
        self.stat
            .read_field(pid, UTIME_FIELD)
            .saturating_add(self.stat.read_field(pid, STIME_FIELD))
    }

    /// Resident set size in kB
    pub fn resident_set_kb(&self, pid: i32) -> u64 {
        self.stat
            .read_field(pid, RSS_FIELD)
            .saturating_mul(self.page_size)
            / 1024
    }

    /// Proportional set size in kB
    pub fn pss_kb(&self, pid: i32) -> u64 {
        self.smaps.sample(pid).pss_kb
    }

    /// Private dirty memory in kB
    pub fn private_dirty_kb(&self, pid: i32) -> u64 {
        self.smaps.sample(pid).private_dirty_kb
    }

    /// PSS and private-dirty from a single smaps pass
    pub fn memory_map(&self, pid: i32) -> MemoryMapSample {
        self.smaps.sample(pid)
    }

    /// All readings at once, reading smaps a single time.
    pub fn snapshot(&self, pid: i32) -> ResourceSnapshot {
        let map = self.memory_map(pid);
        ResourceSnapshot {
            pid,
            cpu_jiffies: self.cpu_jiffies(pid),
            resident_set_kb: self.resident_set_kb(pid),
            pss_kb: map.pss_kb,
            private_dirty_kb: map.private_dirty_kb,
        }
    }

    /// Number of threads in the calling process, `None` without `/proc`.
    ///
    /// Counts only numeric `task` entries, so `.` and `..` are excluded.
    pub fn thread_count(&self) -> Option<usize> {
        let path = self.procfs.self_path("task");
        match fs::read_dir(&path) {
            Ok(entries) => Some(
                entries
                    .flatten()
                    .filter(|entry| {
                        entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| name.parse::<u32>().is_ok())
                    })
                    .count(),
            ),
            Err(e) => {
                error!("No proc mounted at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// `MemTotal` from meminfo, or 0.
    pub fn total_system_memory_kb(&self) -> u64 {
        let path = self.procfs.system_path("meminfo");
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                trace!("No meminfo at {}: {}", path.display(), e);
                return 0;
            }
        };

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => return 0,
                Ok(_) => {
                    if let Some(value) = value_after_tag(&line, MEM_TOTAL_TAG) {
                        return lenient_u64(value);
                    }
                }
            }
        }
    }
}
