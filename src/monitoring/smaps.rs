//! PSS and private-dirty totals from `/proc/<pid>/smaps`

use super::parse::{lenient_u64, value_after_tag};
use super::procfs::ProcFs;
use log::trace;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};

const PSS_TAG: &[u8] = b"Pss:";
// Shared_Dirty is left out on purpose: a sibling's RSS already covers it.
const PRIVATE_DIRTY_TAG: &[u8] = b"Private_Dirty:";

/// Totals across all mapped regions, in kB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryMapSample {
    /// Proportional set size
    pub pss_kb: u64,
    /// Modified pages not shared with anyone
    pub private_dirty_kb: u64,
}

impl MemoryMapSample {
    /// Sum the `Pss:` and `Private_Dirty:` lines of an smaps report.
    ///
    /// A read error ends the scan and keeps what was summed so far; smaps
    /// reads fail routinely when the process exits midway.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Self {
        let mut sample = Self::default();
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => sample.accumulate(&line),
                Err(e) => {
                    trace!("smaps read stopped early: {}", e);
                    break;
                }
            }
        }
        sample
    }

    fn accumulate(&mut self, line: &[u8]) {
        if let Some(value) = value_after_tag(line, PRIVATE_DIRTY_TAG) {
            self.private_dirty_kb = self.private_dirty_kb.saturating_add(lenient_u64(value));
        } else if let Some(value) = value_after_tag(line, PSS_TAG) {
            self.pss_kb = self.pss_kb.saturating_add(lenient_u64(value));
        }
    }

    /// One-line form used in diagnostics
    pub fn summary(&self, pid: i32) -> String {
        format!(
            "procmemstats: pid={} pss={} dirty={}",
            pid, self.pss_kb, self.private_dirty_kb
        )
    }
}

/// Reads `/proc/<pid>/smaps`
#[derive(Debug, Clone, Default)]
pub struct MemoryMapReader {
    procfs: ProcFs,
}

impl MemoryMapReader {
    pub fn new(procfs: ProcFs) -> Self {
        Self { procfs }
    }

    /// Totals for `pid`; all zero when the report is missing or unreadable.
    pub fn sample(&self, pid: i32) -> MemoryMapSample {
        if pid <= 0 {
            return MemoryMapSample::default();
        }

        let path = self.procfs.pid_path(pid, "smaps");
        match File::open(&path) {
            Ok(file) => {
                let sample = MemoryMapSample::from_reader(BufReader::new(file));
                trace!("Collected {}", sample.summary(pid));
                sample
            }
            Err(e) => {
                trace!("No smaps data at {}: {}", path.display(), e);
                MemoryMapSample::default()
            }
        }
    }
}
