//! Positional fields of `/proc/<pid>/stat`
//!
//! Fields are counted from 1 as in `proc(5)`. The line is split on single
//! spaces without special-casing the parenthesised comm field, so a comm
//! containing spaces shifts every later position. Callers only read fields
//! whose values they can tolerate being shifted for such processes.

use super::parse::lenient_u64;
use super::procfs::ProcFs;
use log::trace;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Longest stat line read; anything beyond is ignored.
pub const STAT_LINE_MAX: u64 = 4096;

/// User-mode CPU time in clock ticks
pub const UTIME_FIELD: usize = 14;
/// Kernel-mode CPU time in clock ticks
pub const STIME_FIELD: usize = 15;
/// Resident set size in pages
pub const RSS_FIELD: usize = 24;

/// Reads single fields out of `/proc/<pid>/stat`
#[derive(Debug, Clone, Default)]
pub struct ProcessStatReader {
    procfs: ProcFs,
}

impl ProcessStatReader {
    pub fn new(procfs: ProcFs) -> Self {
        Self { procfs }
    }

    /// Value of 1-indexed `field` for `pid`, or 0 when there is no data.
    ///
    /// A non-positive pid, a vanished process, an unreadable file or a field
    /// past the end of the line all read as 0.
    pub fn read_field(&self, pid: i32, field: usize) -> u64 {
        if pid <= 0 {
            return 0;
        }

        let path = self.procfs.pid_path(pid, "stat");
        match read_stat_line(&path) {
            Ok(line) => field_from_line(&line, field),
            Err(e) => {
                trace!("No stat data at {}: {}", path.display(), e);
                0
            }
        }
    }
}

/// Value of 1-indexed `field` in a raw stat line, or 0.
pub fn field_from_line(line: &[u8], field: usize) -> u64 {
    if field == 0 {
        return 0;
    }
    line.split(|&b| b == b' ')
        .nth(field - 1)
        .map(lenient_u64)
        .unwrap_or(0)
}

fn read_stat_line(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file.take(STAT_LINE_MAX));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    Ok(line)
}
