//! Small system helpers shared by the execution and monitoring layers

/// Fallback used when `sysconf(_SC_OPEN_MAX)` is indeterminate.
const DEFAULT_OPEN_MAX: i32 = 1024;

/// Fallback used when `sysconf(_SC_PAGESIZE)` fails.
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// System page size in bytes
pub fn page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Highest descriptor number (exclusive) the process may hold.
///
/// Safe to call between fork and exec: `sysconf` neither allocates nor locks.
pub fn open_max() -> i32 {
    let max = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    if max > 0 {
        max.min(i32::MAX as libc::c_long) as i32
    } else {
        DEFAULT_OPEN_MAX
    }
}

/// Render a byte count with binary units, e.g. `1.5 MiB`.
pub fn humanize_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}
