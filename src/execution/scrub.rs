//! Descriptor scrubbing for a freshly forked child
//!
//! Runs between fork and exec, so it sticks to raw syscalls and stack
//! buffers: no allocation, no locks, no logging.

use crate::utils;
use std::os::fd::RawFd;

/// Descriptors below this (stdin, stdout, stderr) always survive a scrub.
pub const RESERVED_DESCRIPTORS: RawFd = 3;

const FD_DIR: &[u8] = b"/proc/self/fd\0";

// struct linux_dirent64: d_ino (8), d_off (8), d_reclen (2), d_type (1), d_name
const DIRENT_RECLEN_OFFSET: usize = 16;
const DIRENT_NAME_OFFSET: usize = 19;

const DIRENT_BUF_LEN: usize = 4096;

/// Close every descriptor numbered `>= reserved_below`.
///
/// Enumerates `/proc/self/fd` and closes only what is actually open. When the
/// listing cannot be read (no `/proc` in a sandbox, for instance) it falls
/// back to closing every number up to `OPEN_MAX`. Returns `true` when the
/// listing was used. Descriptors 0, 1 and 2 are never closed.
///
/// # Safety
///
/// Closes descriptors that other objects in this process may own. Only call
/// it where nothing will use those objects again, i.e. in a child between
/// fork and exec.
pub unsafe fn scrub(reserved_below: RawFd) -> bool {
    let lower = reserved_below.max(RESERVED_DESCRIPTORS);

    if close_listed(lower) {
        true
    } else {
        close_all_from(lower, utils::open_max());
        false
    }
}

/// Fast path over `/proc/self/fd`. Returns `false` if the listing failed.
unsafe fn close_listed(lower: RawFd) -> bool {
    let dir = libc::open(
        FD_DIR.as_ptr() as *const libc::c_char,
        libc::O_RDONLY | libc::O_DIRECTORY | libc::O_CLOEXEC,
    );
    if dir < 0 {
        return false;
    }

    let mut buf = [0u8; DIRENT_BUF_LEN];
    loop {
        let read = libc::syscall(
            libc::SYS_getdents64,
            dir,
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
        );
        if read < 0 {
            libc::close(dir);
            return false;
        }
        if read == 0 {
            break;
        }

        let filled = &buf[..read as usize];
        let mut offset = 0;
        while offset + DIRENT_NAME_OFFSET <= filled.len() {
            let record = &filled[offset..];
            let reclen = u16::from_ne_bytes([
                record[DIRENT_RECLEN_OFFSET],
                record[DIRENT_RECLEN_OFFSET + 1],
            ]) as usize;
            if reclen < DIRENT_NAME_OFFSET || reclen > record.len() {
                break;
            }

            if let Some(fd) = parse_fd_name(&record[DIRENT_NAME_OFFSET..reclen]) {
                if fd != dir && fd >= lower {
                    libc::close(fd);
                }
            }
            offset += reclen;
        }
    }

    libc::close(dir);
    true
}

/// O(OPEN_MAX) fallback.
unsafe fn close_all_from(lower: RawFd, upper: RawFd) {
    for fd in lower..upper {
        libc::close(fd);
    }
}

/// Parse a NUL-terminated directory entry name as a plain decimal number.
///
/// Anything else (`.`, `..`, signs, overflow) yields `None`.
fn parse_fd_name(name: &[u8]) -> Option<RawFd> {
    let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    let digits = &name[..len];
    if digits.is_empty() {
        return None;
    }

    let mut fd: RawFd = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        fd = fd.checked_mul(10)?.checked_add((b - b'0') as RawFd)?;
    }
    Some(fd)
}
