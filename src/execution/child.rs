//! The window between fork and exec
//!
//! Only the calling thread survives a fork; any lock another thread held at
//! that instant stays locked forever in the child. `ChildWindow` is the only
//! handle the child gets, and everything it offers is a raw syscall.

use super::image::ExecImage;
use super::scrub;
use std::marker::PhantomData;
use std::os::fd::RawFd;

/// Exit status of a child whose `execvp` failed.
///
/// Fixed so the parent can tell exec failure apart from a normal exit, as long
/// as the target program does not itself exit with 42.
pub const EXEC_FAILURE_STATUS: i32 = 42;

const EXEC_FAILED_MSG: &[u8] = b"proctel: failed to exec command\n";

/// Capability for the forked child before its image is replaced.
///
/// Cannot be built outside the launcher, is neither `Send` nor `Sync`, and
/// exposes nothing that allocates or takes a lock.
pub struct ChildWindow {
    _not_send: PhantomData<*const ()>,
}

impl ChildWindow {
    /// # Safety
    ///
    /// Must only be called in the child branch of a fork.
    pub(super) unsafe fn enter() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }

    /// Make `fd` the child's standard input.
    ///
    /// When the pipe already landed on descriptor 0 (the parent had stdin
    /// closed), `dup2` would be a no-op and leave `FD_CLOEXEC` set, so the
    /// flag is cleared directly instead.
    pub fn redirect_stdin(&self, fd: RawFd) -> bool {
        unsafe {
            if fd == libc::STDIN_FILENO {
                libc::fcntl(libc::STDIN_FILENO, libc::F_SETFD, 0) >= 0
            } else {
                libc::dup2(fd, libc::STDIN_FILENO) >= 0
            }
        }
    }

    /// Close every inherited descriptor `>= reserved_below`.
    pub fn scrub_descriptors(&self, reserved_below: RawFd) -> bool {
        // The parent's descriptors are never used by this process again.
        unsafe { scrub::scrub(reserved_below) }
    }

    /// Write `msg` to stderr and leave with [`EXEC_FAILURE_STATUS`].
    ///
    /// Uses `_exit`, so no destructors, atexit handlers or stdio flushes run.
    pub fn abort(&self, msg: &[u8]) -> ! {
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                msg.as_ptr() as *const libc::c_void,
                msg.len(),
            );
            libc::_exit(EXEC_FAILURE_STATUS)
        }
    }

    /// Replace the process image. Only returns by exiting.
    pub fn exec(self, image: &ExecImage) -> ! {
        unsafe {
            libc::execvp(image.program_ptr(), image.argv_ptr());
        }
        self.abort(EXEC_FAILED_MSG)
    }
}
