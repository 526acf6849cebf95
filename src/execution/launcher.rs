//! Fork/exec process launching

use super::child::{ChildWindow, EXEC_FAILURE_STATUS};
use super::image::ExecImage;
use super::scrub::RESERVED_DESCRIPTORS;
use crate::errors::{Result, SpawnError};
use log::{debug, error};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, pipe2};
use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd};

const STDIN_REDIRECT_FAILED_MSG: &[u8] = b"proctel: failed to redirect stdin\n";

/// What to launch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Program to execute, resolved through `PATH` when it has no slash
    pub command: String,
    /// Arguments after `argv[0]`
    pub args: Vec<String>,
    /// Whether to connect a pipe to the child's stdin
    pub want_input_pipe: bool,
}

impl LaunchRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn input_pipe(mut self, enabled: bool) -> Self {
        self.want_input_pipe = enabled;
        self
    }
}

/// A launched child.
///
/// The pid stays reapable until the caller waits on it; nothing here reaps
/// automatically. Dropping `input` closes the child's stdin.
#[derive(Debug)]
pub struct LaunchResult {
    /// Child process ID
    pub pid: Pid,
    /// Write end of the child's stdin, when requested
    pub input: Option<OwnedFd>,
}

impl LaunchResult {
    /// Take the stdin write end as a `File` for `std::io::Write`.
    pub fn take_input(&mut self) -> Option<File> {
        self.input.take().map(File::from)
    }
}

/// How a launched child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited normally with its own status
    Exited(i32),
    /// Killed by a signal
    Signaled(i32),
    /// Exited with [`EXEC_FAILURE_STATUS`]: the image could not be replaced.
    ///
    /// Indistinguishable from a target that exits with that status itself.
    ExecFailed,
}

impl ExitOutcome {
    fn from_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, EXEC_FAILURE_STATUS) => Some(ExitOutcome::ExecFailed),
            WaitStatus::Exited(_, code) => Some(ExitOutcome::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitOutcome::Signaled(signal as i32)),
            _ => None,
        }
    }

    /// Shell-style status: the exit code, or 128 + signal
    pub fn code(&self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => *code,
            ExitOutcome::Signaled(signal) => 128 + signal,
            ExitOutcome::ExecFailed => EXEC_FAILURE_STATUS,
        }
    }
}

/// Process launcher
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Fork and exec `request.command`.
    ///
    /// The pipe, if any, is created before forking; the child dups its read
    /// end onto stdin, scrubs every other inherited descriptor and execs. The
    /// parent keeps only the write end.
    pub fn spawn(request: &LaunchRequest) -> Result<LaunchResult> {
        let image = ExecImage::new(&request.command, &request.args)?;

        let pipe = if request.want_input_pipe {
            let fds = pipe2(OFlag::O_CLOEXEC).map_err(|e| {
                error!("Out of file descriptors spawning {}", request.command);
                SpawnError::ResourceExhausted(format!(
                    "pipe for '{}' failed: {}",
                    request.command, e
                ))
            })?;
            Some(fds)
        } else {
            None
        };
        let stdin_fd = pipe.as_ref().map(|(read, _)| read.as_raw_fd());

        let pid = begin_child_execution(&image, |window| {
            if let Some(fd) = stdin_fd {
                if !window.redirect_stdin(fd) {
                    window.abort(STDIN_REDIRECT_FAILED_MSG);
                }
            }
            window.scrub_descriptors(RESERVED_DESCRIPTORS);
        })
        .map_err(|source| {
            error!("Failed to fork for command '{}': {}", request.command, source);
            SpawnError::ForkFailed {
                command: request.command.clone(),
                source,
            }
        })?;

        // The read end belongs to the child now.
        let input = pipe.map(|(read, write)| {
            drop(read);
            write
        });

        debug!(
            "Spawned '{}' {:?} as pid {}",
            request.command, request.args, pid
        );

        Ok(LaunchResult { pid, input })
    }
}

/// Launch `command` with `args`, optionally wiring a stdin pipe.
pub fn spawn<S: AsRef<str>>(
    command: &str,
    args: &[S],
    want_input_pipe: bool,
) -> Result<LaunchResult> {
    let request = LaunchRequest::new(command)
        .args(args.iter().map(|a| a.as_ref().to_string()))
        .input_pipe(want_input_pipe);
    ProcessLauncher::spawn(&request)
}

/// Fork; run `pre_exec` and then exec `image` in the child.
///
/// `pre_exec` only ever sees a [`ChildWindow`], so it cannot reach the
/// allocator, logging or anything lock-guarded through this interface.
fn begin_child_execution<F>(image: &ExecImage, pre_exec: F) -> nix::Result<Pid>
where
    F: FnOnce(&ChildWindow),
{
    match unsafe { fork() }? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => {
            let window = unsafe { ChildWindow::enter() };
            pre_exec(&window);
            window.exec(image)
        }
    }
}

/// Block until `pid` terminates and report how.
///
/// A program that itself exits with [`EXEC_FAILURE_STATUS`] is reported as
/// [`ExitOutcome::ExecFailed`]; `Exited(42)` is never returned.
pub fn wait_for_exit(pid: Pid) -> Result<ExitOutcome> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(outcome) = ExitOutcome::from_status(status) {
                    debug!("pid {} finished: {:?}", pid, outcome);
                    return Ok(outcome);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(SpawnError::Wait(format!("pid {}: {}", pid, e))),
        }
    }
}

/// Non-blocking variant of [`wait_for_exit`]; `None` while still running.
pub fn try_wait(pid: Pid) -> Result<Option<ExitOutcome>> {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) => Ok(None),
        Ok(status) => Ok(ExitOutcome::from_status(status)),
        Err(Errno::EINTR) => Ok(None),
        Err(e) => Err(SpawnError::Wait(format!("pid {}: {}", pid, e))),
    }
}
