use super::*;
use crate::test_support::serial_guard;
use std::io::Write;
use std::os::fd::AsRawFd;

const DEV_NULL: &[u8] = b"/dev/null\0";

fn no_args() -> &'static [&'static str] {
    &[]
}

#[test]
fn spawn_without_arguments_reports_program_status() {
    let _guard = serial_guard();
    let child = spawn("true", no_args(), false).expect("spawn true");

    assert!(child.pid.as_raw() > 0);
    assert!(child.input.is_none());
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(0));
}

#[test]
fn spawn_passes_nonzero_status_through() {
    let _guard = serial_guard();
    let child = spawn("false", no_args(), false).expect("spawn false");
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(1));

    let child = spawn("/bin/sh", &["-c", "exit 7"], false).expect("spawn sh");
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(7));
}

#[test]
fn spawn_with_input_pipe_delivers_bytes_to_stdin() {
    let _guard = serial_guard();
    let mut child = spawn(
        "/bin/sh",
        &["-c", "read line && test \"$line\" = 'hello proctel'"],
        true,
    )
    .expect("spawn sh");

    let mut input = child.take_input().expect("input pipe requested");
    input.write_all(b"hello proctel\n").unwrap();
    drop(input);

    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(0));
}

/// With the parent's stdin closed the pipe read end is allocated as fd 0 and
/// must still survive exec.
#[test]
fn input_pipe_works_when_parent_stdin_is_closed() {
    let _guard = serial_guard();
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed: {}", std::io::Error::last_os_error());

        if pid == 0 {
            libc::close(libc::STDIN_FILENO);

            let script = "read l && test \"$l\" = hi";
            let mut child = match spawn("/bin/sh", &["-c", script], true) {
                Ok(child) => child,
                Err(_) => libc::_exit(10),
            };
            let mut input = match child.take_input() {
                Some(input) => input,
                None => libc::_exit(11),
            };
            if input.write_all(b"hi\n").is_err() {
                libc::_exit(12);
            }
            drop(input);

            match wait_for_exit(child.pid) {
                Ok(ExitOutcome::Exited(0)) => libc::_exit(0),
                Ok(_) => libc::_exit(13),
                Err(_) => libc::_exit(14),
            }
        } else {
            let mut status: i32 = 0;
            libc::waitpid(pid, &mut status, 0);

            assert!(libc::WIFEXITED(status));
            assert_eq!(
                libc::WEXITSTATUS(status),
                0,
                "spawned child should read from the pipe on fd 0"
            );
        }
    }
}

#[test]
fn program_exiting_with_reserved_status_reads_as_exec_failure() {
    let _guard = serial_guard();
    let script = format!("exit {}", EXEC_FAILURE_STATUS);
    let child = spawn("/bin/sh", &["-c", script.as_str()], false).expect("spawn sh");
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::ExecFailed);
}

#[test]
fn dropping_input_handle_signals_eof() {
    let _guard = serial_guard();
    let child = spawn("/bin/sh", &["-c", "cat > /dev/null"], true).expect("spawn sh");
    assert!(child.input.is_some());

    let pid = child.pid;
    drop(child);

    assert_eq!(wait_for_exit(pid).unwrap(), ExitOutcome::Exited(0));
}

#[test]
fn spawn_of_missing_program_exits_with_reserved_status() {
    let _guard = serial_guard();
    let child = spawn("/nonexistent/proctel-test-binary", no_args(), false)
        .expect("fork still succeeds");

    assert!(child.pid.as_raw() > 0);
    let outcome = wait_for_exit(child.pid).unwrap();
    assert_eq!(outcome, ExitOutcome::ExecFailed);
    assert_eq!(outcome.code(), EXEC_FAILURE_STATUS);
}

#[test]
fn spawned_child_does_not_inherit_parent_descriptors() {
    let _guard = serial_guard();
    let file = std::fs::File::open("/dev/null").unwrap();
    // dup() drops O_CLOEXEC, so only the scrubber keeps this out of the child.
    let leaked = unsafe { libc::dup(file.as_raw_fd()) };
    assert!(leaked > 2);

    let script = format!("test ! -e /proc/$$/fd/{}", leaked);
    let child = spawn("/bin/sh", &["-c", script.as_str()], false).expect("spawn sh");
    let outcome = wait_for_exit(child.pid).unwrap();

    unsafe { libc::close(leaked) };
    assert_eq!(outcome, ExitOutcome::Exited(0));
}

#[test]
fn try_wait_reports_running_then_finished() {
    let _guard = serial_guard();
    let child = spawn("/bin/sh", &["-c", "cat > /dev/null"], true).expect("spawn sh");
    let pid = child.pid;

    assert_eq!(try_wait(pid).unwrap(), None);

    drop(child);
    assert_eq!(wait_for_exit(pid).unwrap(), ExitOutcome::Exited(0));
}

#[test]
fn process_launcher_accepts_request() {
    let _guard = serial_guard();
    let request = LaunchRequest::new("/bin/sh").args(["-c", "exit 3"]);
    let child = ProcessLauncher::spawn(&request).expect("spawn");
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(3));
}

/// Forks, opens {5, 9, 12}, scrubs with 3 and checks only {0, 1, 2} remain.
#[test]
fn scrub_leaves_only_standard_streams_open() {
    let _guard = serial_guard();
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed: {}", std::io::Error::last_os_error());

        if pid == 0 {
            let devnull = libc::open(DEV_NULL.as_ptr() as *const libc::c_char, libc::O_RDWR);
            if devnull < 0 {
                libc::_exit(10);
            }
            for fd in 0..3 {
                if libc::fcntl(fd, libc::F_GETFD) < 0 && libc::dup2(devnull, fd) < 0 {
                    libc::_exit(11);
                }
            }
            for fd in [5, 9, 12] {
                if libc::dup2(devnull, fd) < 0 {
                    libc::_exit(12);
                }
            }

            if !scrub(RESERVED_DESCRIPTORS) {
                libc::_exit(13);
            }

            for fd in 0..3 {
                if libc::fcntl(fd, libc::F_GETFD) < 0 {
                    libc::_exit(14);
                }
            }
            for fd in 3..1024 {
                if libc::fcntl(fd, libc::F_GETFD) >= 0 {
                    libc::_exit(15);
                }
            }
            libc::_exit(0);
        } else {
            let mut status: i32 = 0;
            libc::waitpid(pid, &mut status, 0);

            assert!(libc::WIFEXITED(status), "child should exit normally");
            assert_eq!(
                libc::WEXITSTATUS(status),
                0,
                "scrub should leave exactly the standard streams"
            );
        }
    }
}

#[test]
fn scrub_never_closes_standard_streams_even_when_asked() {
    let _guard = serial_guard();
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed: {}", std::io::Error::last_os_error());

        if pid == 0 {
            let devnull = libc::open(DEV_NULL.as_ptr() as *const libc::c_char, libc::O_RDWR);
            for fd in 0..3 {
                if libc::fcntl(fd, libc::F_GETFD) < 0 && libc::dup2(devnull, fd) < 0 {
                    libc::_exit(11);
                }
            }

            scrub(0);

            for fd in 0..3 {
                if libc::fcntl(fd, libc::F_GETFD) < 0 {
                    libc::_exit(14);
                }
            }
            libc::_exit(0);
        } else {
            let mut status: i32 = 0;
            libc::waitpid(pid, &mut status, 0);

            assert!(libc::WIFEXITED(status));
            assert_eq!(libc::WEXITSTATUS(status), 0);
        }
    }
}
