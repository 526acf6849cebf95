//! Integration tests for proctel
//!
//! Launch real children and read their telemetry through the public API.
//! Everything here runs without root.

use proctel::{
    EXEC_FAILURE_STATUS, ExitOutcome, LaunchRequest, ProcessLauncher, ResourceTelemetry,
    SpawnError, spawn, wait_for_exit,
};
use std::io::Write;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

static INTEGRATION_TEST_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> std::sync::MutexGuard<'static, ()> {
    INTEGRATION_TEST_LOCK
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

/// Zero-argument launch returns a positive pid and the program's own status
#[test]
fn test_spawn_zero_args_status_unmodified() {
    let _lock = lock();

    for (program, expected) in [("true", 0), ("false", 1)] {
        let child = spawn(program, &[] as &[&str], false).expect("spawn");
        assert!(child.pid.as_raw() > 0);
        assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(expected));
    }
}

/// Bytes written to the input handle arrive on the child's stdin
#[test]
fn test_input_pipe_round_trip() {
    let _lock = lock();

    let payload = "line one\nline two\nline three\n";
    let script = "test \"$(cat)\" = \"$(printf 'line one\\nline two\\nline three')\"";
    let mut child = spawn("/bin/sh", &["-c", script], true).expect("spawn sh");

    let mut input = child.take_input().expect("input handle");
    input.write_all(payload.as_bytes()).unwrap();
    drop(input);

    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(0));
}

/// A missing executable still yields a waitable pid with the reserved status
#[test]
fn test_missing_executable_reports_exec_failure() {
    let _lock = lock();

    let child = spawn("/definitely/not/here", &["arg"], true).expect("fork succeeds");
    let outcome = wait_for_exit(child.pid).unwrap();

    assert_eq!(outcome, ExitOutcome::ExecFailed);
    assert_eq!(outcome.code(), EXEC_FAILURE_STATUS);
}

/// Interior NUL bytes are rejected before any fork happens
#[test]
fn test_nul_byte_rejected() {
    let request = LaunchRequest::new("/bin/echo").arg("oops\0");
    let result = ProcessLauncher::spawn(&request);
    assert!(matches!(result, Err(SpawnError::InvalidArgument(_))));
}

/// Telemetry of a live child reports memory, and reads zero after it is reaped
#[test]
fn test_telemetry_of_spawned_child() {
    let _lock = lock();

    let telemetry = ResourceTelemetry::default();
    let child = spawn("/bin/sh", &["-c", "cat > /dev/null"], true).expect("spawn sh");
    let pid = child.pid.as_raw();

    // Give the kernel a moment to finish exec bookkeeping.
    let mut rss = 0;
    for _ in 0..50 {
        rss = telemetry.resident_set_kb(pid);
        if rss > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(rss > 0);

    let first = telemetry.cpu_jiffies(pid);
    let second = telemetry.cpu_jiffies(pid);
    assert!(second >= first);

    let outcome_pid = child.pid;
    drop(child);
    assert_eq!(wait_for_exit(outcome_pid).unwrap(), ExitOutcome::Exited(0));

    let after = telemetry.snapshot(pid);
    assert_eq!(after.cpu_jiffies, 0);
    assert_eq!(after.resident_set_kb, 0);
    assert_eq!(after.pss_kb, 0);
}

/// A child that is never waited on stays reapable
#[test]
fn test_unwaited_child_remains_reapable() {
    let _lock = lock();

    let child = spawn("true", &[] as &[&str], false).expect("spawn");
    thread::sleep(Duration::from_millis(50));

    let telemetry = ResourceTelemetry::default();
    // Zombies keep their stat entry until reaped.
    assert_eq!(
        telemetry.cpu_jiffies(child.pid.as_raw()),
        telemetry.cpu_jiffies(child.pid.as_raw())
    );
    assert_eq!(wait_for_exit(child.pid).unwrap(), ExitOutcome::Exited(0));
}
