//! Lifecycle sequencing: start/initialize/shutdown and their rejection rules.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskloop::{EventKind, ExecutorError, LoopExecutor, Work};

use common::{init_tracing, wait_finished, EventLog};

#[test]
fn test_submit_before_start_is_not_running() {
    init_tracing();
    let exec = LoopExecutor::new();
    let res = exec.submit("x", Work::blocking(|| Ok(())));
    assert!(matches!(res, Err(ExecutorError::NotRunning)));
}

#[test]
fn test_all_operations_before_start_are_not_running() {
    init_tracing();
    let exec = LoopExecutor::new();
    assert!(matches!(
        exec.initialize(|| {}),
        Err(ExecutorError::NotRunning)
    ));
    assert!(matches!(
        exec.create_task(async { Ok(()) }, "x", false),
        Err(ExecutorError::NotRunning)
    ));
    assert!(matches!(
        exec.cancel_current_tasks(Duration::from_millis(100)),
        Err(ExecutorError::NotRunning)
    ));
}

#[test]
fn test_start_is_idempotent() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("first start");
    exec.start().expect("second start is a no-op");
    assert!(exec.is_running());

    let handle = exec
        .submit("idem", Work::blocking(|| Ok(())))
        .expect("submit after double start");
    assert!(wait_finished(&handle, Duration::from_secs(2)));
    exec.shutdown(true);
}

#[test]
fn test_initialize_runs_on_loop_before_tasks() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    let ready = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ready);
    exec.initialize(move || flag.store(true, Ordering::SeqCst))
        .expect("initialize");
    assert!(ready.load(Ordering::SeqCst), "initializer finished before return");

    exec.shutdown(true);
}

#[test]
fn test_initializer_panic_is_contained() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    let mut events = EventLog::new(exec.bus().subscribe());

    exec.initialize(|| panic!("bad init"))
        .expect("panic must not surface to the caller");
    let ev = events
        .wait_for(EventKind::InitFailed, Duration::from_secs(2))
        .expect("InitFailed event");
    assert!(ev.error.as_deref().unwrap_or_default().contains("bad init"));

    // The executor stays usable.
    let handle = exec
        .submit("after-init", Work::blocking(|| Ok(())))
        .expect("submit after failed initializer");
    assert!(wait_finished(&handle, Duration::from_secs(2)));
    exec.shutdown(true);
}

#[test]
fn test_submit_after_shutdown_is_already_shutdown() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    exec.shutdown(true);

    assert!(matches!(
        exec.submit("x", Work::blocking(|| Ok(()))),
        Err(ExecutorError::AlreadyShutdown)
    ));
    assert!(matches!(
        exec.create_task(async { Ok(()) }, "x", false),
        Err(ExecutorError::AlreadyShutdown)
    ));
    assert!(matches!(
        exec.initialize(|| {}),
        Err(ExecutorError::AlreadyShutdown)
    ));

    // Repeated shutdowns are safe and do not change the answer.
    exec.shutdown(true);
    exec.shutdown(false);
    assert!(matches!(
        exec.submit("x", Work::blocking(|| Ok(()))),
        Err(ExecutorError::AlreadyShutdown)
    ));
}

#[test]
fn test_start_after_shutdown_is_rejected() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    exec.shutdown(true);
    assert!(matches!(exec.start(), Err(ExecutorError::AlreadyShutdown)));
}

#[test]
fn test_shutdown_publishes_event_once() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    let mut events = EventLog::new(exec.bus().subscribe());

    exec.shutdown(true);
    exec.shutdown(true);

    assert!(events
        .wait_for(EventKind::ShutdownRequested, Duration::from_secs(2))
        .is_some());
    let again = events.wait_for(EventKind::ShutdownRequested, Duration::from_millis(100));
    assert!(again.is_none(), "flag is monotonic; the event fires once");
}

#[test]
fn test_registry_is_empty_after_shutdown() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    for i in 0..4u64 {
        exec.submit(
            "drain",
            Work::blocking(move || {
                std::thread::sleep(Duration::from_millis(10 * (i + 1)));
                Ok(())
            }),
        )
        .expect("submit");
    }

    // shutdown(wait = true) lets the drain finish the still-pending units.
    exec.shutdown(true);
    assert_eq!(exec.task_count(), 0);
    assert!(exec.task_names().is_empty());
}

#[test]
fn test_loop_stops_after_shutdown() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    assert!(exec.is_running());
    exec.shutdown(true);
    assert!(!exec.is_running());
}
