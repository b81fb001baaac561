//! Bulk cooperative cancellation: the snapshot rule, bounded acknowledgement,
//! and timeout behavior for units that never yield.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use taskloop::{EventKind, ExecutorError, LoopExecutor, TaskError, Work};

use common::{init_tracing, wait_finished, wait_until, EventLog};

#[test]
fn test_cancel_is_observed_cooperatively() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    let observed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&observed);
    let handle = exec
        .submit(
            "demo",
            Work::call(move |ctx| async move {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        flag.store(true, Ordering::SeqCst);
                        Err(TaskError::Canceled)
                    }
                    _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
                }
            })
            .named("watcher"),
        )
        .expect("submit");

    // The unit must be polling before the snapshot is taken.
    assert!(wait_until(Duration::from_secs(2), || exec.task_count() == 1));

    exec.cancel_current_tasks(Duration::from_secs(5))
        .expect("cancellation acknowledged");
    assert!(observed.load(Ordering::SeqCst), "unit observed the token");
    assert!(handle.is_finished());
    assert!(matches!(handle.outcome(), Some(Err(TaskError::Canceled))));
    assert_eq!(exec.task_count(), 0);
    exec.shutdown(true);
}

#[test]
fn test_cancel_drops_a_plain_future_at_its_yield_point() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    // A pre-built future never sees the token; the supervising wrapper drops
    // it at the next suspension point.
    let handle = exec
        .create_task(
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            },
            "demo",
            false,
        )
        .expect("create_task");

    assert!(wait_until(Duration::from_secs(2), || exec.task_count() == 1));
    exec.cancel_current_tasks(Duration::from_secs(5))
        .expect("cancellation acknowledged");
    assert!(matches!(handle.outcome(), Some(Err(TaskError::Canceled))));
    exec.shutdown(true);
}

#[test]
fn test_cancel_with_no_tasks_is_ok() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    exec.cancel_current_tasks(Duration::from_millis(100))
        .expect("nothing to cancel");
    exec.shutdown(true);
}

#[test]
fn test_cancel_before_start_is_not_running() {
    init_tracing();
    let exec = LoopExecutor::new();
    assert!(matches!(
        exec.cancel_current_tasks(Duration::from_millis(100)),
        Err(ExecutorError::NotRunning)
    ));
}

#[test]
fn test_cancel_publishes_request_and_completion_events() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    let mut events = EventLog::new(exec.bus().subscribe());

    exec.submit(
        "demo",
        Work::call(|ctx| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        })
        .named("watcher"),
    )
    .expect("submit");
    assert!(wait_until(Duration::from_secs(2), || exec.task_count() == 1));

    exec.cancel_current_tasks(Duration::from_secs(5))
        .expect("cancellation acknowledged");

    // All three events are already buffered when the call returns; querying
    // one kind must not lose the others.
    let requested = events
        .wait_for(EventKind::CancelRequested, Duration::from_secs(2))
        .expect("CancelRequested event");
    assert_eq!(requested.task.as_deref(), Some("demo:watcher"));
    assert!(events
        .wait_for(EventKind::TaskCanceled, Duration::from_secs(2))
        .is_some());
    assert!(events
        .wait_for(EventKind::CancelCompleted, Duration::from_secs(2))
        .is_some());
    exec.shutdown(true);
}

#[test]
fn test_cancel_times_out_on_a_unit_that_never_yields() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    // A unit that blocks the scheduler thread without yielding gives the
    // supervising wrapper no suspension point to act on; the acknowledgement
    // bound is all that protects the caller.
    let (started_tx, started_rx) = mpsc::sync_channel::<()>(1);
    let handle = exec
        .submit(
            "demo",
            Work::call(move |_ctx| async move {
                let _ = started_tx.send(());
                std::thread::sleep(Duration::from_millis(400));
                Ok(())
            })
            .named("stubborn"),
        )
        .expect("submit");

    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("unit started");

    let res = exec.cancel_current_tasks(Duration::from_millis(100));
    assert!(matches!(
        res,
        Err(ExecutorError::CancellationTimeout { .. })
    ));

    // The unit still finishes on its own; the bound only limits the wait.
    assert!(wait_finished(&handle, Duration::from_secs(2)));
    exec.shutdown(true);
}

#[test]
fn test_units_submitted_after_the_snapshot_are_unaffected() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");

    exec.submit(
        "demo",
        Work::call(|ctx| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        })
        .named("first"),
    )
    .expect("submit");
    assert!(wait_until(Duration::from_secs(2), || exec.task_count() == 1));
    exec.cancel_current_tasks(Duration::from_secs(5))
        .expect("cancellation acknowledged");

    // The executor keeps accepting and running work after a bulk cancel.
    let later = exec
        .submit("demo", Work::blocking(|| Ok(())).named("second"))
        .expect("submit after cancel");
    assert!(wait_finished(&later, Duration::from_secs(2)));
    assert!(matches!(later.outcome(), Some(Ok(()))));
    exec.shutdown(true);
}

#[test]
fn test_finished_units_are_skipped_by_the_snapshot() {
    init_tracing();
    let exec = LoopExecutor::new();
    exec.start().expect("start");
    let mut events = EventLog::new(exec.bus().subscribe());

    let done = exec
        .submit("demo", Work::blocking(|| Ok(())).named("done"))
        .expect("submit");
    assert!(wait_finished(&done, Duration::from_secs(2)));
    assert!(wait_until(Duration::from_secs(2), || exec.task_count() == 0));

    exec.cancel_current_tasks(Duration::from_secs(1))
        .expect("nothing left to cancel");
    let requested = events.wait_for(EventKind::CancelRequested, Duration::from_millis(200));
    assert!(requested.is_none(), "finished units are not re-signalled");
    assert!(!done.is_cancel_requested());
    exec.shutdown(true);
}
