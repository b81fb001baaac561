//! Loop-side half of the submission bridge.
//!
//! [`create_unit`] runs **on the scheduler thread**, inside a marshalled job.
//! It turns a classified [`Work`] value into a scheduled, registered,
//! supervised unit and hands the resulting [`TaskHandle`] back through the
//! caller's rendezvous.
//!
//! ## Rules
//! - Registration happens before the unit is spawned, so the completion
//!   handler always finds the record (the scheduler is single-threaded, so
//!   nothing can observe the unit between insert and spawn).
//! - Each shape maps to one fixed scheduling strategy; no runtime probing.
//! - A panicking factory is caught and forwarded to the caller as
//!   [`ExecutorError::CreationFailed`]; nothing is registered in that case.
//! - The supervising wrapper contains every unit error, including panics, and
//!   always ends in [`completion::finish_unit`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::{completion, panic_message, Shared};
use crate::core::registry::TaskRecord;
use crate::error::{ExecutorError, TaskError};
use crate::events::{Event, EventKind};
use crate::tasks::work::Shape;
use crate::tasks::{TaskHandle, TaskId, Work, WorkFuture};

/// Creates, registers, and spawns one unit of work. Scheduler thread only.
pub(crate) fn create_unit(
    shared: &Arc<Shared>,
    name: String,
    work: Work,
    propagate_error: bool,
) -> Result<TaskHandle, ExecutorError> {
    let id = TaskId(shared.next_id.fetch_add(1, Ordering::Relaxed));
    let cancel = CancellationToken::new();
    let name: Arc<str> = Arc::from(name);
    let timeout = work.timeout;

    let fut: WorkFuture = match work.shape {
        Shape::Future(fut) => fut,
        Shape::Factory(factory) => {
            let token = cancel.clone();
            match catch_unwind(AssertUnwindSafe(move || factory(token))) {
                Ok(fut) => fut,
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    tracing::warn!(task = %name, error = %reason, "unit factory panicked");
                    return Err(ExecutorError::CreationFailed {
                        task: name.to_string(),
                        reason,
                    });
                }
            }
        }
        Shape::Blocking(f) => {
            let join = tokio::task::spawn_blocking(f);
            Box::pin(async move {
                match join.await {
                    Ok(result) => result,
                    Err(err) => Err(TaskError::Fatal {
                        error: format!("blocking unit aborted: {err}"),
                    }),
                }
            })
        }
    };

    let handle = TaskHandle::new(id, Arc::clone(&name), cancel.clone());
    shared.registry.insert(TaskRecord {
        handle: handle.clone(),
        propagate_error,
    });

    let loop_shared = Arc::clone(shared);
    let unit_handle = handle.clone();
    tokio::task::spawn_local(async move {
        let outcome = run_unit(fut, &cancel, timeout).await;
        completion::finish_unit(&loop_shared, &unit_handle, outcome);
    });

    tracing::debug!(task = %name, id = %id, "created task");
    shared
        .bus
        .publish(Event::new(EventKind::TaskCreated).with_task(name));
    Ok(handle)
}

/// Runs one unit to completion, containing panics and applying the optional
/// bounded wait and cooperative cancellation.
///
/// Cancellation races the unit: once the token fires, the unit is released at
/// its next suspension point. A unit that returns
/// [`TaskError::Canceled`] on its own is classified identically.
async fn run_unit(
    fut: WorkFuture,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<(), TaskError> {
    let body = async move {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(TaskError::Fatal {
                error: panic_message(payload.as_ref()),
            }),
        }
    };

    let bounded = async move {
        match timeout.filter(|d| *d > Duration::ZERO) {
            Some(dur) => match tokio::time::timeout(dur, body).await {
                Ok(result) => result,
                Err(_elapsed) => Err(TaskError::Timeout { timeout: dur }),
            },
            None => body.await,
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(TaskError::Canceled),
        result = bounded => result,
    }
}
