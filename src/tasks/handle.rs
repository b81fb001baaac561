//! Tracked handle for an accepted unit of work.
//!
//! A [`TaskHandle`] is returned by the submission bridge once the unit exists
//! on the scheduler thread. It is the caller's view of the unit: request
//! cooperative cancellation, poll completion, or await it.
//!
//! ## Rules
//! - The handle does **not** own the unit's execution; dropping every clone of
//!   a handle has no effect on the unit (the registry keeps it tracked until
//!   completion).
//! - [`TaskHandle::cancel`] is a cooperative signal, not a preemptive
//!   interrupt: a unit that never yields will not observe it.
//! - The outcome is recorded exactly once, by the completion handler, on the
//!   scheduler thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Identity of an accepted unit, stable for the unit's lifetime.
///
/// Ids are assigned from a per-executor monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion state shared between the handle's clones and the completion
/// handler.
struct HandleState {
    done: AtomicBool,
    notify: Notify,
    outcome: Mutex<Option<Result<(), TaskError>>>,
}

/// Caller-side handle for a tracked unit of work.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    name: Arc<str>,
    cancel: CancellationToken,
    state: Arc<HandleState>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: Arc<str>, cancel: CancellationToken) -> Self {
        Self {
            id,
            name,
            cancel,
            state: Arc::new(HandleState {
                done: AtomicBool::new(false),
                notify: Notify::new(),
                outcome: Mutex::new(None),
            }),
        }
    }

    /// Returns the unit's identity.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the unit's display name (`submitter:label`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Requests cooperative cancellation of this unit.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once the unit has finished for any reason.
    pub fn is_finished(&self) -> bool {
        self.state.done.load(Ordering::Acquire)
    }

    /// Returns the recorded outcome, if the unit has finished.
    pub fn outcome(&self) -> Option<Result<(), TaskError>> {
        match self.state.outcome.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Waits until the unit has finished.
    ///
    /// Completion order between independently submitted units is unspecified;
    /// bound this wait with [`tokio::time::timeout`] when needed.
    pub async fn wait(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_finished() {
                return;
            }
            notified.await;
        }
    }

    /// Records the outcome and wakes all waiters. Called exactly once by the
    /// completion handler.
    pub(crate) fn finish(&self, outcome: Result<(), TaskError>) {
        match self.state.outcome.lock() {
            Ok(mut guard) => *guard = Some(outcome),
            Err(poisoned) => *poisoned.into_inner() = Some(outcome),
        }
        self.state.done.store(true, Ordering::Release);
        self.state.notify.notify_waiters();
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u64) -> TaskHandle {
        TaskHandle::new(TaskId(id), Arc::from("t:unit"), CancellationToken::new())
    }

    #[test]
    fn test_handle_starts_unfinished() {
        let h = handle(1);
        assert!(!h.is_finished());
        assert!(h.outcome().is_none());
        assert!(!h.is_cancel_requested());
    }

    #[test]
    fn test_finish_records_outcome_once() {
        let h = handle(2);
        h.finish(Err(TaskError::Canceled));
        assert!(h.is_finished());
        assert!(matches!(h.outcome(), Some(Err(TaskError::Canceled))));
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let h = handle(3);
        let c = h.clone();
        h.cancel();
        assert!(c.is_cancel_requested());
    }
}
