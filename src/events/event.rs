//! Diagnostic events emitted by the executor.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Loop events**: scheduler thread lifecycle (started, stopped).
//! - **Task events**: per-unit lifecycle (created, completed, cancelled,
//!   timed out, failed, faulted).
//! - **Control events**: bulk cancellation and shutdown phases.
//!
//! The [`Event`] struct carries metadata such as timestamps, the task's
//! display name, and error text.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskloop::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("profiler:refresh")
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("profiler:refresh"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of executor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Loop events ===
    /// The scheduler loop is live and accepting marshalled work.
    ///
    /// Sets: `at`, `seq`.
    LoopStarted,

    /// The scheduler loop stopped and finished draining.
    ///
    /// Sets:
    /// - `error`: set when the drain grace was exceeded
    /// - `at`, `seq`
    LoopStopped,

    // === Task events ===
    /// A unit of work was created on the scheduler thread and registered.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskCreated,

    /// A unit finished successfully (or raised the no-more-work sentinel).
    ///
    /// Sets:
    /// - `task`: display name
    /// - `error`: sentinel text, when present
    /// - `at`, `seq`
    TaskCompleted,

    /// A unit was cooperatively cancelled.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskCanceled,

    /// A unit exceeded its configured bounded wait.
    ///
    /// Sets: `task`, `error`, `at`, `seq`.
    TaskTimedOut,

    /// A unit failed and the failure was contained (logged, not escalated).
    ///
    /// Sets: `task`, `error`, `at`, `seq`.
    TaskFailed,

    /// A unit created with `propagate_error = true` failed; this is the
    /// completion handler's fault path.
    ///
    /// Sets: `task`, `error`, `at`, `seq`.
    TaskFaulted,

    // === Control events ===
    /// Cooperative cancellation was requested for a unit.
    ///
    /// Sets: `task`, `at`, `seq`.
    CancelRequested,

    /// Every unit in a bulk-cancellation snapshot acknowledged.
    ///
    /// Sets: `at`, `seq`.
    CancelCompleted,

    /// The initializer raised on the scheduler thread (contained).
    ///
    /// Sets: `error`, `at`, `seq`.
    InitFailed,

    /// Shutdown was requested; further submissions are rejected.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,
}

/// Executor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Display name of the unit, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable error or reason text.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            error: None,
        }
    }

    /// Attaches a task display name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches error or reason text.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let a = Event::new(EventKind::TaskCreated);
        let b = Event::new(EventKind::TaskCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_attach_metadata() {
        let ev = Event::new(EventKind::TaskTimedOut)
            .with_task("w:tick")
            .with_error("timeout: 5s");
        assert_eq!(ev.task.as_deref(), Some("w:tick"));
        assert_eq!(ev.error.as_deref(), Some("timeout: 5s"));
    }
}
