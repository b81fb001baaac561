//! Error types used by the executor and by submitted units of work.
//!
//! This module defines two main error enums:
//!
//! - [`ExecutorError`] — errors raised by the executor's own bookkeeping
//!   (lifecycle, submission rendezvous, bulk cancellation).
//! - [`TaskError`] — outcomes of individual units of work.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. [`TaskError::is_benign`] classifies outcomes the
//! completion handler must not escalate.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the executor itself.
///
/// These are always surfaced synchronously to the calling thread; they never
/// originate inside a submitted unit of work.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The scheduler thread did not signal readiness within the startup bound.
    #[error("loop did not become ready within {timeout:?}")]
    StartupTimeout {
        /// The configured startup bound.
        timeout: Duration,
    },

    /// The initializer did not finish on the scheduler thread within the bound.
    #[error("initializer did not finish within {timeout:?}")]
    InitializationTimeout {
        /// The configured initialization bound.
        timeout: Duration,
    },

    /// The creation rendezvous for a submitted unit did not complete in time.
    #[error("creation of task {task:?} did not complete within {timeout:?}")]
    CreationTimeout {
        /// Display name of the unit being created.
        task: String,
        /// The configured creation bound.
        timeout: Duration,
    },

    /// Constructing the unit on the scheduler thread failed (e.g. the
    /// submitted factory panicked).
    #[error("creation of task {task:?} failed: {reason}")]
    CreationFailed {
        /// Display name of the unit being created.
        task: String,
        /// Human-readable creation failure.
        reason: String,
    },

    /// Bulk cancellation did not complete within the caller's bound.
    #[error("cancellation did not complete within {timeout:?}")]
    CancellationTimeout {
        /// The caller-supplied bound.
        timeout: Duration,
    },

    /// A scheduling or cancellation operation was attempted before `start()`
    /// completed or after the loop stopped.
    #[error("loop must be started before any work can be submitted")]
    NotRunning,

    /// A scheduling operation was attempted after `shutdown()` was requested.
    #[error("cannot schedule new work after shutdown")]
    AlreadyShutdown,

    /// The scheduler loop exited before the marshalled operation completed.
    #[error("loop closed before the operation completed")]
    LoopClosed,

    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn worker thread: {error}")]
    ThreadSpawn {
        /// The underlying I/O error message.
        error: String,
    },
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloop::ExecutorError;
    ///
    /// assert_eq!(ExecutorError::NotRunning.as_label(), "executor_not_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::StartupTimeout { .. } => "executor_startup_timeout",
            ExecutorError::InitializationTimeout { .. } => "executor_init_timeout",
            ExecutorError::CreationTimeout { .. } => "executor_creation_timeout",
            ExecutorError::CreationFailed { .. } => "executor_creation_failed",
            ExecutorError::CancellationTimeout { .. } => "executor_cancel_timeout",
            ExecutorError::NotRunning => "executor_not_running",
            ExecutorError::AlreadyShutdown => "executor_already_shutdown",
            ExecutorError::LoopClosed => "executor_loop_closed",
            ExecutorError::ThreadSpawn { .. } => "executor_thread_spawn",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Outcomes of a unit of work.
///
/// Units report completion through `Result<(), TaskError>`. Some variants are
/// benign (expected terminations the completion handler only logs), others are
/// genuine failures that may be escalated when the unit was created with
/// `propagate_error = true`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// The unit exceeded its configured bounded wait.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Non-recoverable failure (includes panics caught inside the unit).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Ordinary execution failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The unit signalled it has no more work to do.
    #[error("no more work")]
    Exhausted,

    /// The unit was cooperatively cancelled.
    #[error("cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloop::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Exhausted => "task_exhausted",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the outcome.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Exhausted => "no more work".to_string(),
            TaskError::Canceled => "cancelled".to_string(),
        }
    }

    /// Indicates whether the outcome is an expected termination.
    ///
    /// Benign outcomes (cancellation, the no-more-work sentinel, a bounded
    /// wait that expired) are logged by the completion handler but never
    /// escalated, regardless of `propagate_error`.
    ///
    /// # Example
    /// ```
    /// use taskloop::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_benign());
    /// assert!(!TaskError::Fail { error: "boom".into() }.is_benign());
    /// ```
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            TaskError::Canceled | TaskError::Exhausted | TaskError::Timeout { .. }
        )
    }
}
