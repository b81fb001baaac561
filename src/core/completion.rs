//! Completion handling: outcome classification and deregistration.
//!
//! [`finish_unit`] is the tail of every supervised unit. It runs on the
//! scheduler thread, exactly once per unit, whatever the reason the unit
//! finished.
//!
//! ## Classification
//! ```text
//! Ok(())              → completed                    → TaskCompleted
//! Err(Canceled)       → benign (expected)            → TaskCanceled
//! Err(Exhausted)      → benign (no-more-work)        → TaskCompleted
//! Err(Timeout)        → benign (bounded wait)        → TaskTimedOut
//! Err(Fail | Fatal)   → propagate_error = true       → TaskFaulted (fault path)
//!                     → propagate_error = false      → TaskFailed  (contained)
//! ```
//!
//! ## Rules
//! - Deregistration happens on every exit path, before classification, so an
//!   escalated failure can never leak a registry record.
//! - A missing record is an inconsistency worth logging, not a fatal error;
//!   the outcome is still recorded on the handle so waiters are released.

use crate::core::Shared;
use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::tasks::TaskHandle;

/// Classifies a finished unit's outcome, deregisters it, and records the
/// outcome on the handle.
pub(crate) fn finish_unit(shared: &Shared, handle: &TaskHandle, outcome: Result<(), TaskError>) {
    let id = handle.id();
    let Some(record) = shared.registry.remove(id) else {
        tracing::warn!(task = %handle.name(), id = %id, "finished unit missing from registry");
        handle.finish(outcome);
        return;
    };
    let name = record.handle.name_arc();

    match &outcome {
        Ok(()) => {
            tracing::debug!(task = %name, id = %id, "task completed");
            shared
                .bus
                .publish(Event::new(EventKind::TaskCompleted).with_task(name));
        }
        Err(TaskError::Canceled) => {
            tracing::debug!(task = %name, id = %id, "task cancelled");
            shared
                .bus
                .publish(Event::new(EventKind::TaskCanceled).with_task(name));
        }
        Err(err @ TaskError::Exhausted) => {
            tracing::debug!(task = %name, id = %id, "task exhausted");
            shared.bus.publish(
                Event::new(EventKind::TaskCompleted)
                    .with_task(name)
                    .with_error(err.as_message()),
            );
        }
        Err(err @ TaskError::Timeout { .. }) => {
            tracing::warn!(task = %name, id = %id, error = %err, "task timed out");
            shared.bus.publish(
                Event::new(EventKind::TaskTimedOut)
                    .with_task(name)
                    .with_error(err.as_message()),
            );
        }
        Err(err) if record.propagate_error => {
            tracing::error!(task = %name, id = %id, error = %err, "task faulted");
            shared.bus.publish(
                Event::new(EventKind::TaskFaulted)
                    .with_task(name)
                    .with_error(err.as_message()),
            );
        }
        Err(err) => {
            tracing::warn!(task = %name, id = %id, error = %err, "task failed (contained)");
            shared.bus.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(name)
                    .with_error(err.as_message()),
            );
        }
    }

    record.handle.finish(outcome);
}
