//! Task registry — mutex-guarded table of in-flight units.
//!
//! The registry is the one piece of mutable state touched from multiple
//! threads directly. It maps a unit's [`TaskId`] to its [`TaskRecord`] from
//! acceptance until the completion handler deregisters it.
//!
//! ## Rules
//! - A task id is present if and only if its unit has been accepted and has
//!   not yet completed.
//! - The registry holds the tracked handle for the unit's entire lifetime;
//!   completion handling is the only place records are removed.
//! - The mutex is held only for insert/lookup/remove/snapshot, never across a
//!   wait; there is no nested locking.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::lock;
use crate::tasks::{TaskHandle, TaskId};

/// Record kept for every accepted unit of work.
pub(crate) struct TaskRecord {
    /// Tracked handle; the registry's strong hold on the unit.
    pub(crate) handle: TaskHandle,
    /// Whether a genuine failure should be escalated through the fault path.
    pub(crate) propagate_error: bool,
}

/// Mapping from task identity to record.
pub(crate) struct Registry {
    tasks: Mutex<HashMap<TaskId, TaskRecord>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Registers an accepted unit.
    pub(crate) fn insert(&self, record: TaskRecord) {
        lock(&self.tasks).insert(record.handle.id(), record);
    }

    /// Deregisters a unit; returns its record if it was still present.
    pub(crate) fn remove(&self, id: TaskId) -> Option<TaskRecord> {
        lock(&self.tasks).remove(&id)
    }

    /// Point-in-time copy of every tracked handle.
    ///
    /// Units submitted after the snapshot is taken are unaffected by whatever
    /// the caller does with it.
    pub(crate) fn snapshot(&self) -> Vec<TaskHandle> {
        lock(&self.tasks)
            .values()
            .map(|record| record.handle.clone())
            .collect()
    }

    /// Number of in-flight units.
    pub(crate) fn len(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Sorted display names of in-flight units.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.tasks)
            .values()
            .map(|record| record.handle.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn record(id: u64, name: &str) -> TaskRecord {
        TaskRecord {
            handle: TaskHandle::new(TaskId(id), Arc::from(name), CancellationToken::new()),
            propagate_error: false,
        }
    }

    #[test]
    fn test_insert_remove_roundtrip() {
        let reg = Registry::new();
        reg.insert(record(1, "a:x"));
        assert_eq!(reg.len(), 1);
        let rec = reg.remove(TaskId(1)).expect("record should be present");
        assert_eq!(rec.handle.name(), "a:x");
        assert_eq!(reg.len(), 0);
        assert!(reg.remove(TaskId(1)).is_none());
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let reg = Registry::new();
        reg.insert(record(1, "a:x"));
        let snap = reg.snapshot();
        reg.insert(record(2, "a:y"));
        assert_eq!(snap.len(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_names_are_sorted() {
        let reg = Registry::new();
        reg.insert(record(1, "b"));
        reg.insert(record(2, "a"));
        assert_eq!(reg.names(), vec!["a".to_string(), "b".to_string()]);
    }
}
