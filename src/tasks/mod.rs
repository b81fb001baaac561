//! # Task abstractions: submittable shapes and tracked handles.
//!
//! This module provides the caller-facing task types:
//! - [`Work`] — tagged classification of a submitted value (pre-built future,
//!   async-capable callable, or plain blocking callable)
//! - [`Task`] — trait for reusable async cancelable tasks
//! - [`TaskFn`] — function-based task implementation
//! - [`TaskRef`] — shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskHandle`], [`TaskId`] — tracked handle for an accepted unit

mod handle;
mod task;
pub(crate) mod work;

pub use handle::{TaskHandle, TaskId};
pub use task::{Task, TaskFn, TaskRef};
pub use work::{Work, WorkFuture};
