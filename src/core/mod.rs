//! Executor core: lifecycle, cross-thread bridge, and completion handling.
//!
//! This module contains the embedded implementation of the executor runtime.
//! The public API from this module is [`LoopExecutor`] and the [`TaskExecutor`]
//! trait; everything else is internal.
//!
//! Internal modules:
//! - [`runner`]: the scheduler thread's body (current-thread runtime,
//!   `LocalSet`, control loop, drain);
//! - [`bridge`]: loop-side half of the submission bridge (unit creation and
//!   the supervising wrapper);
//! - [`completion`]: outcome classification and deregistration;
//! - [`registry`]: mutex-guarded table of in-flight units;
//! - [`executor`]: the caller-side API.
//!
//! ## System wiring
//! ```text
//! caller threads                         scheduler thread ("taskloop")
//! ──────────────                         ─────────────────────────────
//! LoopExecutor::submit ──┐               current-thread runtime + LocalSet
//! LoopExecutor::create_task ─► Job ─────► control loop: recv Job → job()
//! LoopExecutor::initialize ──┘  (mpsc)         │
//!         │ blocks on rendezvous              ▼
//!         ◄────────────────────── bridge::create_unit
//!                                        ├─ Registry.insert(TaskRecord)
//!                                        ├─ spawn_local(supervise(unit))
//!                                        └─ rendezvous ◄ TaskHandle
//!                                              │ unit finishes
//!                                              ▼
//!                                        completion::finish_unit
//!                                        ├─ classify outcome
//!                                        ├─ Registry.remove(id)
//!                                        └─ TaskHandle::finish
//! ```

pub(crate) mod bridge;
pub(crate) mod completion;
mod executor;
pub(crate) mod registry;
pub(crate) mod runner;

pub use executor::{LoopExecutor, TaskExecutor};

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::Bus;
use registry::Registry;

/// Closure marshalled onto the scheduler thread by the wake-and-run primitive.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the caller-side API and the scheduler thread.
///
/// Constructed once per executor instance; there is no process-wide state.
pub(crate) struct Shared {
    pub(crate) cfg: Config,
    pub(crate) bus: Bus,
    pub(crate) registry: Registry,
    /// Monotonic: flips false→true once, never back.
    pub(crate) shutdown: AtomicBool,
    /// True while the control loop is accepting marshalled work.
    pub(crate) running: AtomicBool,
    /// Stops the control loop; cancelling it is itself thread-safe.
    pub(crate) stop: CancellationToken,
    /// Sender half of the wake-and-run channel; `None` before `start()` and
    /// after `shutdown()`.
    pub(crate) ctl: Mutex<Option<UnboundedSender<Job>>>,
    /// Source of task identities.
    pub(crate) next_id: AtomicU64,
}

/// Locks a mutex, recovering the guard if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
