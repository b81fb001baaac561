//! # taskloop
//!
//! **taskloop** is a cross-thread task executor: one cooperative scheduler on
//! one dedicated worker thread, with a thread-safe submission interface so
//! that arbitrary caller threads can hand it futures, async-capable callables,
//! or plain blocking callables, and have them execute on that scheduler with
//! tracked lifecycle, bulk cancellation, and orderly shutdown.
//!
//! ## Architecture
//! ```text
//!  caller thread A   caller thread B    ...                scheduler thread
//!  ┌─────────────┐   ┌─────────────┐            ┌───────────────────────────────┐
//!  │ submit()    │   │ create_task │            │ current-thread runtime        │
//!  │ initialize()│   │ cancel_...()│            │  + LocalSet (cooperative loop)│
//!  └──────┬──────┘   └──────┬──────┘            │                               │
//!         │  Job (wake-and-run channel)         │  control loop: recv → job()  │
//!         └───────────┬─────┴──────────────────►│      │                        │
//!                     │ rendezvous (bounded)    │      ▼                        │
//!                     ◄──────────────────────── │  create unit, register,       │
//!                                               │  spawn_local(supervise)       │
//!  ┌──────────────────────────────┐             │      │ unit finishes          │
//!  │ Registry (mutex, TaskRecord) │◄────────────│      ▼                        │
//!  │  sole tracked hold per unit  │  remove     │  completion handler           │
//!  └──────────────────────────────┘             └───────────────────────────────┘
//!                     │
//!                     ▼
//!          Bus (broadcast diagnostics) ──► external sink
//! ```
//!
//! ## Lifecycle
//! ```text
//! LoopExecutor::new()          uninitialized
//!   start()                    worker thread launched; blocks until the loop
//!                              signals ready (bounded, StartupTimeout)
//!   initialize(f)              one-time setup on the scheduler thread
//!   submit()/create_task()     cross-thread creation rendezvous → TaskHandle
//!   cancel_current_tasks(t)    snapshot → cancel → bounded acknowledgement
//!   shutdown(wait)             flag first → loop stops → drain with errors
//!                              suppressed → thread joined, resources released
//! ```
//!
//! ## Guarantees
//! | Area            | Behavior                                                         |
//! |-----------------|------------------------------------------------------------------|
//! | **Submission**  | Blocks until the unit exists, never until it finishes.           |
//! | **Ownership**   | The registry holds the tracked handle for the unit's lifetime.   |
//! | **Containment** | A misbehaving unit cannot crash the scheduler or stall shutdown. |
//! | **Cancellation**| Cooperative tokens; observed-and-unwound equals finished-first.  |
//! | **Bounds**      | Every caller-facing wait is bounded by [`Config`] or an argument.|
//! | **Ordering**    | None between independent units; acceptance order per caller.     |
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use taskloop::{LoopExecutor, TaskError, Work};
//!
//! fn main() -> Result<(), taskloop::ExecutorError> {
//!     let exec = LoopExecutor::new();
//!     exec.start()?;
//!
//!     let holder = Arc::new(Mutex::new(Vec::new()));
//!     let sink = Arc::clone(&holder);
//!     exec.submit(
//!         "demo",
//!         Work::blocking(move || {
//!             sink.lock().map_err(|_| TaskError::Fail { error: "poisoned".into() })?.push(42);
//!             Ok(())
//!         })
//!         .named("append"),
//!     )?;
//!
//!     exec.shutdown(true);
//!     assert_eq!(*holder.lock().unwrap(), vec![42]);
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{LoopExecutor, TaskExecutor};
pub use error::{ExecutorError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use tasks::{Task, TaskFn, TaskHandle, TaskId, TaskRef, Work, WorkFuture};
