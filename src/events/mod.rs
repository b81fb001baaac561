//! Executor events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to diagnostic events emitted by the executor: the loop
//! runner, the submission bridge, the completion handler, and the cancellation
//! orchestrator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! The executor does not persist or format events itself; an external sink
//! subscribes via [`Bus::subscribe`] and decides what to do with them.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
