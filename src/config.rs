//! Executor configuration.
//!
//! [`Config`] bounds every blocking wait the executor exposes to callers and
//! sizes the diagnostic bus. All waits are explicit: no operation on the
//! executor blocks forever.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskloop::Config;
//!
//! let mut cfg = Config::default();
//! cfg.start_timeout = Duration::from_secs(10);
//! cfg.drain_grace = Duration::from_secs(5);
//!
//! assert_eq!(cfg.submit_timeout, Duration::from_secs(5));
//! ```

use std::time::Duration;

/// Bounds and capacities for a [`LoopExecutor`](crate::LoopExecutor).
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for the scheduler thread to signal readiness.
    ///
    /// Also bounds [`initialize`](crate::LoopExecutor::initialize).
    pub start_timeout: Duration,
    /// Maximum time a submission waits for its creation rendezvous.
    pub submit_timeout: Duration,
    /// Maximum time the scheduler thread spends draining still-pending units
    /// after the loop has been told to stop.
    pub drain_grace: Duration,
    /// Capacity of the diagnostic event bus.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `start_timeout = 5s`
    /// - `submit_timeout = 5s`
    /// - `drain_grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(5),
            submit_timeout: Duration::from_secs(5),
            drain_grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}
