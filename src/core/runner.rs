//! Scheduler thread body.
//!
//! [`run`] is the entry point of the worker thread launched by
//! [`LoopExecutor::start`](crate::LoopExecutor::start). It builds a
//! current-thread tokio runtime and a [`LocalSet`], signals readiness, and
//! then drives the control loop: receive a marshalled [`Job`], run it, repeat.
//! Jobs execute inside the `LocalSet`, so they may `spawn_local` units.
//!
//! ## Stop sequence
//! ```text
//! shutdown(): stop token cancelled (thread-safe wake)
//!     │
//!     ▼
//! control loop breaks → running = false → no new jobs run
//!     │
//!     ▼
//! drain: remaining local units get a final chance to finish, bounded by
//! Config::drain_grace; their errors were already contained per unit
//!     │
//!     ▼
//! runtime dropped → loop-owned resources released → thread exits
//! ```

use std::sync::atomic::Ordering;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

use tokio::runtime;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::LocalSet;

use crate::core::{Job, Shared};
use crate::events::{Event, EventKind};

/// Runs the scheduler loop until stopped, then drains and releases it.
pub(crate) fn run(shared: Arc<Shared>, mut ctl: UnboundedReceiver<Job>, ready: SyncSender<()>) {
    let rt = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        // The ready gate never fires; start() reports the failure as a
        // startup error on the calling thread.
        Err(err) => {
            tracing::error!(error = %err, "failed to build loop runtime");
            return;
        }
    };
    let local = LocalSet::new();
    let stop = shared.stop.clone();

    rt.block_on(local.run_until(async {
        shared.running.store(true, Ordering::SeqCst);
        shared.bus.publish(Event::new(EventKind::LoopStarted));
        tracing::debug!("loop ready");
        let _ = ready.send(());

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                job = ctl.recv() => match job {
                    Some(job) => job(),
                    None => break,
                },
            }
        }
    }));
    shared.running.store(false, Ordering::SeqCst);

    let pending = shared.registry.len();
    if pending > 0 {
        tracing::debug!(pending, "draining remaining tasks");
    }
    let drained = rt.block_on(async { tokio::time::timeout(shared.cfg.drain_grace, local).await });
    match drained {
        Ok(()) => {
            tracing::debug!("loop stopped");
            shared.bus.publish(Event::new(EventKind::LoopStopped));
        }
        Err(_elapsed) => {
            tracing::warn!(
                grace = ?shared.cfg.drain_grace,
                stuck = ?shared.registry.names(),
                "drain grace exceeded; releasing loop with units still pending"
            );
            shared
                .bus
                .publish(Event::new(EventKind::LoopStopped).with_error("drain grace exceeded"));
        }
    }
}
