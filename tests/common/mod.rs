#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Once;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use taskloop::{Event, EventKind, TaskHandle};

static INIT: Once = Once::new();

/// Installs a tracing subscriber once per test binary (`RUST_LOG` controls it).
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Polls `handle` until it finishes or `bound` elapses.
pub fn wait_finished(handle: &TaskHandle, bound: Duration) -> bool {
    wait_until(bound, || handle.is_finished())
}

/// Polls `pred` until it holds or `bound` elapses.
pub fn wait_until(bound: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + bound;
    loop {
        if pred() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Subscriber-side view of the bus that retains received-but-unmatched events,
/// so querying one kind never discards another that arrived in the same batch.
pub struct EventLog {
    rx: broadcast::Receiver<Event>,
    pending: VecDeque<Event>,
}

impl EventLog {
    pub fn new(rx: broadcast::Receiver<Event>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
        }
    }

    /// Returns the oldest event of `kind`, waiting up to `bound` for one to
    /// arrive. Events of other kinds stay queued for later queries.
    pub fn wait_for(&mut self, kind: EventKind, bound: Duration) -> Option<Event> {
        let deadline = Instant::now() + bound;
        loop {
            if let Some(pos) = self.pending.iter().position(|ev| ev.kind == kind) {
                return self.pending.remove(pos);
            }
            match self.rx.try_recv() {
                Ok(ev) => self.pending.push_back(ev),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(broadcast::error::TryRecvError::Closed) => return None,
                Err(broadcast::error::TryRecvError::Empty) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }
}
