//! Caller-side executor API.
//!
//! [`LoopExecutor`] owns the scheduler thread and exposes the thread-safe
//! operations callers use: lifecycle (`start` / `initialize` / `shutdown`),
//! submission (`submit` / `create_task`), and bulk cancellation
//! (`cancel_current_tasks`). [`TaskExecutor`] is the object-safe trait form of
//! the same contract.
//!
//! ## Rules
//! - Every blocking wait is bounded; no method blocks forever.
//! - `start()` is idempotent; `shutdown()` is idempotent and monotonic.
//! - A submission blocks only until the unit **exists** on the scheduler
//!   thread, never until it finishes.
//! - Do not call the blocking bridge methods from inside a unit of work: the
//!   scheduler thread cannot service a rendezvous while it is the one waiting
//!   on it.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::Registry;
use crate::core::{bridge, lock, panic_message, runner, Job, Shared};
use crate::error::{ExecutorError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{TaskHandle, Work};

/// Contract for a cross-thread task executor.
///
/// Mirrors the inherent API of [`LoopExecutor`] in object-safe form, so
/// collaborators can depend on the contract rather than the concrete type.
pub trait TaskExecutor: Send + Sync {
    /// Starts the scheduler thread; idempotent.
    fn start(&self) -> Result<(), ExecutorError>;

    /// Runs a one-time setup callable on the scheduler thread, blocking until
    /// it has finished.
    fn initialize(&self, init: Box<dyn FnOnce() + Send + 'static>) -> Result<(), ExecutorError>;

    /// Submits a unit of work in fire-and-forget mode.
    fn submit(&self, submitter_id: &str, work: Work) -> Result<TaskHandle, ExecutorError>;

    /// Schedules an already-classified unit, opting into error propagation.
    fn create_task(
        &self,
        work: Work,
        submitter_id: &str,
        propagate_error: bool,
    ) -> Result<TaskHandle, ExecutorError>;

    /// Cooperatively cancels every in-flight unit, bounded by `timeout`.
    fn cancel_current_tasks(&self, timeout: Duration) -> Result<(), ExecutorError>;

    /// Stops the scheduler; optionally joins the worker thread.
    fn shutdown(&self, wait: bool);
}

/// Cross-thread task executor running one cooperative scheduler on a
/// dedicated worker thread.
///
/// ## Example
/// ```rust
/// use taskloop::{LoopExecutor, TaskError, Work};
///
/// # fn main() -> Result<(), taskloop::ExecutorError> {
/// let exec = LoopExecutor::new();
/// exec.start()?;
///
/// let handle = exec.submit(
///     "demo",
///     Work::call(|_ctx| async { Ok::<_, TaskError>(()) }).named("hello"),
/// )?;
/// assert_eq!(handle.name(), "demo:hello");
///
/// exec.shutdown(true);
/// # Ok(())
/// # }
/// ```
pub struct LoopExecutor {
    shared: Arc<Shared>,
    /// Worker thread handle; owned exclusively by the lifecycle methods.
    /// `None` before `start()` and after `shutdown()`.
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl LoopExecutor {
    /// Creates an executor in the uninitialized state with default bounds.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an executor with explicit bounds.
    pub fn with_config(cfg: Config) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            shared: Arc::new(Shared {
                cfg,
                bus,
                registry: Registry::new(),
                shutdown: AtomicBool::new(false),
                running: AtomicBool::new(false),
                stop: CancellationToken::new(),
                ctl: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Returns the diagnostic event bus.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }

    /// Returns `true` while the scheduler loop is live.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Number of in-flight units.
    pub fn task_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Sorted display names of in-flight units.
    pub fn task_names(&self) -> Vec<String> {
        self.shared.registry.names()
    }

    /// Starts the scheduler thread and blocks until its loop signals
    /// readiness, bounded by [`Config::start_timeout`].
    ///
    /// Calling `start()` on an already-started executor is a no-op; exactly
    /// one worker thread exists.
    pub fn start(&self) -> Result<(), ExecutorError> {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            return Err(ExecutorError::AlreadyShutdown);
        }
        {
            let mut thread_guard = lock(&self.thread);
            if thread_guard.is_some() {
                return Ok(());
            }

            let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(1);
            let (ctl_tx, ctl_rx) = tokio::sync::mpsc::unbounded_channel::<Job>();
            *lock(&self.shared.ctl) = Some(ctl_tx);

            let shared = Arc::clone(&self.shared);
            let join = thread::Builder::new()
                .name("taskloop".to_string())
                .spawn(move || runner::run(shared, ctl_rx, ready_tx))
                .map_err(|err| ExecutorError::ThreadSpawn {
                    error: err.to_string(),
                })?;
            *thread_guard = Some(join);

            drop(thread_guard);
            match ready_rx.recv_timeout(self.shared.cfg.start_timeout) {
                Ok(()) => Ok(()),
                Err(RecvTimeoutError::Timeout) => Err(ExecutorError::StartupTimeout {
                    timeout: self.shared.cfg.start_timeout,
                }),
                Err(RecvTimeoutError::Disconnected) => Err(ExecutorError::LoopClosed),
            }
        }
    }

    /// Runs `init` on the scheduler thread before any task submission,
    /// blocking the caller until it has finished, bounded by
    /// [`Config::start_timeout`].
    ///
    /// A panic inside `init` is caught and reported; the caller is never left
    /// blocked and the executor stays usable.
    pub fn initialize<F>(&self, init: F) -> Result<(), ExecutorError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ensure_accepting()?;

        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        let bus = self.shared.bus.clone();
        self.send_job(Box::new(move || {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(init)) {
                let info = panic_message(payload.as_ref());
                tracing::error!(error = %info, "initializer raised");
                bus.publish(Event::new(EventKind::InitFailed).with_error(info));
            }
            let _ = done_tx.send(());
        }))?;

        match done_rx.recv_timeout(self.shared.cfg.start_timeout) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => Err(ExecutorError::InitializationTimeout {
                timeout: self.shared.cfg.start_timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ExecutorError::LoopClosed),
        }
    }

    /// Submits a unit of work in fire-and-forget mode.
    ///
    /// Blocks only until the unit is created on the scheduler thread, bounded
    /// by [`Config::submit_timeout`]. Failures inside the unit are contained
    /// (`propagate_error = false`).
    pub fn submit(
        &self,
        submitter_id: &str,
        work: impl Into<Work>,
    ) -> Result<TaskHandle, ExecutorError> {
        self.submit_work(submitter_id, work.into(), false)
    }

    /// Schedules an already-constructed future, letting the caller opt into
    /// error propagation through the completion handler's fault path.
    pub fn create_task<Fut>(
        &self,
        future: Fut,
        submitter_id: &str,
        propagate_error: bool,
    ) -> Result<TaskHandle, ExecutorError>
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.submit_work(submitter_id, Work::future(future), propagate_error)
    }

    /// Cooperatively cancels every unit in-flight at call time and waits,
    /// bounded by `timeout`, for all of them to acknowledge.
    ///
    /// Units submitted while this call runs are unaffected. Cancellation is a
    /// best-effort cooperative signal: a unit that never yields is not
    /// interrupted, and the bound expires with
    /// [`ExecutorError::CancellationTimeout`].
    pub fn cancel_current_tasks(&self, timeout: Duration) -> Result<(), ExecutorError> {
        if !self.shared.running.load(Ordering::SeqCst) {
            return Err(ExecutorError::NotRunning);
        }

        let mut pending = Vec::new();
        for handle in self.shared.registry.snapshot() {
            if handle.is_finished() {
                continue;
            }
            handle.cancel();
            tracing::debug!(task = %handle.name(), id = %handle.id(), "cancellation requested");
            self.shared
                .bus
                .publish(Event::new(EventKind::CancelRequested).with_task(handle.name_arc()));
            pending.push(handle);
        }
        if pending.is_empty() {
            return Ok(());
        }

        // Cancellation outcomes are expected here; waiting on the handles
        // swallows them. The wait runs loop-side so acknowledgement means the
        // completion handler has already deregistered the unit.
        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        self.send_job(Box::new(move || {
            tokio::task::spawn_local(async move {
                for handle in &pending {
                    handle.wait().await;
                }
                let _ = done_tx.send(());
            });
        }))?;

        match done_rx.recv_timeout(timeout) {
            Ok(()) => {
                self.shared.bus.publish(Event::new(EventKind::CancelCompleted));
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => Err(ExecutorError::CancellationTimeout { timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(ExecutorError::LoopClosed),
        }
    }

    /// Stops the scheduler: rejects further submissions, signals the loop to
    /// stop, and (if `wait`) joins the worker thread.
    ///
    /// The scheduler drains still-pending units with their errors suppressed
    /// before releasing loop-owned resources. Calling `shutdown()` again is
    /// safe and a no-op beyond re-asserting the flag.
    pub fn shutdown(&self, wait: bool) {
        // Flag first, so racing submissions observe AlreadyShutdown as soon
        // as possible.
        let first = !self.shared.shutdown.swap(true, Ordering::SeqCst);
        if first {
            tracing::debug!("shutdown requested");
            self.shared
                .bus
                .publish(Event::new(EventKind::ShutdownRequested));
        }
        self.shared.stop.cancel();
        *lock(&self.shared.ctl) = None;

        if let Some(join) = lock(&self.thread).take() {
            if wait {
                if join.join().is_err() {
                    tracing::error!("worker thread panicked during shutdown");
                }
            }
            // wait = false: the detached thread still drains on its own.
        }
    }

    /// AlreadyShutdown wins over NotRunning when both apply.
    fn ensure_accepting(&self) -> Result<(), ExecutorError> {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            return Err(ExecutorError::AlreadyShutdown);
        }
        if !self.shared.running.load(Ordering::SeqCst) {
            return Err(ExecutorError::NotRunning);
        }
        Ok(())
    }

    /// Marshals `job` onto the scheduler thread via the wake-and-run channel.
    fn send_job(&self, job: Job) -> Result<(), ExecutorError> {
        let guard = lock(&self.shared.ctl);
        match guard.as_ref() {
            Some(ctl) => ctl.send(job).map_err(|_| ExecutorError::NotRunning),
            None => Err(ExecutorError::NotRunning),
        }
    }

    /// Caller-side half of the submission bridge: rendezvous with the loop.
    fn submit_work(
        &self,
        submitter_id: &str,
        work: Work,
        propagate_error: bool,
    ) -> Result<TaskHandle, ExecutorError> {
        self.ensure_accepting()?;
        let name = work.display_name(submitter_id);

        let (created_tx, created_rx) = mpsc::sync_channel::<Result<TaskHandle, ExecutorError>>(1);
        let shared = Arc::clone(&self.shared);
        let unit_name = name.clone();
        self.send_job(Box::new(move || {
            let _ = created_tx.send(bridge::create_unit(&shared, unit_name, work, propagate_error));
        }))?;

        match created_rx.recv_timeout(self.shared.cfg.submit_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ExecutorError::CreationTimeout {
                task: name,
                timeout: self.shared.cfg.submit_timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ExecutorError::LoopClosed),
        }
    }
}

impl Default for LoopExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoopExecutor {
    fn drop(&mut self) {
        self.shutdown(false);
    }
}

impl TaskExecutor for LoopExecutor {
    fn start(&self) -> Result<(), ExecutorError> {
        LoopExecutor::start(self)
    }

    fn initialize(&self, init: Box<dyn FnOnce() + Send + 'static>) -> Result<(), ExecutorError> {
        LoopExecutor::initialize(self, init)
    }

    fn submit(&self, submitter_id: &str, work: Work) -> Result<TaskHandle, ExecutorError> {
        LoopExecutor::submit(self, submitter_id, work)
    }

    fn create_task(
        &self,
        work: Work,
        submitter_id: &str,
        propagate_error: bool,
    ) -> Result<TaskHandle, ExecutorError> {
        self.submit_work(submitter_id, work, propagate_error)
    }

    fn cancel_current_tasks(&self, timeout: Duration) -> Result<(), ExecutorError> {
        LoopExecutor::cancel_current_tasks(self, timeout)
    }

    fn shutdown(&self, wait: bool) {
        LoopExecutor::shutdown(self, wait)
    }
}
