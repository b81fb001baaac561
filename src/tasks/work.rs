//! Classification of submitted values.
//!
//! [`Work`] is the tagged-variant form of "what was submitted": the shape is
//! decided once, at construction time, and each shape maps to one fixed
//! scheduling strategy on the loop:
//!
//! ```text
//! Work::future(fut)    → scheduled directly; cancellation is applied by the
//!                        supervising wrapper at the future's next yield point
//! Work::call(f)        → f(token) is invoked on the scheduler thread to
//!                        produce the future, which is then scheduled
//! Work::blocking(f)    → f runs on the blocking pool; a loop-owned unit
//!                        supervises it, so the tracked handle stays loop-owned
//! From<TaskRef>        → task.run(token), same strategy as Work::call
//! ```
//!
//! Every `Work` carries a best-effort label for diagnostics, defaulting to the
//! submitted value's type name and overridable with [`Work::named`].

use std::any::type_name;
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::TaskRef;

/// Boxed future produced by a unit of work.
pub type WorkFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Closure that produces the unit's future on the scheduler thread.
type WorkFactory = Box<dyn FnOnce(CancellationToken) -> WorkFuture + Send + 'static>;

/// Plain blocking callable, offloaded to the blocking pool.
type BlockingFn = Box<dyn FnOnce() -> Result<(), TaskError> + Send + 'static>;

pub(crate) enum Shape {
    /// Already-constructed unit of asynchronous work.
    Future(WorkFuture),
    /// Async-capable callable; invoked on the scheduler thread.
    Factory(WorkFactory),
    /// Plain blocking callable; supervised by a loop-owned unit.
    Blocking(BlockingFn),
}

/// A submitted value, classified once at construction time.
pub struct Work {
    pub(crate) shape: Shape,
    label: Cow<'static, str>,
    pub(crate) timeout: Option<Duration>,
}

impl Work {
    /// Wraps an already-constructed future.
    ///
    /// The future is scheduled as-is; cooperative cancellation is applied by
    /// the executor's supervising wrapper, which drops the future at its next
    /// suspension point once cancellation is requested.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            label: Cow::Borrowed(type_name::<Fut>()),
            shape: Shape::Future(Box::pin(fut)),
            timeout: None,
        }
    }

    /// Wraps an async-capable callable.
    ///
    /// `f` is invoked **on the scheduler thread** with the unit's own
    /// [`CancellationToken`], so the unit can observe cancellation at the
    /// suspension points of its choosing.
    pub fn call<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            label: Cow::Borrowed(type_name::<F>()),
            shape: Shape::Factory(Box::new(move |ctx| Box::pin(f(ctx)))),
            timeout: None,
        }
    }

    /// Wraps a plain blocking callable.
    ///
    /// The callable runs on a blocking-capable thread while a loop-owned unit
    /// supervises it; the caller's tracked handle is always loop-owned.
    /// Cooperative cancellation releases the supervising unit, but cannot
    /// interrupt the callable itself once it is running.
    pub fn blocking<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        Self {
            label: Cow::Borrowed(type_name::<F>()),
            shape: Shape::Blocking(Box::new(f)),
            timeout: None,
        }
    }

    /// Overrides the diagnostic label.
    pub fn named(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Bounds the unit's execution; expiry is reported as the benign
    /// [`TaskError::Timeout`] outcome.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Builds the human-readable task name used for tracking and diagnostics.
    pub(crate) fn display_name(&self, submitter_id: &str) -> String {
        if submitter_id.is_empty() {
            self.label.to_string()
        } else {
            format!("{submitter_id}:{}", self.label)
        }
    }
}

impl From<TaskRef> for Work {
    fn from(task: TaskRef) -> Self {
        let label = Cow::Owned(task.name().to_string());
        Self {
            label,
            shape: Shape::Factory(Box::new(move |ctx| {
                Box::pin(async move { task.run(ctx).await })
            })),
            timeout: None,
        }
    }
}
