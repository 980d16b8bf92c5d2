//! Bounded worker pool for document I/O.
//!
//! At most `workers` tasks run at once, and at most `queue_capacity` more
//! wait for a worker. Work submitted beyond that is not queued and not
//! dropped: the returned [`TaskHandle`] runs it on the caller's own task
//! when awaited. The same happens when no tokio runtime is available or the
//! executor has been shut down.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::store::{StoreError, StoreSettings};

/// Handle to submitted work. Resolves to the work's result.
///
/// A worker that panics resolves to [`StoreError::WorkerFailed`].
#[must_use = "work that runs on the caller does nothing until awaited"]
pub struct TaskHandle<T> {
    inner: BoxFuture<'static, Result<T, StoreError>>,
    on_caller: bool,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Work that runs when the handle is awaited.
    pub(crate) fn deferred<F>(work: F) -> Self
    where
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        Self {
            inner: work.boxed(),
            on_caller: true,
        }
    }

    /// An already available value.
    pub(crate) fn ready(value: T) -> Self {
        Self {
            inner: futures::future::ready(Ok(value)).boxed(),
            on_caller: true,
        }
    }

    fn spawned(join: tokio::task::JoinHandle<Result<T, StoreError>>) -> Self {
        let inner = async move {
            match join.await {
                Ok(result) => result,
                Err(e) => Err(StoreError::WorkerFailed { reason: e.to_string() }),
            }
        };
        Self {
            inner: inner.boxed(),
            on_caller: false,
        }
    }

    /// Whether the work runs on the awaiting task instead of a worker.
    pub fn runs_on_caller(&self) -> bool {
        self.on_caller
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, StoreError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

/// Runs store operations off the caller's task, with caller-runs backpressure.
#[derive(Debug, Clone)]
pub struct Executor {
    handle: Option<Handle>,
    workers: Arc<Semaphore>,
    /// Running plus waiting tasks.
    slots: Arc<Semaphore>,
}

impl Executor {
    /// Bind to the current tokio runtime, if there is one.
    pub fn new(settings: &StoreSettings) -> Self {
        let workers = settings.workers.max(1);
        Self {
            handle: Handle::try_current().ok(),
            workers: Arc::new(Semaphore::new(workers)),
            slots: Arc::new(Semaphore::new(workers + settings.queue_capacity)),
        }
    }

    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Tasks that could still be accepted without running on the caller.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn submit<T, F>(&self, op: &'static str, work: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        let Some(handle) = &self.handle else {
            debug!(op, "no runtime, running on caller");
            return TaskHandle::deferred(work);
        };
        let Ok(slot) = self.slots.clone().try_acquire_owned() else {
            debug!(op, "executor saturated, running on caller");
            return TaskHandle::deferred(work);
        };

        let workers = self.workers.clone();
        let join = handle.spawn(async move {
            let _slot = slot;
            let _worker = workers.acquire_owned().await.map_err(|_| StoreError::Closed)?;
            work.await
        });
        TaskHandle::spawned(join)
    }

    /// Stop accepting work. Later submissions run on their callers.
    pub fn close(&self) {
        self.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }
}
