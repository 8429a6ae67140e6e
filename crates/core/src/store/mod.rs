//! Single-writer reactive store.
//!
//! A [`Store`] drives one [`ScreenModel`]. It owns a [`StateContainer`] holding the current
//! snapshot, a bounded queue of pending events, and one worker task that drains the queue:
//!
//! ```text
//! dispatch(event) -> queue -> worker -> ScreenModel::handle -> StateContainer::replace
//!                                                                  |
//!                                          Subscription::next <----+
//! ```
//!
//! The worker is the only writer. It first seeds the container from the model, then applies
//! events one at a time in the order they were enqueued. Events dispatched before seeding
//! finishes simply wait in the queue.
//!
//! Disposing the store (explicitly or by dropping it) aborts the worker, including any
//! handler that is still awaiting I/O, and ends every subscription. If an interim
//! [`ScreenModel::pending`] snapshot was on display, the snapshot from before it is restored.
//! Dispatching afterwards does nothing.

mod container;
mod publisher;

pub use container::{Lifecycle, StateContainer};
pub use publisher::Subscription;

use crate::config::CoreConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// The behaviour behind one screen: how its first snapshot is built and how events change it.
///
/// Implementations fold every collaborator failure into the snapshot they return; nothing
/// here can fail.
#[async_trait]
pub trait ScreenModel: Send + Sync + 'static {
    type Snapshot: PartialEq + Send + Sync + 'static;
    type Event: std::fmt::Debug + Send + 'static;

    /// Used as a field in log events.
    const NAME: &'static str;

    /// Published before seeding completes.
    fn initial(&self) -> Self::Snapshot;

    /// Builds the first real snapshot. Called exactly once, before any event.
    async fn seed(&self, placeholder: &Self::Snapshot) -> Self::Snapshot;

    /// Snapshot to publish while `event` is being handled, e.g. with a loading flag set.
    ///
    /// `handle` still receives the snapshot from before this one.
    fn pending(&self, _current: &Self::Snapshot, _event: &Self::Event) -> Option<Self::Snapshot> {
        None
    }

    /// Produces the snapshot that follows `current` once `event` is applied.
    async fn handle(&self, current: &Self::Snapshot, event: Self::Event) -> Self::Snapshot;
}

#[derive(Debug)]
enum Job<E> {
    Event(E),
    Barrier(oneshot::Sender<()>),
}

/// A running store for one screen instance.
pub struct Store<M: ScreenModel> {
    container: Arc<StateContainer<M::Snapshot>>,
    jobs: mpsc::Sender<Job<M::Event>>,
    worker: JoinHandle<()>,
}

impl<M: ScreenModel> Store<M> {
    /// Starts a store and its worker task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `queue_capacity` is zero. Outside the crate, stores are built through
    /// [`Store::with_config`], whose [`CoreConfig`] never holds such a value.
    pub(crate) fn new(model: M, queue_capacity: usize) -> Self {
        let container = Arc::new(StateContainer::new(model.initial()));
        let (jobs, rx) = mpsc::channel(queue_capacity);
        let worker = tokio::spawn(run_worker(Arc::new(model), container.clone(), rx));

        Self {
            container,
            jobs,
            worker,
        }
    }

    /// Starts a store and its worker task, with the queue capacity from `cfg`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_config(model: M, cfg: &CoreConfig) -> Self {
        Self::new(model, cfg.dispatch_queue_capacity())
    }

    pub fn current(&self) -> Arc<M::Snapshot> {
        self.container.current()
    }

    pub fn subscribe(&self) -> Subscription<M::Snapshot> {
        self.container.subscribe()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.container.lifecycle()
    }

    /// Enqueues `event`. Suspends only while the queue is full.
    ///
    /// Events are applied in the order they were enqueued. After disposal this is a no-op.
    pub async fn dispatch(&self, event: M::Event) {
        if self.lifecycle() == Lifecycle::Disposed {
            tracing::debug!(screen = M::NAME, ?event, "ignoring event for disposed store");
            return;
        }

        if let Err(mpsc::error::SendError(job)) = self.jobs.send(Job::Event(event)).await {
            tracing::debug!(screen = M::NAME, ?job, "store worker has stopped; event dropped");
        }
    }

    /// Waits until everything dispatched before this call has been applied.
    ///
    /// Returns immediately once the store is disposed.
    pub async fn flush(&self) {
        if self.lifecycle() == Lifecycle::Disposed {
            return;
        }

        let (ack, done) = oneshot::channel();
        if self.jobs.send(Job::Barrier(ack)).await.is_err() {
            return;
        }
        let _ = done.await;
    }

    /// Tears the store down: aborts the worker and any in-flight handler, then closes every
    /// subscription. [`Store::current`] keeps returning the last settled snapshot.
    pub fn dispose(&self) {
        if !self.container.mark_disposed() {
            return;
        }
        tracing::debug!(screen = M::NAME, "disposing store");
        self.worker.abort();
    }
}

impl<M: ScreenModel> Drop for Store<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_worker<M: ScreenModel>(
    model: Arc<M>,
    container: Arc<StateContainer<M::Snapshot>>,
    mut jobs: mpsc::Receiver<Job<M::Event>>,
) {
    let placeholder = container.current();
    let seeded = model.seed(&placeholder).await;
    container.replace(seeded);
    if container.mark_ready() {
        tracing::debug!(screen = M::NAME, "store ready");
    }

    while let Some(job) = jobs.recv().await {
        match job {
            Job::Event(event) => {
                tracing::debug!(screen = M::NAME, ?event, "applying event");
                let current = container.current();
                if let Some(pending) = model.pending(&current, &event) {
                    container.replace_pending(pending);
                }
                let next = model.handle(&current, event).await;
                container.replace(next);
            }
            Job::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
