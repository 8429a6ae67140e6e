//! Replay-latest subscriptions to a store.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A view onto a store's snapshots.
///
/// `initial` is whatever was current when the subscription was made; [`Subscription::next`]
/// then yields later snapshots. A subscriber that falls behind skips straight to the newest
/// value. Holding a subscription does not keep the store alive: once the store is disposed
/// or dropped, `next` returns `None`.
#[derive(Debug)]
pub struct Subscription<S> {
    initial: Arc<S>,
    rx: watch::Receiver<Arc<S>>,
}

impl<S> Subscription<S>
where
    S: Send + Sync + 'static,
{
    pub(crate) fn new(mut rx: watch::Receiver<Arc<S>>) -> Self {
        let initial = rx.borrow_and_update().clone();
        Self { initial, rx }
    }

    pub fn initial(&self) -> Arc<S> {
        self.initial.clone()
    }

    /// Waits for the next snapshot, or `None` once the store has been disposed.
    pub async fn next(&mut self) -> Option<Arc<S>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Splits into the initial snapshot and a stream of the subsequent ones.
    pub fn into_parts(self) -> (Arc<S>, WatchStream<Arc<S>>) {
        (self.initial, WatchStream::from_changes(self.rx))
    }

    /// A stream that starts with the latest snapshot and then follows updates.
    pub fn into_stream(self) -> WatchStream<Arc<S>> {
        WatchStream::new(self.rx)
    }
}
