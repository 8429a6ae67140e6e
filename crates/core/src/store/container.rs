//! Holder of the current snapshot for one screen instance.

use super::publisher::Subscription;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Where a store is in its life.
///
/// `Uninitialised -> Ready` once the seeded snapshot is installed, `Ready -> Disposed` when
/// the owning screen goes away. There is no way back from `Disposed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialised,
    Ready,
    Disposed,
}

impl Lifecycle {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialised,
            1 => Self::Ready,
            _ => Self::Disposed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialised => 0,
            Self::Ready => 1,
            Self::Disposed => 2,
        }
    }
}

#[derive(Debug)]
struct Publisher<S> {
    /// `None` once disposed; subscribers see the channel close.
    tx: Option<watch::Sender<Arc<S>>>,
    /// Snapshot to fall back to while an interim one is published.
    settled: Option<Arc<S>>,
}

/// Owns exactly one snapshot and publishes every replacement.
///
/// The snapshot lives behind an `Arc` inside a `watch` channel: readers clone the `Arc`,
/// writers swap it whole, so nobody can observe a half-built value. Disposing closes the
/// channel; the last snapshot stays readable through [`StateContainer::current`].
#[derive(Debug)]
pub struct StateContainer<S> {
    publisher: Mutex<Publisher<S>>,
    rx: watch::Receiver<Arc<S>>,
    lifecycle: AtomicU8,
}

impl<S> StateContainer<S>
where
    S: PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        let (tx, rx) = watch::channel(Arc::new(initial));
        Self {
            publisher: Mutex::new(Publisher {
                tx: Some(tx),
                settled: None,
            }),
            rx,
            lifecycle: AtomicU8::new(Lifecycle::Uninitialised.as_u8()),
        }
    }

    /// The latest snapshot. Never blocks on a writer for longer than an `Arc` clone.
    pub fn current(&self) -> Arc<S> {
        self.rx.borrow().clone()
    }

    /// Installs `next` and wakes subscribers.
    ///
    /// Returns `false`, without waking anyone, when `next` equals the current snapshot or the
    /// container has been disposed.
    pub fn replace(&self, next: S) -> bool {
        let mut publisher = self.lock();
        publisher.settled = None;
        Self::send(&publisher, next)
    }

    /// Publishes an interim snapshot. Until the next [`StateContainer::replace`], disposal
    /// rolls back to the snapshot that was current before this call.
    pub(crate) fn replace_pending(&self, pending: S) -> bool {
        let mut publisher = self.lock();
        if publisher.tx.is_none() {
            return false;
        }
        if publisher.settled.is_none() {
            publisher.settled = Some(self.current());
        }
        Self::send(&publisher, pending)
    }

    pub fn subscribe(&self) -> Subscription<S> {
        Subscription::new(self.rx.clone())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    /// Moves `Uninitialised -> Ready`. Has no effect in any other state.
    pub(crate) fn mark_ready(&self) -> bool {
        self.lifecycle
            .compare_exchange(
                Lifecycle::Uninitialised.as_u8(),
                Lifecycle::Ready.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Moves to `Disposed` and closes the channel, ending every subscription.
    ///
    /// An interim snapshot still on display is swapped back for the settled one first.
    /// Returns `false` if the container was already disposed.
    pub(crate) fn mark_disposed(&self) -> bool {
        let previous = self.lifecycle.swap(Lifecycle::Disposed.as_u8(), Ordering::AcqRel);
        if previous == Lifecycle::Disposed.as_u8() {
            return false;
        }

        let mut publisher = self.lock();
        let settled = publisher.settled.take();
        if let (Some(tx), Some(settled)) = (publisher.tx.take(), settled) {
            tx.send_replace(settled);
        }
        true
    }

    fn send(publisher: &Publisher<S>, next: S) -> bool {
        let Some(tx) = &publisher.tx else {
            return false;
        };
        tx.send_if_modified(|slot| {
            if **slot == next {
                return false;
            }
            *slot = Arc::new(next);
            true
        })
    }

    // writers never panic while holding the lock, but a poisoned guard is still usable
    fn lock(&self) -> MutexGuard<'_, Publisher<S>> {
        self.publisher.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_skips_equal_snapshots() {
        let container = StateContainer::new(1u32);
        assert!(!container.replace(1));
        assert!(container.replace(2));
        assert_eq!(*container.current(), 2);
    }

    #[test]
    fn test_previously_read_snapshot_stays_valid() {
        let container = StateContainer::new(vec![1, 2, 3]);
        let before = container.current();
        container.replace(vec![4]);
        assert_eq!(*before, vec![1, 2, 3]);
        assert_eq!(*container.current(), vec![4]);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let container = StateContainer::new(());
        assert_eq!(container.lifecycle(), Lifecycle::Uninitialised);
        assert!(container.mark_ready());
        assert!(!container.mark_ready());
        assert_eq!(container.lifecycle(), Lifecycle::Ready);
        assert!(container.mark_disposed());
        assert!(!container.mark_disposed());
        assert!(!container.mark_ready(), "disposed containers never become ready again");
        assert_eq!(container.lifecycle(), Lifecycle::Disposed);
    }

    #[tokio::test]
    async fn test_dispose_closes_subscriptions_and_freezes_snapshot() {
        let container = StateContainer::new(1u32);
        let mut subscription = container.subscribe();

        assert!(container.mark_disposed());
        assert!(subscription.next().await.is_none());
        assert!(container.subscribe().next().await.is_none());

        assert!(!container.replace(2), "writes after disposal are dropped");
        assert_eq!(*container.current(), 1);
    }

    #[test]
    fn test_dispose_rolls_back_outstanding_pending_snapshot() {
        let container = StateContainer::new(1u32);
        assert!(container.replace_pending(99));
        assert!(container.replace_pending(98));
        assert_eq!(*container.current(), 98);

        container.mark_disposed();
        assert_eq!(*container.current(), 1);
    }

    #[test]
    fn test_replace_settles_pending_snapshot() {
        let container = StateContainer::new(1u32);
        container.replace_pending(99);
        container.replace(2);

        container.mark_disposed();
        assert_eq!(*container.current(), 2);
    }
}
