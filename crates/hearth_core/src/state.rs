//! Observable per-screen state.
//!
//! # Responsibility
//! - Hold the latest immutable snapshot for one screen (loading flag, items,
//!   error message).
//! - Fan new snapshots out to subscribers over channels.
//!
//! # Invariants
//! - Snapshots are never mutated after publication; readers share an `Arc`.
//! - A new subscriber immediately receives the current snapshot.
//! - Disconnected subscribers are pruned on the next publish.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

/// Immutable snapshot rendered by a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState<T> {
    pub loading: bool,
    pub items: Vec<T>,
    pub error: Option<String>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            items: Vec::new(),
            error: None,
        }
    }
}

struct Inner<T> {
    current: Arc<ScreenState<T>>,
    subscribers: Vec<Sender<Arc<ScreenState<T>>>>,
}

/// Publish/subscribe container over [`ScreenState`] snapshots.
pub struct StateHolder<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for StateHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateHolder<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: Arc::new(ScreenState::default()),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ScreenState<T>> {
        Arc::clone(&self.lock().current)
    }

    /// Registers a subscriber; the current snapshot is delivered first.
    pub fn subscribe(&self) -> Receiver<Arc<ScreenState<T>>> {
        let (tx, rx) = channel();
        let mut inner = self.lock();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(Arc::clone(&inner.current));
        inner.subscribers.push(tx);
        rx
    }

    /// Marks the screen as loading, keeping the previous items visible.
    pub fn set_loading(&self)
    where
        T: Clone,
    {
        self.update(|previous| ScreenState {
            loading: true,
            items: previous.items.clone(),
            error: None,
        });
    }

    /// Publishes a fresh item list and clears any error.
    pub fn publish_items(&self, items: Vec<T>) {
        self.replace(ScreenState {
            loading: false,
            items,
            error: None,
        });
    }

    /// Publishes an error message, keeping the previous items visible.
    pub fn publish_error(&self, message: impl Into<String>)
    where
        T: Clone,
    {
        let message = message.into();
        self.update(|previous| ScreenState {
            loading: false,
            items: previous.items.clone(),
            error: Some(message),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn update(&self, next: impl FnOnce(&ScreenState<T>) -> ScreenState<T>) {
        let mut inner = self.lock();
        let state = next(&inner.current);
        Self::publish_locked(&mut inner, state);
    }

    fn replace(&self, state: ScreenState<T>) {
        let mut inner = self.lock();
        Self::publish_locked(&mut inner, state);
    }

    fn publish_locked(inner: &mut Inner<T>, state: ScreenState<T>) {
        let snapshot = Arc::new(state);
        inner.current = Arc::clone(&snapshot);
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(Arc::clone(&snapshot)).is_ok());
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // Snapshots are replaced wholesale, so a poisoned lock still holds a
        // consistent value.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::StateHolder;

    #[test]
    fn subscribers_receive_current_and_future_snapshots() {
        let holder = StateHolder::<u32>::new();
        holder.publish_items(vec![1]);

        let rx = holder.subscribe();
        assert_eq!(rx.recv().expect("initial snapshot").items, vec![1]);

        holder.set_loading();
        let loading = rx.recv().expect("loading snapshot");
        assert!(loading.loading);
        assert_eq!(loading.items, vec![1]);

        holder.publish_error("disk full");
        let failed = rx.recv().expect("error snapshot");
        assert_eq!(failed.error.as_deref(), Some("disk full"));
        assert_eq!(failed.items, vec![1]);
        assert!(!failed.loading);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let holder = StateHolder::<u32>::new();
        let rx = holder.subscribe();
        assert_eq!(holder.subscriber_count(), 1);
        drop(rx);
        holder.publish_items(vec![]);
        assert_eq!(holder.subscriber_count(), 0);
    }

    #[test]
    fn publish_items_clears_error() {
        let holder = StateHolder::<u32>::new();
        holder.publish_error("boom");
        holder.publish_items(vec![2, 3]);
        let snapshot = holder.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.items, vec![2, 3]);
    }
}
