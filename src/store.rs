use crate::error::StoreError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use tracing::{trace, warn};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Single mutable state value with synchronous change notification.
///
/// Listeners run in subscription order on the thread that performed the
/// update and receive the whole new state. Calling `update` from inside a
/// listener fails with `StoreError::Reentrant` and leaves the state as it was.
/// Updates from other threads wait until the current notification finishes.
pub struct StateStore<S> {
    state: Mutex<S>,
    listeners: Mutex<Vec<(u64, Listener<S>)>>,
    next_listener_id: AtomicU64,
    notify_lock: Mutex<()>,
    notifying: Mutex<Option<ThreadId>>,
}

/// Handle returned by `StateStore::on_change`; dropping it unsubscribes
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription<S> {
    id: u64,
    store: Weak<StateStore<S>>,
}

impl<S> Subscription<S> {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.listeners.lock().retain(|(id, _)| *id != self.id);
            trace!("Listener {} unsubscribed", self.id);
        }
    }
}

struct NotifyingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl<S: Clone + Send + 'static> StateStore<S> {
    pub fn new(initial: S) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            notify_lock: Mutex::new(()),
            notifying: Mutex::new(None),
        })
    }

    /// Snapshot of the current state
    pub fn get(&self) -> S {
        self.state.lock().clone()
    }

    /// Read part of the state without cloning all of it
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state.lock())
    }

    /// Apply `reducer` and notify every listener. The reducer must not call
    /// back into the store.
    pub fn update<T>(&self, reducer: impl FnOnce(&mut S) -> T) -> Result<T, StoreError> {
        let current = thread::current().id();
        if *self.notifying.lock() == Some(current) {
            warn!("Rejected re-entrant state update from a change listener");
            return Err(StoreError::Reentrant);
        }

        let _serial = self.notify_lock.lock();

        let (value, snapshot) = {
            let mut state = self.state.lock();
            let value = reducer(&mut state);
            (value, state.clone())
        };

        *self.notifying.lock() = Some(current);
        let _guard = NotifyingGuard(&self.notifying);

        let listeners: Vec<Listener<S>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(&snapshot);
        }

        Ok(value)
    }

    /// Register a listener called after every update
    pub fn on_change<F>(self: &Arc<Self>, listener: F) -> Subscription<S>
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));
        trace!("Listener {} subscribed", id);

        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}
