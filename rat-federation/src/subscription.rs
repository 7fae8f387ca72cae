//! Listener registries and the `Subscription` guard, inspired by GPUI.
//!
//! Listeners are called synchronously in subscription order. No lock is held while
//! a listener runs, so listeners may subscribe or unsubscribe during an emit.

use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ListenerSet<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// An ordered set of callbacks for events of type `E`.
pub struct Listeners<E> {
    inner: Arc<Mutex<ListenerSet<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerSet {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// `Subscription` is dropped or unsubscribed.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = set.next_id;
            set.next_id += 1;
            set.entries.push((id, Arc::new(f)));
            id
        };

        let weak: Weak<Mutex<ListenerSet<E>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut set = inner.lock().unwrap_or_else(PoisonError::into_inner);
                set.entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Call every listener with `event`. Returns the number of listeners called.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Callback<E>> = {
            let set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            set.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in &snapshot {
            callback(event);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }

    /// Keep the listener for as long as its registry lives.
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
