//! Shared view state.
//!
//! An `Entity` is the state a view shares with the async tasks it starts. Tasks
//! hold a `WeakEntity`: once the view is unmounted the upgrade fails and late
//! results are discarded instead of written into a dead view.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Global counter for generating unique entity IDs.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for an entity across the application.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    fn next() -> Self {
        let id = NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed);
        // Counter starts at 1.
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Debug for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strong handle to a piece of view state.
pub struct Entity<T> {
    id: EntityId,
    inner: Arc<RwLock<T>>,
}

/// A weak handle to an entity.
pub struct WeakEntity<T> {
    id: EntityId,
    inner: Weak<RwLock<T>>,
}

impl<T: Send + Sync> Entity<T> {
    /// Create a new entity with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: EntityId::next(),
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Get the unique ID of this entity.
    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Update the inner value using a closure.
    pub fn update<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.write().map_err(|_| crate::Error::LockPoisoned)?;
        Ok(f(&mut *guard))
    }

    /// Replace the inner value.
    pub fn set(&self, value: T) -> crate::Result<()> {
        self.update(|v| *v = value)
    }

    /// Read the inner value using a closure.
    pub fn read<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.inner.read().map_err(|_| crate::Error::LockPoisoned)?;
        Ok(f(&*guard))
    }

    /// Downgrade this entity to a weak handle.
    pub fn downgrade(&self) -> WeakEntity<T> {
        WeakEntity {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync> Entity<T> {
    /// Clone the current value out. A poisoned lock still yields the last value.
    pub fn snapshot(&self) -> T {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<T: Send + Sync> WeakEntity<T> {
    /// Get the unique ID of this entity.
    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Upgrade this weak handle to a strong handle, if the entity is still alive.
    pub fn upgrade(&self) -> Option<Entity<T>> {
        self.inner.upgrade().map(|inner| Entity { id: self.id, inner })
    }

    /// Update the entity if it is still alive. `None` means the result was discarded.
    pub fn update<F, R>(&self, f: F) -> Option<crate::Result<R>>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.upgrade().map(|entity| entity.update(f))
    }
}

impl<T> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Clone for WeakEntity<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}
