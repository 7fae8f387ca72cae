//! The host's browser-style history: the address bar plus a back/forward stack.

use crate::location::{Location, Origin};
use crate::subscription::{Listeners, Subscription};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Push,
    Replace,
    Pop,
}

/// Delivered to history listeners after every location change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryUpdate {
    pub location: Location,
    pub action: HistoryAction,
    pub origin: Origin,
}

struct HistoryState {
    entries: Vec<Location>,
    index: usize,
}

impl HistoryState {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }
}

/// Authoritative location store for a host. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BrowserHistory {
    state: Arc<Mutex<HistoryState>>,
    listeners: Listeners<HistoryUpdate>,
}

impl BrowserHistory {
    pub fn new(initial: impl Into<Location>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HistoryState {
                entries: vec![initial.into()],
                index: 0,
            })),
            listeners: Listeners::new(),
        }
    }

    /// The current address bar location.
    pub fn location(&self) -> Location {
        self.lock().current().clone()
    }

    /// Push a new entry, dropping any forward entries. Pushing the current
    /// location is a no-op.
    pub fn push(&self, to: impl Into<Location>, origin: Origin) -> bool {
        let to = to.into();
        {
            let mut state = self.lock();
            if *state.current() == to {
                return false;
            }
            let keep = state.index + 1;
            state.entries.truncate(keep);
            state.entries.push(to.clone());
            state.index = keep;
        }
        self.notify(to, HistoryAction::Push, origin);
        true
    }

    /// Replace the current entry.
    pub fn replace(&self, to: impl Into<Location>, origin: Origin) -> bool {
        let to = to.into();
        {
            let mut state = self.lock();
            if *state.current() == to {
                return false;
            }
            let index = state.index;
            state.entries[index] = to.clone();
        }
        self.notify(to, HistoryAction::Replace, origin);
        true
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    pub fn can_go_back(&self) -> bool {
        self.lock().index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let state = self.lock();
        state.index + 1 < state.entries.len()
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Listen to every location change.
    pub fn listen<F>(&self, f: F) -> Subscription
    where
        F: Fn(&HistoryUpdate) + Send + Sync + 'static,
    {
        self.listeners.subscribe(f)
    }

    fn go(&self, delta: isize) -> bool {
        let location = {
            let mut state = self.lock();
            let Some(target) = state.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= state.entries.len() {
                return false;
            }
            state.index = target;
            state.current().clone()
        };
        self.notify(location, HistoryAction::Pop, Origin::Host);
        true
    }

    fn notify(&self, location: Location, action: HistoryAction, origin: Origin) {
        tracing::debug!(%location, ?action, ?origin, "host history changed");
        self.listeners.emit(&HistoryUpdate {
            location,
            action,
            origin,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BrowserHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHistory")
            .field("location", &self.location())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_back_forward() {
        let history = BrowserHistory::new("/");
        assert!(history.push("/workshops", Origin::Host));
        assert!(history.push("/workshops/5?page=2", Origin::Remote));
        assert_eq!(history.location().href(), "/workshops/5?page=2");
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert_eq!(history.location().pathname, "/workshops");
        assert!(history.can_go_forward());

        assert!(history.forward());
        assert_eq!(history.location().pathname, "/workshops/5");
        assert!(!history.forward());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = BrowserHistory::new("/");
        history.push("/a", Origin::Host);
        history.push("/b", Origin::Host);
        history.back();
        history.push("/c", Origin::Host);
        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_same_location_is_noop() {
        let history = BrowserHistory::new("/workshops");
        let updates = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let updates = Arc::clone(&updates);
            history.listen(move |u| updates.lock().unwrap().push(u.clone()))
        };

        assert!(!history.push("/workshops", Origin::Host));
        assert!(updates.lock().unwrap().is_empty());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_listeners_receive_origin() {
        let history = BrowserHistory::new("/");
        let updates = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let updates = Arc::clone(&updates);
            history.listen(move |u| updates.lock().unwrap().push((u.action, u.origin)))
        };

        history.push("/favorites", Origin::Remote);
        history.replace("/favorites?x=1", Origin::Host);
        history.back();

        assert_eq!(
            *updates.lock().unwrap(),
            vec![
                (HistoryAction::Push, Origin::Remote),
                (HistoryAction::Replace, Origin::Host),
                (HistoryAction::Pop, Origin::Host),
            ]
        );
    }
}
