//! The router a remote application runs on.
//!
//! Embedded remotes get an in-memory router seeded by the host. Standalone
//! remotes get one driven by a `BrowserHistory` they own.

use super::routes::{RouteMatch, RouteTable};
use crate::history::BrowserHistory;
use crate::location::{Location, NavigationEvent, Origin};
use crate::subscription::{Listeners, Subscription};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

struct RouterState<R> {
    current: Location,
    resolved: Option<RouteMatch<R>>,
    history: Vec<Location>,
}

struct RouterInner<R> {
    routes: RouteTable<R>,
    state: Mutex<RouterState<R>>,
    listeners: Listeners<NavigationEvent>,
    history_links: Mutex<Vec<Subscription>>,
}

/// A remote's router. Cheap to clone; clones share state.
///
/// # Example
/// ```ignore
/// use rat_federation::{route_table, RemoteRouter};
///
/// let router = RemoteRouter::new("/workshops", route_table! {
///     "/workshops" => Page::List,
///     "/workshops/:id" => Page::Details,
/// });
/// router.navigate("/workshops/5");
/// assert_eq!(router.param("id").as_deref(), Some("5"));
/// router.go_back();
/// assert_eq!(router.location().pathname, "/workshops");
/// ```
pub struct RemoteRouter<R> {
    inner: Arc<RouterInner<R>>,
}

impl<R> Clone for RemoteRouter<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Clone + Send + Sync + 'static> RemoteRouter<R> {
    /// Create an in-memory router starting at `initial`. A path the table does
    /// not know resolves to the not-found state.
    pub fn new(initial: impl Into<Location>, routes: RouteTable<R>) -> Self {
        let current = initial.into();
        let resolved = routes.resolve(&current.pathname);
        if resolved.is_none() {
            tracing::debug!(location = %current, "initial path did not match any route");
        }
        Self {
            inner: Arc::new(RouterInner {
                routes,
                state: Mutex::new(RouterState {
                    current,
                    resolved,
                    history: Vec::new(),
                }),
                listeners: Listeners::new(),
                history_links: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a router driven by a browser history, for standalone use.
    ///
    /// Navigations made through the router are pushed into `history` tagged
    /// `Remote`; history changes of any other origin converge the router.
    pub fn with_history(history: &BrowserHistory, routes: RouteTable<R>) -> Self {
        let router = Self::new(history.location(), routes);

        let push = {
            let history = history.clone();
            router.subscribe(move |event| {
                if event.origin == Origin::Remote {
                    history.push(event.next_location(), Origin::Remote);
                }
            })
        };

        let weak: Weak<RouterInner<R>> = Arc::downgrade(&router.inner);
        let pull = history.listen(move |update| {
            if update.origin == Origin::Remote {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                RemoteRouter { inner }.sync(&update.location);
            }
        });

        router.lock_links().extend([push, pull]);
        router
    }

    /// Register a listener for every location change. Listeners run before the
    /// view re-renders.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(&NavigationEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(on_change)
    }

    pub fn location(&self) -> Location {
        self.lock().current.clone()
    }

    /// The route the current location resolved to, if any.
    pub fn current(&self) -> Option<RouteMatch<R>> {
        self.lock().resolved.clone()
    }

    pub fn is_not_found(&self) -> bool {
        self.lock().resolved.is_none()
    }

    /// A path parameter of the current match.
    pub fn param(&self, name: &str) -> Option<String> {
        self.lock()
            .resolved
            .as_ref()
            .and_then(|m| m.param(name).map(str::to_string))
    }

    /// Internal navigation. Returns false when already at `to`.
    pub fn navigate(&self, to: impl Into<Location>) -> bool {
        self.transition(to.into(), Origin::Remote, true)
    }

    /// Replace the current location without growing the back stack.
    pub fn replace(&self, to: impl Into<Location>) -> bool {
        self.transition(to.into(), Origin::Remote, false)
    }

    /// Converge on a location the host moved to.
    ///
    /// Only the pathname is compared. The resulting event is tagged `Host`, so
    /// forwarding paths that only pass `Remote` events never echo it back.
    /// Landing on the previous back-stack entry pops it, which keeps the back
    /// stack in step with a host that went back.
    pub fn sync(&self, next: &Location) -> bool {
        let event = {
            let mut state = self.lock();
            if state.current.pathname == next.pathname {
                return false;
            }
            let event = NavigationEvent::new(&state.current, next, Origin::Host);
            let prev = std::mem::replace(&mut state.current, next.clone());
            if state.history.last().is_some_and(|back| back.pathname == next.pathname) {
                state.history.pop();
            } else {
                state.history.push(prev);
            }
            state.resolved = self.inner.routes.resolve(&next.pathname);
            event
        };
        self.emit(event);
        true
    }

    /// Go back to the previous location. Returns true if successful.
    pub fn go_back(&self) -> bool {
        let event = {
            let mut state = self.lock();
            let Some(prev) = state.history.pop() else {
                return false;
            };
            let event = NavigationEvent::new(&state.current, &prev, Origin::Remote);
            state.resolved = self.inner.routes.resolve(&prev.pathname);
            state.current = prev;
            event
        };
        self.emit(event);
        true
    }

    pub fn can_go_back(&self) -> bool {
        !self.lock().history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    fn transition(&self, next: Location, origin: Origin, push: bool) -> bool {
        let event = {
            let mut state = self.lock();
            if state.current == next {
                return false;
            }
            let event = NavigationEvent::new(&state.current, &next, origin);
            let prev = std::mem::replace(&mut state.current, next);
            if push {
                state.history.push(prev);
            }
            state.resolved = self.inner.routes.resolve(&state.current.pathname);
            event
        };
        self.emit(event);
        true
    }

    fn emit(&self, event: NavigationEvent) {
        tracing::debug!(
            from = %event.pathname,
            to = %event.next_pathname,
            search = %event.search,
            origin = ?event.origin,
            "remote router navigated"
        );
        self.inner.listeners.emit(&event);
    }

    fn lock(&self) -> MutexGuard<'_, RouterState<R>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_links(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.inner
            .history_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
