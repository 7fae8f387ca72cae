//! Keeps a host's history and a mounted remote's router convergent.
//!
//! Navigation flows in two directions:
//! - host → remote: host history changes whose origin is not `Remote` are passed
//!   to `MountHandle::on_parent_navigate`;
//! - remote → host: `Remote`-origin router events arrive through `on_navigate`
//!   and are pushed into the host history tagged `Remote`.
//!
//! Each direction drops events tagged with the other side's origin, so one user
//! action crosses the boundary at most once.

use crate::error::Result;
use crate::history::BrowserHistory;
use crate::location::{NavigationEvent, Origin};
use crate::mount::{Container, MountHandle, MountOptions, RemoteApp};
use crate::subscription::Subscription;
use std::sync::{Arc, Mutex, PoisonError, Weak};

pub struct NavigationBridge {
    remote: String,
    handle: Arc<Mutex<Option<MountHandle>>>,
    history_listener: Option<Subscription>,
}

impl NavigationBridge {
    /// Mount `remote` into `target`, seeded with the host's current location.
    ///
    /// A failed mount is logged and returned; the host history is left alone.
    pub fn mount(history: &BrowserHistory, remote: &dyn RemoteApp, target: &Container) -> Result<Self> {
        let on_navigate = {
            let history = history.clone();
            move |event: &NavigationEvent| {
                let host = history.location();
                if event.next_pathname != host.pathname || !event.search.is_empty() {
                    history.push(event.next_location(), Origin::Remote);
                }
            }
        };
        let options = MountOptions::new()
            .initial_path(history.location())
            .on_navigate(on_navigate);

        let handle = remote.mount(target, options).map_err(|err| {
            tracing::error!(remote = remote.name(), error = %err, "remote failed to mount");
            err
        })?;
        tracing::info!(remote = remote.name(), location = %history.location(), "remote mounted");

        let handle = Arc::new(Mutex::new(Some(handle)));
        let weak: Weak<Mutex<Option<MountHandle>>> = Arc::downgrade(&handle);
        let history_listener = history.listen(move |update| {
            if update.origin == Origin::Remote {
                return;
            }
            let Some(handle) = weak.upgrade() else {
                return;
            };
            let guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = guard.as_ref() {
                handle.on_parent_navigate(&update.location);
            }
        });

        Ok(Self {
            remote: remote.name().to_string(),
            handle,
            history_listener: Some(history_listener),
        })
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn is_mounted(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(MountHandle::is_mounted)
    }

    /// Stop listening to the host and unmount the remote. Returns false if
    /// already unmounted.
    pub fn unmount(&mut self) -> bool {
        self.history_listener.take();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(mut handle) => handle.unmount(),
            None => false,
        }
    }
}

impl Drop for NavigationBridge {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppContext;
    use crate::error::Error;
    use crate::location::Location;
    use crate::mount::tests::EchoRemote;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup(initial: &str) -> (BrowserHistory, EchoRemote, Container, AppContext) {
        let (app, _rx) = AppContext::new();
        let container = Container::new("content");
        container.attach(&app);
        (BrowserHistory::new(initial), EchoRemote::new(), container, app)
    }

    fn count_remote_host_pushes(history: &BrowserHistory) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let sub = {
            let count = Arc::clone(&count);
            history.listen(move |u| {
                if u.origin == Origin::Remote {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            })
        };
        (count, sub)
    }

    fn count_router_events(remote: &EchoRemote, origin: Origin) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let sub = {
            let count = Arc::clone(&count);
            remote.router().subscribe(move |e| {
                if e.origin == origin {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            })
        };
        (count, sub)
    }

    #[test]
    fn test_remote_starts_at_host_location() {
        let (history, remote, container, _app) = setup("/workshops/5");
        let _bridge = NavigationBridge::mount(&history, &remote, &container).unwrap();
        assert_eq!(remote.router().location().pathname, "/workshops/5");
    }

    #[test]
    fn test_host_navigation_converges_remote() {
        let (history, remote, container, _app) = setup("/workshops");
        let _bridge = NavigationBridge::mount(&history, &remote, &container).unwrap();
        let (host_pushes, _s1) = count_remote_host_pushes(&history);
        let (syncs, _s2) = count_router_events(&remote, Origin::Host);

        for path in ["/workshops/5", "/workshops", "/workshops/9", "/workshops/9?x=1"] {
            history.push(path, Origin::Host);
            assert_eq!(remote.router().location().pathname, Location::parse(path).pathname);
        }

        // The last push only changed the query string, which sync ignores.
        assert_eq!(syncs.load(Ordering::SeqCst), 3);
        assert_eq!(host_pushes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remote_navigation_updates_host_once() {
        let (history, remote, container, _app) = setup("/workshops");
        let _bridge = NavigationBridge::mount(&history, &remote, &container).unwrap();
        let (host_pushes, _s1) = count_remote_host_pushes(&history);
        let (echoes, _s2) = count_router_events(&remote, Origin::Host);

        remote.router().navigate("/workshops/5?page=2");

        assert_eq!(history.location().href(), "/workshops/5?page=2");
        assert_eq!(host_pushes.load(Ordering::SeqCst), 1);
        assert_eq!(echoes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_host_back_reaches_remote() {
        let (history, remote, container, _app) = setup("/workshops");
        let _bridge = NavigationBridge::mount(&history, &remote, &container).unwrap();

        remote.router().navigate("/workshops/5");
        assert!(history.back());
        assert_eq!(remote.router().location().pathname, "/workshops");
    }

    #[test]
    fn test_mount_failure_leaves_history_untouched() {
        let (history, remote, _container, _app) = setup("/workshops");
        let detached = Container::new("detached");
        let result = NavigationBridge::mount(&history, &remote, &detached);
        assert!(matches!(result, Err(Error::InvalidMountTarget { .. })));
        assert_eq!(history.location().pathname, "/workshops");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_unmount_stops_synchronisation() {
        let (history, remote, container, _app) = setup("/workshops");
        let mut bridge = NavigationBridge::mount(&history, &remote, &container).unwrap();
        let router = remote.router();

        assert!(bridge.is_mounted());
        assert!(bridge.unmount());
        assert!(!bridge.unmount());
        assert!(!container.is_occupied());

        history.push("/workshops/3", Origin::Host);
        assert_eq!(router.location().pathname, "/workshops");
        router.navigate("/workshops/8");
        assert_eq!(history.location().pathname, "/workshops/3");
    }
}
