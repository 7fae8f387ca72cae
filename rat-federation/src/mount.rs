//! Mount targets, mount options and the handle a host keeps for each mounted remote.

use crate::application::{AppContext, Context};
use crate::component::traits::{Action, AnyComponent, Component, Event};
use crate::error::{ContainerOccupiedSnafu, InvalidMountTargetSnafu, Result};
use crate::history::BrowserHistory;
use crate::location::{Location, NavigationEvent, Origin};
use crate::router::{RemoteRouter, RouteTable};
use crate::subscription::Subscription;
use ratatui::layout::Rect;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Host callback for navigations that start inside a remote.
pub type NavigateCallback = Arc<dyn Fn(&NavigationEvent) + Send + Sync>;

struct MountedView {
    owner: String,
    component: Arc<Mutex<dyn AnyComponent>>,
}

struct ContainerState {
    app: Option<AppContext>,
    view: Option<MountedView>,
}

/// A slot in the host's screen that exactly one remote can occupy.
///
/// A container starts detached. The host attaches it once it is part of the
/// rendered tree; only attached containers accept mounts.
#[derive(Clone)]
pub struct Container {
    name: Arc<str>,
    state: Arc<Mutex<ContainerState>>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(ContainerState {
                app: None,
                view: None,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attach(&self, app: &AppContext) {
        self.lock().app = Some(app.clone());
    }

    /// Take the container out of the visible tree. A mounted view stays until
    /// its handle is unmounted.
    pub fn detach(&self) {
        self.lock().app = None;
    }

    pub fn is_attached(&self) -> bool {
        self.lock().app.is_some()
    }

    /// The app this container is attached to.
    pub fn app(&self) -> Result<AppContext> {
        self.lock()
            .app
            .clone()
            .ok_or_else(|| InvalidMountTargetSnafu { container: self.name() }.build())
    }

    /// Name of the remote currently mounted here.
    pub fn owner(&self) -> Option<String> {
        self.lock().view.as_ref().map(|v| v.owner.clone())
    }

    pub fn is_occupied(&self) -> bool {
        self.lock().view.is_some()
    }

    /// Place `component` in this container and run its `on_init`.
    pub fn insert<C: Component>(&self, owner: &str, component: C) -> Result<()> {
        let component: Arc<Mutex<dyn AnyComponent>> = Arc::new(Mutex::new(component));
        let app = {
            let mut state = self.lock();
            let Some(app) = state.app.clone() else {
                return InvalidMountTargetSnafu { container: self.name() }.fail();
            };
            if let Some(existing) = &state.view {
                return ContainerOccupiedSnafu {
                    container: self.name(),
                    owner: existing.owner.clone(),
                }
                .fail();
            }
            state.view = Some(MountedView {
                owner: owner.to_string(),
                component: Arc::clone(&component),
            });
            app
        };

        let mut cx = Context::<dyn AnyComponent>::new(app.clone(), Rect::default());
        lock_view(&component).on_init_any(&mut cx);
        app.refresh();
        tracing::debug!(container = %self.name, remote = owner, "view inserted");
        Ok(())
    }

    /// Remove the mounted view, running its `on_shutdown`. Returns false if empty.
    pub fn remove(&self) -> bool {
        let (view, app) = {
            let mut state = self.lock();
            (state.view.take(), state.app.clone())
        };
        let Some(view) = view else {
            return false;
        };

        if let Some(app) = &app {
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), Rect::default());
            lock_view(&view.component).on_shutdown_any(&mut cx);
            app.refresh();
        }
        tracing::debug!(container = %self.name, remote = %view.owner, "view removed");
        true
    }

    /// Render the mounted view into `area`. Returns false when there is nothing
    /// to draw or the container is detached.
    pub fn render(&self, frame: &mut ratatui::Frame, area: Rect) -> bool {
        let Some((component, app)) = self.mounted() else {
            return false;
        };
        let mut cx = Context::<dyn AnyComponent>::new(app, area);
        lock_view(&component).render_any(frame, &mut cx);
        true
    }

    /// Forward an event to the mounted view.
    pub fn handle_event(&self, event: Event, area: Rect) -> Option<Action> {
        let (component, app) = self.mounted()?;
        let mut cx = Context::<dyn AnyComponent>::new(app, area);
        lock_view(&component).handle_event_any(event, &mut cx)
    }

    fn mounted(&self) -> Option<(Arc<Mutex<dyn AnyComponent>>, AppContext)> {
        let state = self.lock();
        let app = state.app.clone()?;
        let component = Arc::clone(&state.view.as_ref()?.component);
        Some((component, app))
    }

    fn lock(&self) -> MutexGuard<'_, ContainerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("attached", &self.is_attached())
            .field("owner", &self.owner())
            .finish()
    }
}

fn lock_view(component: &Arc<Mutex<dyn AnyComponent>>) -> MutexGuard<'_, dyn AnyComponent + 'static> {
    component.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Options a host passes to `RemoteApp::mount`.
#[derive(Clone, Default)]
pub struct MountOptions {
    /// Seeds the remote's router.
    pub initial_path: Option<Location>,
    /// Receives navigations that start inside the remote.
    pub on_navigate: Option<NavigateCallback>,
    /// When set, the remote runs standalone on this history instead of an
    /// in-memory router.
    pub default_history: Option<BrowserHistory>,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_path(mut self, path: impl Into<Location>) -> Self {
        self.initial_path = Some(path.into());
        self
    }

    pub fn on_navigate<F>(mut self, f: F) -> Self
    where
        F: Fn(&NavigationEvent) + Send + Sync + 'static,
    {
        self.on_navigate = Some(Arc::new(f));
        self
    }

    pub fn default_history(mut self, history: BrowserHistory) -> Self {
        self.default_history = Some(history);
        self
    }

    /// Build the router a remote should use under these options.
    pub fn create_router<R>(&self, fallback_path: &str, routes: RouteTable<R>) -> RemoteRouter<R>
    where
        R: Clone + Send + Sync + 'static,
    {
        match &self.default_history {
            Some(history) => RemoteRouter::with_history(history, routes),
            None => {
                let initial = self
                    .initial_path
                    .clone()
                    .unwrap_or_else(|| Location::parse(fallback_path));
                RemoteRouter::new(initial, routes)
            }
        }
    }

    /// Wire `on_navigate` to the router, if the host supplied one.
    pub fn connect<R>(&self, router: &RemoteRouter<R>) -> Option<Subscription>
    where
        R: Clone + Send + Sync + 'static,
    {
        self.on_navigate
            .clone()
            .map(|on_navigate| forward_navigation(router, on_navigate))
    }
}

impl std::fmt::Debug for MountOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountOptions")
            .field("initial_path", &self.initial_path)
            .field("on_navigate", &self.on_navigate.is_some())
            .field("default_history", &self.default_history)
            .finish()
    }
}

/// Forward a router's `Remote`-origin events to the host.
///
/// Convergence navigations made through `RemoteRouter::sync` are tagged `Host`
/// and never pass this filter.
pub fn forward_navigation<R>(router: &RemoteRouter<R>, on_navigate: NavigateCallback) -> Subscription
where
    R: Clone + Send + Sync + 'static,
{
    router.subscribe(move |event| {
        if event.origin == Origin::Remote {
            on_navigate(event);
        }
    })
}

type ParentNavigate = Box<dyn Fn(&Location) -> bool + Send + Sync>;

/// Control handle for one mounted remote. Owned by whoever called `mount`.
///
/// Dropping the handle unmounts the remote.
#[must_use = "dropping a MountHandle unmounts the remote"]
pub struct MountHandle {
    remote: String,
    teardown: Option<Box<dyn FnOnce() + Send + Sync>>,
    parent_navigate: Option<ParentNavigate>,
    keep_alive: Vec<Subscription>,
}

impl MountHandle {
    pub fn new(remote: impl Into<String>, teardown: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            remote: remote.into(),
            teardown: Some(Box::new(teardown)),
            parent_navigate: None,
            keep_alive: Vec::new(),
        }
    }

    /// Insert `view` into `target` and return a handle that removes it again.
    pub fn for_view<C: Component>(target: &Container, remote: &str, view: C) -> Result<Self> {
        target.insert(remote, view)?;
        let target = target.clone();
        Ok(Self::new(remote, move || {
            target.remove();
        }))
    }

    /// Let the host drive this remote's router.
    pub fn with_parent_navigate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Location) -> bool + Send + Sync + 'static,
    {
        self.parent_navigate = Some(Box::new(f));
        self
    }

    /// Keep `subscription` alive until unmount.
    pub fn hold(mut self, subscription: impl Into<Option<Subscription>>) -> Self {
        if let Some(subscription) = subscription.into() {
            self.keep_alive.push(subscription);
        }
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn is_mounted(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn supports_parent_navigate(&self) -> bool {
        self.parent_navigate.is_some()
    }

    /// Tell the remote the host moved to `next`. Returns whether the remote
    /// navigated. Inert after unmount.
    pub fn on_parent_navigate(&self, next: &Location) -> bool {
        if !self.is_mounted() {
            tracing::warn!(remote = %self.remote, location = %next, "parent navigation after unmount ignored");
            return false;
        }
        self.parent_navigate.as_ref().is_some_and(|f| f(next))
    }

    /// Tear the remote down. Safe to call more than once; later calls return false.
    pub fn unmount(&mut self) -> bool {
        let Some(teardown) = self.teardown.take() else {
            tracing::warn!(remote = %self.remote, "unmount called on an already unmounted remote");
            return false;
        };
        self.parent_navigate = None;
        self.keep_alive.clear();
        teardown();
        tracing::info!(remote = %self.remote, "remote unmounted");
        true
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        if self.is_mounted() {
            self.unmount();
        }
    }
}

impl std::fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountHandle")
            .field("remote", &self.remote)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// The capability object a remote exposes to hosts.
pub trait RemoteApp: Send + Sync {
    fn name(&self) -> &str;

    /// Render the remote into `target`. `target` must be attached.
    fn mount(&self, target: &Container, options: MountOptions) -> Result<MountHandle>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use crate::route_table;
    use ratatui::{Terminal, backend::TestBackend, widgets::Paragraph};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal remote used across the crate's tests.
    pub(crate) struct EchoRemote {
        pub inits: Arc<AtomicUsize>,
        pub shutdowns: Arc<AtomicUsize>,
        pub router: Arc<Mutex<Option<RemoteRouter<&'static str>>>>,
    }

    impl EchoRemote {
        pub(crate) fn new() -> Self {
            Self {
                inits: Arc::new(AtomicUsize::new(0)),
                shutdowns: Arc::new(AtomicUsize::new(0)),
                router: Arc::new(Mutex::new(None)),
            }
        }

        pub(crate) fn router(&self) -> RemoteRouter<&'static str> {
            self.router.lock().unwrap().clone().expect("remote is mounted")
        }
    }

    struct EchoView {
        router: RemoteRouter<&'static str>,
        inits: Arc<AtomicUsize>,
        shutdowns: Arc<AtomicUsize>,
    }

    impl Component for EchoView {
        fn on_init(&mut self, _cx: &mut Context<Self>) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }

        fn on_shutdown(&mut self, _cx: &mut Context<Self>) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }

        fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
            let text = format!("at {}", self.router.location());
            frame.render_widget(Paragraph::new(text), cx.area);
        }
    }

    impl RemoteApp for EchoRemote {
        fn name(&self) -> &str {
            "echo"
        }

        fn mount(&self, target: &Container, options: MountOptions) -> Result<MountHandle> {
            let router = options.create_router(
                "/workshops",
                route_table! {
                    "/workshops" => "list",
                    "/workshops/:id" => "details",
                },
            );
            let forward = options.connect(&router);
            let view = EchoView {
                router: router.clone(),
                inits: Arc::clone(&self.inits),
                shutdowns: Arc::clone(&self.shutdowns),
            };
            let handle = MountHandle::for_view(target, self.name(), view)?;
            *self.router.lock().unwrap() = Some(router.clone());

            Ok(handle
                .hold(forward)
                .with_parent_navigate(move |next| router.sync(next)))
        }
    }

    fn attached() -> (Container, AppContext) {
        let (app, _rx) = AppContext::new();
        let container = Container::new("content");
        container.attach(&app);
        (container, app)
    }

    fn screen_text(container: &Container) -> String {
        let mut terminal = Terminal::new(TestBackend::new(30, 1)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                container.render(frame, area);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_mount_into_detached_container_fails() {
        let remote = EchoRemote::new();
        let container = Container::new("content");
        let err = remote.mount(&container, MountOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidMountTarget { .. }));
        assert_eq!(remote.inits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_container_accepts_one_remote() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let _first = remote.mount(&container, MountOptions::new()).unwrap();
        let err = remote.mount(&container, MountOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ContainerOccupied { ref owner, .. } if owner == "echo"));
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let mut handle = remote.mount(&container, MountOptions::new()).unwrap();
        assert_eq!(remote.inits.load(Ordering::SeqCst), 1);
        assert!(container.is_occupied());

        assert!(handle.unmount());
        assert!(!handle.unmount());
        assert_eq!(remote.shutdowns.load(Ordering::SeqCst), 1);
        assert!(!container.is_occupied());
        drop(handle);
        assert_eq!(remote.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unmounts() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let handle = remote.mount(&container, MountOptions::new()).unwrap();
        drop(handle);
        assert_eq!(remote.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(container.owner(), None);
    }

    #[test]
    fn test_parent_navigate_does_not_reach_on_navigate() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let forwarded = Arc::new(AtomicUsize::new(0));
        let options = {
            let forwarded = Arc::clone(&forwarded);
            MountOptions::new()
                .initial_path("/workshops")
                .on_navigate(move |_| {
                    forwarded.fetch_add(1, Ordering::SeqCst);
                })
        };
        let handle = remote.mount(&container, options).unwrap();

        assert!(handle.on_parent_navigate(&Location::parse("/workshops/5")));
        assert!(!handle.on_parent_navigate(&Location::parse("/workshops/5")));
        assert_eq!(remote.router().location().pathname, "/workshops/5");
        assert_eq!(forwarded.load(Ordering::SeqCst), 0);

        remote.router().navigate("/workshops/7");
        assert_eq!(forwarded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unmount_releases_router_subscription() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let forwarded = Arc::new(AtomicUsize::new(0));
        let options = {
            let forwarded = Arc::clone(&forwarded);
            MountOptions::new().on_navigate(move |_| {
                forwarded.fetch_add(1, Ordering::SeqCst);
            })
        };
        let mut handle = remote.mount(&container, options).unwrap();
        let router = remote.router();
        handle.unmount();

        router.navigate("/workshops/1");
        assert_eq!(forwarded.load(Ordering::SeqCst), 0);
        assert!(!handle.on_parent_navigate(&Location::parse("/workshops/2")));
        assert_eq!(router.location().pathname, "/workshops/1");
    }

    #[test]
    fn test_container_renders_mounted_view() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        assert!(screen_text(&container).trim().is_empty());

        let _handle = remote
            .mount(&container, MountOptions::new().initial_path("/workshops/5"))
            .unwrap();
        assert!(screen_text(&container).starts_with("at /workshops/5"));
    }

    #[test]
    fn test_standalone_mount_uses_default_history() {
        let remote = EchoRemote::new();
        let (container, _app) = attached();
        let history = BrowserHistory::new("/workshops/3");
        let _handle = remote
            .mount(&container, MountOptions::new().default_history(history.clone()))
            .unwrap();

        assert_eq!(remote.router().location().pathname, "/workshops/3");
        remote.router().navigate("/workshops");
        assert_eq!(history.location().pathname, "/workshops");
    }
}
