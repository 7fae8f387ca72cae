//! Runtime composition of independently built terminal applications.
//!
//! A host owns a `BrowserHistory` and mounts remotes into `Container`s. A
//! `NavigationBridge` keeps the host history and the remote's `RemoteRouter`
//! convergent, and a `ThemeChannel` broadcasts the shared theme.

pub mod application;
pub mod bridge;
pub mod component;
pub mod error;
pub mod history;
pub mod location;
pub mod mount;
pub mod registry;
pub mod router;
pub mod state;
pub mod subscription;
pub mod theme;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::{AppContext, Application, Context, EventContext};
pub use bridge::NavigationBridge;
pub use component::{Action, AnyComponent, Component, Event};
pub use history::{BrowserHistory, HistoryAction, HistoryUpdate};
pub use location::{Location, NavigationEvent, Origin};
pub use mount::{Container, MountHandle, MountOptions, NavigateCallback, RemoteApp, forward_navigation};
pub use registry::{RemoteLoader, RemoteRegistry};
pub use router::{RemoteRouter, RouteMatch, RouteTable};
pub use state::{Entity, WeakEntity};
pub use subscription::{Listeners, Subscription};
pub use theme::{Theme, ThemeChannel, get_contrast};
