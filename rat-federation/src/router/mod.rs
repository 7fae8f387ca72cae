//! Router module.
//!
//! Provides `RouteTable` path matching, the `route_table!` macro and the
//! `RemoteRouter` that remote applications navigate with.

pub mod remote;
pub mod routes;

pub use remote::RemoteRouter;
pub use routes::{RouteMatch, RoutePattern, RouteTable};
