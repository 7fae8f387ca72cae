//! Component module.
//!
//! Defines the `Component` trait and its dyn-compatible twin `AnyComponent`.

pub mod traits;

pub use traits::{Action, AnyComponent, Component, Event};
