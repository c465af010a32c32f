//! # rusty_events
//!
//! A small in-process publish/subscribe registry.
//!
//! Callers register interest in named event types; [`EventBus::dispatch`]
//! synchronously invokes every matching callback with the event descriptor,
//! the dispatch arguments, a receiver [`Scope`] and arguments bound at
//! registration time.
//!
//! - [`EventBus`]: the registry and dispatcher.
//! - [`Listener`] / [`Callback`]: one registered interest and its procedure.
//! - [`Scope`]: receiver objects, usually via `#[derive(Scope)]`.
//! - [`Event`] / [`Invocation`]: what a callback sees.
//! - [`Config`]: unregister behavior and dispatch tracing.
//!
//! Logging goes through the `log` facade; this crate never installs a logger.

// Lets `#[derive(Scope)]` expand to `::rusty_events::Scope` inside this crate too.
extern crate self as rusty_events;

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod listener;
pub mod scope;

pub use bus::EventBus;
pub use config::{Config, UnregisterMode};
pub use error::{Error, ListenerError, Result};
pub use event::{Event, Invocation};
pub use listener::{Callback, Listener};
pub use scope::{AsAny, NamedScope, Scope};

pub use rusty_events_macros::Scope;
