//! Errors surfaced by the event bus.
//!
//! Registration and unregistration never fail. The only fallible operation is
//! [`dispatch`](crate::EventBus::dispatch), and only because a listener failed:
//! the first listener returning [`ListenerError`] aborts the pass and the
//! failure propagates to the dispatching caller as [`Error::Listener`].

use std::borrow::Cow;

use thiserror::Error;

/// Failure reported by a listener callback.
///
/// Listeners needing isolation from each other must handle their own failures
/// and return `Ok(())`; the bus does not retry or skip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ListenerError {
    message: Cow<'static, str>,
}

impl ListenerError {
    /// Create a listener error with the given message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&'static str> for ListenerError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Errors produced by the event bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A listener failed; the remaining listeners of the pass were not invoked.
    #[error("listener #{index} for \"{event_type}\" failed: {source}")]
    Listener {
        /// The event type being dispatched.
        event_type: String,
        /// Position of the failing listener in the dispatch snapshot.
        index: usize,
        /// What the listener reported.
        source: ListenerError,
    },
}

impl Error {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::Listener { .. } => "listener_failed",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
