//! Bus configuration.
//!
//! ```rust,ignore
//! use rusty_events::{Config, EventBus, UnregisterMode};
//!
//! let mut cfg = Config::default();
//! cfg.unregister = UnregisterMode::Remove;
//! cfg.trace_dispatch = true;
//!
//! let bus = EventBus::with_config(cfg);
//! ```

use std::fmt;

/// What [`unregister`](crate::EventBus::unregister) does with a matched listener.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterMode {
    /// Report whether a matching listener exists; never mutate the registry.
    #[default]
    Report,
    /// Remove the first matching listener. The filterless form still only reports.
    Remove,
}

impl fmt::Display for UnregisterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnregisterMode::Report => write!(f, "report"),
            UnregisterMode::Remove => write!(f, "remove"),
        }
    }
}

/// Configuration for an [`EventBus`](crate::EventBus).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Behavior of `unregister` on a match.
    pub unregister: UnregisterMode,
    /// Log every listener invocation at `trace` level.
    pub trace_dispatch: bool,
}

impl Config {
    /// Same configuration with a different unregister mode.
    pub fn with_unregister(mut self, mode: UnregisterMode) -> Self {
        self.unregister = mode;
        self
    }

    /// Same configuration with invocation tracing toggled.
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }
}
