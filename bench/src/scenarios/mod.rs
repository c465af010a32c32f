//! Realistic bus usage scenarios.
//!
//! # Scenarios
//!
//! - **UI**: many widgets listening on a handful of input events, with
//!   listeners that dispatch follow-up events and occasionally subscribe new
//!   listeners mid-pass

pub mod ui;

pub use ui::{UiConfig, UiScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Brief description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Number of listeners currently registered.
    fn listener_count(&self) -> usize;

    /// Set up the scenario (register listeners, initialize state).
    fn setup(&mut self);

    /// Run one "frame" of the scenario.
    fn update(&mut self);

    /// Clean up the scenario.
    fn teardown(&mut self);
}
