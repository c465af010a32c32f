//! UI event storm benchmark scenario.
//!
//! Simulates a widget tree driven by input events:
//! - 1,000 widgets, each listening on a random subset of input event types
//! - Every input listener dispatches a nested `redraw` event
//! - A HUD listener subscribes an extra `click` listener every N clicks
//!
//! This scenario tests:
//! - Dispatch fan-out and snapshot cost
//! - Nested (re-entrant) dispatch
//! - Registration while a pass is in flight

use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use rusty_events::{Callback, EventBus, ListenerError, Scope};
use serde_json::json;

use crate::fixtures::{Hud, Widget, noop};
use crate::scenarios::Scenario;

/// Input event types the widgets listen on.
pub const INPUT_TYPES: [&str; 4] = ["pointer-move", "click", "key", "scroll"];

/// Configuration for the UI benchmark.
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Number of widgets.
    pub widget_count: usize,
    /// Input events dispatched per frame.
    pub events_per_frame: usize,
    /// The HUD subscribes one more click listener every this many clicks (0 = never).
    pub subscribe_every: u64,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            widget_count: 1_000,
            events_per_frame: 16,
            subscribe_every: 64,
            seed: 12345,
        }
    }
}

/// UI event storm scenario.
pub struct UiScenario {
    config: UiConfig,
    bus: Rc<EventBus>,
    rng: ChaCha8Rng,
    widgets: Vec<Rc<Widget>>,
    clicks: Rc<Cell<u64>>,
    redraws: Rc<Cell<u64>>,
}

impl UiScenario {
    /// Create a new UI scenario with default config.
    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    /// Create a new UI scenario with the given config.
    pub fn with_config(config: UiConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            bus: Rc::new(EventBus::new()),
            rng,
            widgets: Vec::new(),
            clicks: Rc::new(Cell::new(0)),
            redraws: Rc::new(Cell::new(0)),
        }
    }

    /// The bus under test.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Total nested `redraw` events handled so far.
    pub fn redraws(&self) -> u64 {
        self.redraws.get()
    }

    /// Input listener shared by every widget: asks for a redraw of its widget.
    fn input_listener(bus: Weak<EventBus>) -> Callback {
        Callback::new(move |inv| {
            let Some(bus) = bus.upgrade() else {
                return Ok(());
            };
            let id = inv.scope_as::<Widget>().map_or(0, |w| w.id);
            bus.dispatch("redraw", json!({ "widget": id }), &[])
                .map_err(|err| ListenerError::new(err.to_string()))
        })
    }

    /// HUD listener: counts clicks and subscribes a new click listener mid-pass.
    fn click_counter(bus: Weak<EventBus>, clicks: Rc<Cell<u64>>, every: u64) -> Callback {
        Callback::infallible(move |_| {
            let count = clicks.get() + 1;
            clicks.set(count);
            if every > 0 && count % every == 0 {
                if let Some(bus) = bus.upgrade() {
                    bus.on("click", noop());
                }
            }
        })
    }
}

impl Default for UiScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for UiScenario {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn description(&self) -> &'static str {
        "Widgets fan out input events into nested redraw dispatches"
    }

    fn listener_count(&self) -> usize {
        self.bus.total_listener_count()
    }

    fn setup(&mut self) {
        let input = Self::input_listener(Rc::downgrade(&self.bus));

        for id in 0..self.config.widget_count {
            let widget = Rc::new(Widget {
                id,
                ..Default::default()
            });
            let listens = self.rng.gen_range(1..=INPUT_TYPES.len());
            for event_type in INPUT_TYPES.choose_multiple(&mut self.rng, listens) {
                let scope: Rc<dyn Scope> = widget.clone();
                self.bus
                    .register(*event_type, input.clone(), Some(scope), vec![json!(id)]);
            }
            self.widgets.push(widget);
        }

        let redraws = Rc::clone(&self.redraws);
        self.bus.register(
            "redraw",
            Callback::infallible(move |_| redraws.set(redraws.get() + 1)),
            Some(Rc::new(Hud)),
            Vec::new(),
        );
        self.bus.register(
            "click",
            Self::click_counter(
                Rc::downgrade(&self.bus),
                Rc::clone(&self.clicks),
                self.config.subscribe_every,
            ),
            Some(Rc::new(Hud)),
            Vec::new(),
        );
    }

    fn update(&mut self) {
        for _ in 0..self.config.events_per_frame {
            let event_type = INPUT_TYPES[self.rng.gen_range(0..INPUT_TYPES.len())];
            let parameters = json!({
                "x": self.rng.gen_range(0..1920),
                "y": self.rng.gen_range(0..1080),
            });
            self.bus
                .dispatch(event_type, parameters, &[])
                .expect("ui listeners do not fail");
        }
    }

    fn teardown(&mut self) {
        self.bus = Rc::new(EventBus::new());
        self.widgets.clear();
        self.clicks.set(0);
        self.redraws.set(0);
    }
}
