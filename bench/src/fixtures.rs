//! Scopes and pre-populated buses shared by the benchmarks.

use std::{cell::Cell, rc::Rc};

use rusty_events::{Callback, EventBus, Scope};
use serde_json::{Value, json};

// =============================================================================
// Scopes
// =============================================================================

/// A UI widget receiving events.
#[derive(Scope, Debug, Default)]
pub struct Widget {
    pub id: usize,
    pub redraws: Cell<u32>,
}

/// Heads-up display, labelled differently from its type name.
#[derive(Scope, Debug, Default)]
#[scope(class_name = "HUD")]
pub struct Hud;

/// A scope with no display name.
#[derive(Scope, Debug, Default)]
#[scope(anonymous)]
pub struct Detached;

// =============================================================================
// Callbacks
// =============================================================================

/// A callback that does nothing.
pub fn noop() -> Callback {
    Callback::infallible(|_| {})
}

/// A callback that bumps the redraw counter of its `Widget` scope.
pub fn redraw() -> Callback {
    Callback::infallible(|inv| {
        if let Some(widget) = inv.scope_as::<Widget>() {
            widget.redraws.set(widget.redraws.get() + 1);
        }
    })
}

// =============================================================================
// Buses
// =============================================================================

/// Name of the `i`-th event type used by the fixtures.
pub fn event_type(i: usize) -> String {
    format!("event-{i}")
}

/// A bus with `types` event types, each with `per_type` widget listeners
/// carrying one bound argument.
pub fn populated_bus(types: usize, per_type: usize) -> EventBus {
    let bus = EventBus::new();
    let callback = redraw();
    for t in 0..types {
        for id in 0..per_type {
            let scope: Rc<dyn Scope> = Rc::new(Widget {
                id,
                ..Default::default()
            });
            bus.register(event_type(t), callback.clone(), Some(scope), vec![json!(id)]);
        }
    }
    bus
}

/// Typical small payload.
pub fn payload() -> Value {
    json!({ "x": 10, "y": 20, "button": "left" })
}
