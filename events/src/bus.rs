//! The event registry and dispatcher.
//!
//! This module provides [`EventBus`], which maps event-type strings to ordered
//! lists of [`Listener`]s and invokes them synchronously on dispatch.
//!
//! # Overview
//!
//! - **Registration**: [`register()`](EventBus::register) appends a listener;
//!   registration order is delivery order and duplicates are allowed.
//! - **Dispatch**: [`dispatch()`](EventBus::dispatch) snapshots the listeners of
//!   an event type and calls each one with the event descriptor, the dispatch
//!   arguments and the listener's bound arguments.
//! - **Lookup**: [`unregister()`](EventBus::unregister) answers whether a
//!   listener is registered. Whether it also removes it is a [`Config`] choice.
//!
//! # Re-entrancy
//!
//! Every operation takes `&self`. The registry sits in a `RefCell` and no borrow
//! is held while a callback runs, so listeners may register, unregister or
//! dispatch on the same bus. Changes made during a pass do not affect the
//! listeners of that pass; a nested dispatch sees the registry as it is now.
//!
//! # Example
//!
//! ```rust,ignore
//! use rusty_events::{Callback, EventBus, NamedScope};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//!
//! let on_ping = Callback::infallible(|inv| {
//!     // [{"type": "ping", "parameters": {"x": 1}}, "extra", 1, 2]
//!     println!("{:?}", inv.positional());
//! });
//! bus.register("ping", on_ping, Some(NamedScope::shared("S")), vec![json!(1), json!(2)]);
//!
//! bus.dispatch("ping", json!({"x": 1}), &[json!("extra")])?;
//! ```

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use log::{debug, trace, warn};
use serde_json::Value;

use crate::{
    Callback, Config, Error, Event, Invocation, Listener, Result, Scope, UnregisterMode,
    listener::scope_label,
};

/// Listener lists keyed by event type.
///
/// Keys are created on first registration and never deleted. `order` remembers
/// key creation order for diagnostics.
#[derive(Debug, Default)]
struct Registry {
    order: Vec<String>,
    listeners: HashMap<String, Vec<Listener>>,
}

impl Registry {
    fn push(&mut self, event_type: String, listener: Listener) -> usize {
        if !self.listeners.contains_key(&event_type) {
            self.order.push(event_type.clone());
        }
        let list = self.listeners.entry(event_type).or_default();
        list.push(listener);
        list.len()
    }

    fn get(&self, event_type: &str) -> Option<&Vec<Listener>> {
        self.listeners.get(event_type)
    }

    fn get_mut(&mut self, event_type: &str) -> Option<&mut Vec<Listener>> {
        self.listeners.get_mut(event_type)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &[Listener])> {
        self.order.iter().map(|event_type| {
            let list = self
                .listeners
                .get(event_type)
                .map(Vec::as_slice)
                .unwrap_or_default();
            (event_type.as_str(), list)
        })
    }
}

/// In-process publish/subscribe registry.
///
/// Each bus owns an independent registry; there is no global instance. Share
/// one through `Rc<EventBus>` when several parts of an application need it.
///
/// `EventBus` is single-threaded: it is neither `Send` nor `Sync`.
#[derive(Debug, Default)]
pub struct EventBus {
    registry: RefCell<Registry>,
    config: Config,
}

impl EventBus {
    /// Create an empty bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty bus with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            registry: RefCell::new(Registry::default()),
            config,
        }
    }

    /// The configuration this bus was created with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `callback` for `event_type`.
    ///
    /// The listener is appended after every listener already registered for the
    /// type. Registering the same callback and scope twice yields two
    /// independent invocations per dispatch.
    ///
    /// # Parameters
    ///
    /// - `event_type`: case-sensitive event name
    /// - `callback`: procedure to run on dispatch
    /// - `scope`: receiver handed to the callback, if any
    /// - `bound_args`: values appended after the dispatch arguments on every call
    pub fn register(
        &self,
        event_type: impl Into<String>,
        callback: Callback,
        scope: Option<Rc<dyn Scope>>,
        bound_args: Vec<Value>,
    ) {
        let event_type = event_type.into();
        let listener = Listener::new(callback, scope.clone(), bound_args);

        let count = self.registry.borrow_mut().push(event_type.clone(), listener);

        debug!(
            "{} registered for \"{event_type}\" ({count} listening)",
            scope_label(scope.as_deref())
        );
    }

    /// Register a callback with no scope and no bound arguments.
    pub fn on(&self, event_type: impl Into<String>, callback: Callback) {
        self.register(event_type, callback, None, Vec::new());
    }

    /// Look up a listener for `event_type`.
    ///
    /// # Returns
    ///
    /// - `false` if nothing was ever registered for `event_type`.
    /// - With neither `callback` nor `scope`: `true` if any listener is registered.
    /// - Otherwise `true` if a listener holds `callback` and, when `scope` is
    ///   given, that exact scope.
    ///
    /// Under [`UnregisterMode::Report`] (the default) the registry is never
    /// modified. Under [`UnregisterMode::Remove`] the first match is removed;
    /// the filterless form still removes nothing.
    pub fn unregister(
        &self,
        event_type: &str,
        callback: Option<&Callback>,
        scope: Option<&Rc<dyn Scope>>,
    ) -> bool {
        let mut registry = self.registry.borrow_mut();
        let Some(list) = registry.get_mut(event_type) else {
            debug!("unregister: no listeners were ever registered for \"{event_type}\"");
            return false;
        };

        let Some(callback) = callback else {
            if scope.is_none() {
                return !list.is_empty();
            }
            // A scope alone never matches: every listener holds a callback.
            return false;
        };

        let Some(position) = list
            .iter()
            .position(|listener| listener.matches(callback, scope))
        else {
            return false;
        };

        if self.config.unregister == UnregisterMode::Remove {
            let removed = list.remove(position);
            let remaining = list.len();
            // The record may own the last handle to its scope; drop it unborrowed.
            drop(registry);
            debug!(
                "{} removed from \"{event_type}\" ({remaining} listening)",
                removed.label()
            );
        }
        true
    }

    /// Dispatch `event_type` to every listener registered for it.
    ///
    /// Each listener receives an [`Invocation`] carrying its scope, the
    /// `{type, parameters}` descriptor and `args` followed by its bound
    /// arguments. Listeners run in registration order over a snapshot taken
    /// before the first one is called.
    ///
    /// Dispatching a type with no listeners does nothing.
    ///
    /// # Errors
    ///
    /// The first listener to fail aborts the pass; later listeners are not
    /// called and the failure is returned as [`Error::Listener`].
    pub fn dispatch(&self, event_type: &str, parameters: Value, args: &[Value]) -> Result<()> {
        let snapshot = match self.registry.borrow().get(event_type) {
            Some(list) => list.clone(),
            None => return Ok(()),
        };

        let event = Event::new(event_type, parameters);
        debug!(
            "dispatching \"{event_type}\" to {} listener(s)",
            snapshot.len()
        );

        for (index, listener) in snapshot.iter().enumerate() {
            if self.config.trace_dispatch {
                trace!("\"{event_type}\" -> {} (#{index})", listener.label());
            }

            let invocation = Invocation::new(listener.scope(), &event, args, listener.bound_args());
            if let Err(source) = listener.callback().call(&invocation) {
                warn!(
                    "{} failed handling \"{event_type}\": {source}",
                    listener.label()
                );
                return Err(Error::Listener {
                    event_type: event_type.to_owned(),
                    index,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Dispatch with a payload and no extra arguments.
    pub fn emit(&self, event_type: &str, parameters: Value) -> Result<()> {
        self.dispatch(event_type, parameters, &[])
    }

    /// Human-readable report of every listener.
    ///
    /// One line per listener, `<label> listen for "<event_type>"`, where the label
    /// is the scope's class name or `anonymous`. Event types appear in the
    /// order they were first registered.
    pub fn describe_listeners(&self) -> String {
        let registry = self.registry.borrow();
        let mut out = String::new();
        for (event_type, listeners) in registry.iter() {
            for listener in listeners {
                out.push_str(listener.label());
                out.push_str(" listen for \"");
                out.push_str(event_type);
                out.push_str("\"\n");
            }
        }
        out
    }

    /// Number of listeners currently registered for `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.registry.borrow().get(event_type).map_or(0, Vec::len)
    }

    /// Number of listeners across all event types.
    pub fn total_listener_count(&self) -> usize {
        self.registry.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Every event type that has ever had a listener, in creation order.
    pub fn event_types(&self) -> Vec<String> {
        self.registry.borrow().order.clone()
    }

    /// Returns `true` if a listener was ever registered for `event_type`.
    ///
    /// This stays `true` after the listeners are removed.
    pub fn has_event_type(&self, event_type: &str) -> bool {
        self.registry.borrow().listeners.contains_key(event_type)
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe_listeners())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListenerError, NamedScope};
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Weak;

    /// A callback that appends the listener's name and positional args to `log`.
    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<(String, Vec<Value>)>>>) -> Callback {
        let log = Rc::clone(log);
        Callback::infallible(move |inv| log.borrow_mut().push((name.into(), inv.positional())))
    }

    fn counter(hits: &Rc<Cell<usize>>) -> Callback {
        let hits = Rc::clone(hits);
        Callback::infallible(move |_| hits.set(hits.get() + 1))
    }

    // ==================== Registration ====================

    #[test]
    fn new_bus_is_empty() {
        let bus = EventBus::new();

        assert_eq!(bus.total_listener_count(), 0);
        assert!(bus.event_types().is_empty());
        assert_eq!(bus.describe_listeners(), "");
    }

    #[test]
    fn register_creates_key_lazily() {
        let bus = EventBus::new();
        assert!(!bus.has_event_type("ping"));

        bus.on("ping", Callback::infallible(|_| {}));

        assert!(bus.has_event_type("ping"));
        assert_eq!(bus.listener_count("ping"), 1);
    }

    #[test]
    fn register_allows_duplicates() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let callback = counter(&hits);
        let scope = NamedScope::shared("S");

        bus.register("ping", callback.clone(), Some(Rc::clone(&scope)), vec![]);
        bus.register("ping", callback, Some(scope), vec![]);
        bus.emit("ping", Value::Null).unwrap();

        assert_eq!(bus.listener_count("ping"), 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn event_types_are_case_sensitive() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        bus.on("Ping", counter(&hits));

        bus.emit("ping", Value::Null).unwrap();

        assert_eq!(hits.get(), 0);
        assert_eq!(bus.event_types(), vec!["Ping".to_string()]);
    }

    // ==================== Dispatch ====================

    #[test]
    fn dispatch_delivers_in_registration_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("ping", recorder("a", &log));
        bus.on("ping", recorder("b", &log));
        bus.on("ping", recorder("c", &log));

        bus.emit("ping", Value::Null).unwrap();

        let names: Vec<_> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn dispatch_appends_bound_args_after_dispatch_args() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let scope = NamedScope::shared("S");
        bus.register(
            "ping",
            Callback::infallible(move |inv| {
                let receiver = inv.scope_as::<NamedScope>().map(|s| s.name().to_owned());
                *sink.borrow_mut() = Some((receiver, inv.positional()));
            }),
            Some(scope),
            vec![json!(1), json!(2)],
        );

        bus.dispatch("ping", json!({"x": 1}), &[json!("extra")]).unwrap();

        let (receiver, args) = seen.borrow_mut().take().unwrap();
        assert_eq!(receiver.as_deref(), Some("S"));
        assert_eq!(
            args,
            vec![
                json!({"type": "ping", "parameters": {"x": 1}}),
                json!("extra"),
                json!(1),
                json!(2),
            ]
        );
    }

    #[test]
    fn dispatch_unknown_type_is_noop() {
        let bus = EventBus::new();

        assert!(bus.dispatch("nothing", json!({}), &[json!(1)]).is_ok());
        assert!(!bus.has_event_type("nothing"));
    }

    #[test]
    fn dispatch_stops_at_first_failure() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        bus.on("ping", counter(&hits));
        bus.on("ping", Callback::new(|_| Err(ListenerError::new("boom"))));
        bus.on("ping", counter(&hits));

        let err = bus.emit("ping", Value::Null).unwrap_err();

        assert_eq!(hits.get(), 1);
        assert_eq!(
            err,
            Error::Listener {
                event_type: "ping".into(),
                index: 1,
                source: ListenerError::new("boom"),
            }
        );
    }

    #[test]
    fn trace_dispatch_does_not_change_delivery() {
        let bus = EventBus::with_config(Config::default().with_trace_dispatch(true));
        let hits = Rc::new(Cell::new(0));
        bus.on("ping", counter(&hits));

        bus.emit("ping", Value::Null).unwrap();

        assert_eq!(hits.get(), 1);
        assert!(bus.config().trace_dispatch);
    }

    // ==================== Re-entrancy ====================

    #[test]
    fn registration_during_dispatch_applies_to_next_pass() {
        let bus = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));

        let inner_bus = Rc::clone(&bus);
        let inner_hits = Rc::clone(&hits);
        bus.on(
            "ping",
            Callback::infallible(move |_| inner_bus.on("ping", counter(&inner_hits))),
        );

        bus.emit("ping", Value::Null).unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.listener_count("ping"), 2);

        bus.emit("ping", Value::Null).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count("ping"), 3);
    }

    #[test]
    fn removal_during_dispatch_does_not_skip_snapshot() {
        let bus = Rc::new(EventBus::with_config(
            Config::default().with_unregister(UnregisterMode::Remove),
        ));
        let hits = Rc::new(Cell::new(0));
        let victim = counter(&hits);

        let inner_bus = Rc::clone(&bus);
        let target = victim.clone();
        bus.on(
            "ping",
            Callback::infallible(move |_| {
                inner_bus.unregister("ping", Some(&target), None);
            }),
        );
        bus.on("ping", victim);

        bus.emit("ping", Value::Null).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count("ping"), 1);

        bus.emit("ping", Value::Null).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn nested_dispatch_sees_current_registry() {
        let bus = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));

        let inner_bus = Rc::clone(&bus);
        let inner_hits = Rc::clone(&hits);
        bus.on(
            "outer",
            Callback::new(move |_| {
                inner_bus.on("inner", counter(&inner_hits));
                inner_bus
                    .emit("inner", Value::Null)
                    .map_err(|err| ListenerError::new(err.to_string()))
            }),
        );

        bus.emit("outer", Value::Null).unwrap();

        assert_eq!(hits.get(), 1);
    }

    // ==================== Unregister ====================

    #[test]
    fn unregister_unknown_type_is_false() {
        let bus = EventBus::new();

        assert!(!bus.unregister("unknown-type", None, None));
    }

    #[test]
    fn unregister_without_filters_reports_presence_only() {
        let bus = EventBus::new();
        bus.on("ping", Callback::infallible(|_| {}));

        assert!(bus.unregister("ping", None, None));
        assert_eq!(bus.listener_count("ping"), 1);
    }

    #[test]
    fn unregister_matches_callback_and_scope() {
        let bus = EventBus::new();
        let callback = Callback::infallible(|_| {});
        let scope = NamedScope::shared("S");
        let stranger = NamedScope::shared("S");
        bus.register("ping", callback.clone(), Some(Rc::clone(&scope)), vec![]);

        assert!(bus.unregister("ping", Some(&callback), None));
        assert!(bus.unregister("ping", Some(&callback), Some(&scope)));
        assert!(!bus.unregister("ping", Some(&callback), Some(&stranger)));
        assert!(!bus.unregister("ping", Some(&Callback::infallible(|_| {})), None));
        assert!(!bus.unregister("ping", None, Some(&scope)));
        assert_eq!(bus.listener_count("ping"), 1);
    }

    #[test]
    fn unregister_report_mode_never_removes() {
        let bus = EventBus::new();
        let callback = Callback::infallible(|_| {});
        bus.on("ping", callback.clone());

        assert!(bus.unregister("ping", Some(&callback), None));
        assert!(bus.unregister("ping", Some(&callback), None));
        assert_eq!(bus.listener_count("ping"), 1);
    }

    #[test]
    fn unregister_remove_mode_removes_first_match() {
        let bus = EventBus::with_config(Config::default().with_unregister(UnregisterMode::Remove));
        let callback = Callback::infallible(|_| {});
        bus.on("ping", callback.clone());
        bus.on("ping", callback.clone());

        assert!(bus.unregister("ping", Some(&callback), None));
        assert_eq!(bus.listener_count("ping"), 1);
        assert!(bus.unregister("ping", Some(&callback), None));
        assert_eq!(bus.listener_count("ping"), 0);
        assert!(!bus.unregister("ping", Some(&callback), None));

        // Key persists as an empty list.
        assert!(bus.has_event_type("ping"));
        assert!(!bus.unregister("ping", None, None));
    }

    struct Watcher {
        bus: Weak<EventBus>,
        seen: Rc<Cell<Option<usize>>>,
    }

    impl Scope for Watcher {}

    impl Drop for Watcher {
        fn drop(&mut self) {
            if let Some(bus) = self.bus.upgrade() {
                self.seen.set(Some(bus.listener_count("ping")));
            }
        }
    }

    #[test]
    fn removed_scope_may_touch_bus_when_dropped() {
        let bus = Rc::new(EventBus::with_config(
            Config::default().with_unregister(UnregisterMode::Remove),
        ));
        let seen = Rc::new(Cell::new(None));
        let callback = Callback::infallible(|_| {});
        let scope: Rc<dyn Scope> = Rc::new(Watcher {
            bus: Rc::downgrade(&bus),
            seen: Rc::clone(&seen),
        });
        bus.register("ping", callback.clone(), Some(scope), vec![]);

        assert!(bus.unregister("ping", Some(&callback), None));

        assert_eq!(seen.get(), Some(0));
    }

    // ==================== Diagnostics ====================

    #[test]
    fn describe_listeners_labels_scopes() {
        let bus = EventBus::new();
        bus.register("bar", Callback::infallible(|_| {}), Some(NamedScope::shared("Foo")), vec![]);
        bus.on("bar", Callback::infallible(|_| {}));
        bus.on("baz", Callback::infallible(|_| {}));

        assert_eq!(
            bus.describe_listeners(),
            "Foo listen for \"bar\"\nanonymous listen for \"bar\"\nanonymous listen for \"baz\"\n"
        );
        assert_eq!(bus.to_string(), bus.describe_listeners());
    }

    #[test]
    fn describe_listeners_treats_empty_class_name_as_anonymous() {
        let bus = EventBus::new();
        bus.register("bar", Callback::infallible(|_| {}), Some(NamedScope::shared("")), vec![]);

        assert_eq!(bus.describe_listeners(), "anonymous listen for \"bar\"\n");
    }

    #[test]
    fn describe_listeners_follows_creation_order() {
        let bus = EventBus::new();
        for event_type in ["zeta", "alpha", "mid"] {
            bus.on(event_type, Callback::infallible(|_| {}));
        }

        assert_eq!(bus.event_types(), vec!["zeta", "alpha", "mid"]);
        assert!(bus.describe_listeners().starts_with("anonymous listen for \"zeta\""));
    }
}
