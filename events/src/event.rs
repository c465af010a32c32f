//! Event descriptors and the view a listener gets of one invocation.

use std::{any::Any, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Scope;

/// Descriptor built for every dispatch: the event type and its payload.
///
/// Serializes as `{"type": ..., "parameters": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The event type being dispatched.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Arbitrary payload supplied by the dispatcher, commonly an object.
    pub parameters: Value,
}

impl Event {
    /// Create an event descriptor.
    pub fn new(event_type: impl Into<String>, parameters: Value) -> Self {
        Self {
            event_type: event_type.into(),
            parameters,
        }
    }

    /// The descriptor as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.event_type,
            "parameters": self.parameters,
        })
    }
}

/// Everything a callback receives for one invocation.
///
/// `args` holds the dispatch-time arguments followed by the listener's bound
/// arguments, in that order.
pub struct Invocation<'a> {
    scope: Option<&'a Rc<dyn Scope>>,
    event: &'a Event,
    args: Vec<Value>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        scope: Option<&'a Rc<dyn Scope>>,
        event: &'a Event,
        dispatch_args: &[Value],
        bound_args: &[Value],
    ) -> Self {
        let mut args = Vec::with_capacity(dispatch_args.len() + bound_args.len());
        args.extend_from_slice(dispatch_args);
        args.extend_from_slice(bound_args);
        Self { scope, event, args }
    }

    /// The receiver the listener was registered with, if any.
    #[inline]
    pub fn scope(&self) -> Option<&'a Rc<dyn Scope>> {
        self.scope
    }

    /// The receiver downcast to its concrete type.
    pub fn scope_as<T: Any>(&self) -> Option<&'a T> {
        let scope: &'a dyn Scope = &**self.scope?;
        scope.downcast_ref::<T>()
    }

    /// The event descriptor.
    #[inline]
    pub fn event(&self) -> &'a Event {
        self.event
    }

    /// Dispatch arguments followed by bound arguments.
    #[inline]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Single argument by position within [`args`](Self::args).
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// The full positional argument list: the event descriptor first, then
    /// dispatch arguments, then bound arguments.
    pub fn positional(&self) -> Vec<Value> {
        let mut all = Vec::with_capacity(self.args.len() + 1);
        all.push(self.event.to_value());
        all.extend(self.args.iter().cloned());
        all
    }
}
