//! Listener records and the callbacks they hold.

use std::{fmt, rc::Rc};

use serde_json::Value;

use crate::{Invocation, ListenerError, Scope, scope::same_scope};

type CallbackFn = dyn Fn(&Invocation<'_>) -> Result<(), ListenerError>;

/// A shared handle to a listener procedure.
///
/// Cloning a `Callback` clones the handle, not the procedure. Two callbacks are
/// equal when they are clones of the same handle, which is how
/// [`unregister`](crate::EventBus::unregister) matches them.
///
/// ```rust,ignore
/// let on_ping = Callback::new(|inv| {
///     println!("got {}", inv.event().event_type);
///     Ok(())
/// });
/// bus.register("ping", on_ping.clone(), None, vec![]);
/// assert!(bus.unregister("ping", Some(&on_ping), None));
/// ```
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    /// Wrap a fallible procedure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<(), ListenerError> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wrap a procedure that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) + 'static,
    {
        Self::new(move |invocation| {
            f(invocation);
            Ok(())
        })
    }

    /// Run the procedure.
    #[inline]
    pub fn call(&self, invocation: &Invocation<'_>) -> Result<(), ListenerError> {
        (self.0)(invocation)
    }

    /// Returns `true` if both handles point at the same procedure.
    #[inline]
    pub fn same(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// One registered interest: a callback, its receiver and its bound arguments.
///
/// The event type is the registry key and is not repeated here.
#[derive(Clone, Debug)]
pub struct Listener {
    /// Receiver the callback is invoked with.
    scope: Option<Rc<dyn Scope>>,

    /// The procedure to run.
    callback: Callback,

    /// Values appended after the dispatch arguments on every invocation.
    bound_args: Vec<Value>,
}

impl Listener {
    /// Create a listener record.
    pub fn new(callback: Callback, scope: Option<Rc<dyn Scope>>, bound_args: Vec<Value>) -> Self {
        Self {
            scope,
            callback,
            bound_args,
        }
    }

    /// The receiver, if any.
    #[inline]
    pub fn scope(&self) -> Option<&Rc<dyn Scope>> {
        self.scope.as_ref()
    }

    /// The callback handle.
    #[inline]
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Arguments captured at registration.
    #[inline]
    pub fn bound_args(&self) -> &[Value] {
        &self.bound_args
    }

    /// Label used by listener diagnostics: the scope's class name or `anonymous`.
    pub fn label(&self) -> &str {
        scope_label(self.scope.as_deref())
    }

    /// Returns `true` if this listener holds `callback` and, when a scope
    /// filter is given, that exact scope.
    pub fn matches(&self, callback: &Callback, scope: Option<&Rc<dyn Scope>>) -> bool {
        if !self.callback.same(callback) {
            return false;
        }
        match scope {
            Some(_) => same_scope(self.scope.as_ref(), scope),
            None => true,
        }
    }
}

/// A scope's class name, or `anonymous` when there is no scope or the name is empty.
pub(crate) fn scope_label(scope: Option<&dyn Scope>) -> &str {
    scope
        .and_then(|scope| scope.class_name())
        .filter(|name| !name.is_empty())
        .unwrap_or("anonymous")
}
