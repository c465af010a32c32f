//! Receivers that listeners are registered against.
//!
//! A scope is the object a callback is "invoked on". The bus never owns or
//! inspects the scope beyond two things:
//!
//! - **Identity**: two scopes are the same scope when they are the same shared
//!   allocation (`Rc::ptr_eq`), which is what [`unregister`](crate::EventBus::unregister)
//!   compares.
//! - **Display name**: [`Scope::class_name`] labels the scope in
//!   [`describe_listeners`](crate::EventBus::describe_listeners).
//!
//! # Example
//!
//! ```rust,ignore
//! use rusty_events::Scope;
//!
//! #[derive(Scope)]
//! struct Player {
//!     health: u32,
//! }
//!
//! let player: Rc<dyn Scope> = Rc::new(Player { health: 10 });
//! assert_eq!(player.class_name(), Some("Player"));
//! ```

use std::{any::Any, fmt, rc::Rc};

/// Upcast helper so any scope can be downcast back to its concrete type.
///
/// Implemented for every `'static` type; there is no reason to implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A receiver object that a listener callback is invoked with.
///
/// Usually implemented with `#[derive(Scope)]`, which reports the struct name
/// as the class name.
pub trait Scope: AsAny {
    /// Display name used by listener diagnostics. `None` renders as `anonymous`.
    fn class_name(&self) -> Option<&str> {
        None
    }
}

impl dyn Scope {
    /// Attempt to view this scope as its concrete type.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete type of this scope is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("class_name", &self.class_name())
            .finish()
    }
}

/// Returns `true` if both optional scopes are the same allocation (or both absent).
#[inline]
pub(crate) fn same_scope(a: Option<&Rc<dyn Scope>>, b: Option<&Rc<dyn Scope>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A scope that carries nothing but a label.
///
/// Handy when the callback closure already captures its state and the scope
/// only exists to give the listener a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedScope(String);

impl NamedScope {
    /// Create a named scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a named scope already wrapped for registration.
    pub fn shared(name: impl Into<String>) -> Rc<dyn Scope> {
        Rc::new(Self::new(name))
    }

    /// The label.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Scope for NamedScope {
    fn class_name(&self) -> Option<&str> {
        Some(&self.0)
    }
}
