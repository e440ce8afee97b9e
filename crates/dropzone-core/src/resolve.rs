//! Value-or-resolver configuration fields.
//!
//! Options such as "can the user cancel?" are either a plain value or a
//! function of the current files and drop area state. [`Resolvable`]
//! holds either and is resolved lazily where the answer is needed.

use std::fmt;
use std::rc::Rc;

use crate::config::DropzoneExtra;
use crate::file::FileMeta;
use crate::status::Status;

/// A constant value or a function computing it from a context.
pub enum Resolvable<T, C> {
    /// Always this value.
    Constant(T),
    /// Computed from the context on every resolution.
    Computed(Rc<dyn Fn(&C) -> T>),
}

impl<T: Clone, C> Resolvable<T, C> {
    /// Wrap a resolver function.
    pub fn computed(resolver: impl Fn(&C) -> T + 'static) -> Self {
        Self::Computed(Rc::new(resolver))
    }

    /// Resolve against `context`.
    pub fn resolve(&self, context: &C) -> T {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Computed(resolver) => resolver(context),
        }
    }
}

impl<T, C> From<T> for Resolvable<T, C> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T: Clone, C> Clone for Resolvable<T, C> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Computed(resolver) => Self::Computed(Rc::clone(resolver)),
        }
    }
}

/// Constants compare by value, resolvers by identity.
impl<T: PartialEq, C> PartialEq for Resolvable<T, C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Computed(a), Self::Computed(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Resolvable<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Context handed to action resolvers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    /// Every tracked file, in display order.
    pub files: Vec<FileMeta>,
    /// Drop area state.
    pub extra: DropzoneExtra,
}

/// Which per-file actions are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    /// Abort the in-flight upload.
    pub cancel: bool,
    /// Remove the file.
    pub remove: bool,
    /// Re-enter the upload branch.
    pub restart: bool,
}

/// Caller switches for the per-file actions.
///
/// Each switch is combined with the status gate: a caller can hide an
/// action, never offer one the current status does not allow.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPolicy {
    /// Offer cancel while uploading.
    pub can_cancel: Resolvable<bool, ActionContext>,
    /// Offer remove.
    pub can_remove: Resolvable<bool, ActionContext>,
    /// Offer restart after a failure, abort, or while ready.
    pub can_restart: Resolvable<bool, ActionContext>,
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            can_cancel: Resolvable::Constant(true),
            can_remove: Resolvable::Constant(true),
            can_restart: Resolvable::Constant(true),
        }
    }
}

impl ActionPolicy {
    /// Actions available for a file in `status`.
    #[must_use]
    pub fn actions(&self, status: Status, context: &ActionContext) -> Actions {
        Actions {
            cancel: status.allows_cancel() && self.can_cancel.resolve(context),
            remove: status.allows_remove() && self.can_remove.resolve(context),
            restart: status.allows_restart() && self.can_restart.resolve(context),
        }
    }
}
