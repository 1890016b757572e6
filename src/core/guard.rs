//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions that determine whether a transition
//! may execute. The controller evaluates them against a snapshot of its
//! state, so they can look at auxiliary fields (failure flags, door) and not
//! just the state value.

use std::fmt;
use std::sync::Arc;

/// Pure predicate over a context value `C`.
///
/// # Example
///
/// ```rust
/// use liftsim::core::Guard;
///
/// struct Flags {
///     emergency: bool,
/// }
///
/// let no_emergency = Guard::new(|f: &Flags| !f.emergency);
///
/// assert!(no_emergency.check(&Flags { emergency: false }));
/// assert!(!no_emergency.check(&Flags { emergency: true }));
/// ```
pub struct Guard<C> {
    predicate: Arc<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
