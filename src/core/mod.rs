//! Core state machine types and logic.
//!
//! This module contains the pure part of the controller:
//! - The closed set of elevator states via the `State` trait
//! - Guard predicates for transition control
//! - Append-only transition history
//!
//! Nothing in here reads a clock or arms a timer; the controller feeds
//! timestamps in from its virtual clock.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{Direction, ElevatorState, State};
