//! Elevator states and the `State` trait they implement.
//!
//! The controller is a closed set of nine states. Exactly one is active at
//! any instant; power failure is deliberately *not* a state but a flag kept
//! by the failure overlay.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for state machine states.
///
/// All methods are pure - no side effects. States are immutable values that
/// describe the current position in a state machine, which is what lets
/// [`StateHistory`](super::StateHistory) record them generically.
///
/// # Required Traits
///
/// - `Clone`: states are copied into every transition record
/// - `PartialEq`: the no-op check in a transition compares states
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize` so transition records can be shipped to observers
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this state represents a failure condition.
    ///
    /// Default implementation returns `false`.
    fn is_failure(&self) -> bool {
        false
    }
}

/// The nine controller states.
///
/// # Example
///
/// ```rust
/// use liftsim::core::{ElevatorState, State};
///
/// assert_eq!(ElevatorState::DoorOpen.name(), "DOOR_OPEN");
/// assert!(ElevatorState::Emergency.is_failure());
/// assert!(!ElevatorState::Idle.is_failure());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElevatorState {
    Idle,
    MovingUp,
    MovingDown,
    DoorOpening,
    DoorOpen,
    DoorClosing,
    DoorClosed,
    Emergency,
    Overload,
}

impl ElevatorState {
    /// Every state, in declaration order.
    pub const ALL: [ElevatorState; 9] = [
        Self::Idle,
        Self::MovingUp,
        Self::MovingDown,
        Self::DoorOpening,
        Self::DoorOpen,
        Self::DoorClosing,
        Self::DoorClosed,
        Self::Emergency,
        Self::Overload,
    ];

    /// True for `MovingUp` and `MovingDown`.
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::MovingUp | Self::MovingDown)
    }

    /// States that show the door as physically open.
    pub fn holds_door_open(&self) -> bool {
        matches!(self, Self::DoorOpening | Self::DoorOpen)
    }

    /// States from which the queue may be consulted for the next target.
    pub fn accepts_dispatch(&self) -> bool {
        matches!(self, Self::Idle | Self::DoorClosed)
    }
}

impl State for ElevatorState {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "IDLE",
            Self::MovingUp => "MOVING_UP",
            Self::MovingDown => "MOVING_DOWN",
            Self::DoorOpening => "DOOR_OPENING",
            Self::DoorOpen => "DOOR_OPEN",
            Self::DoorClosing => "DOOR_CLOSING",
            Self::DoorClosed => "DOOR_CLOSED",
            Self::Emergency => "EMERGENCY",
            Self::Overload => "OVERLOAD",
        }
    }

    fn is_failure(&self) -> bool {
        matches!(self, Self::Emergency | Self::Overload)
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Travel direction of the car or of a hall call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    #[default]
    None,
}

impl Direction {
    /// Direction needed to get from `from` to `to`.
    ///
    /// Equal floors resolve to `Down`; callers route equal floors straight to
    /// the door cycle before this matters.
    pub fn between(from: u32, to: u32) -> Self {
        if to > from {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::None => "NONE",
        })
    }
}
