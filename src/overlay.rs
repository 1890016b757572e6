//! Failure overlay: emergency stop, overload and power failure.
//!
//! The overlay owns the three failure flags and decides whether a trigger or
//! a clear is allowed. It never touches timers or the state value itself;
//! the controller applies the consequences.
//!
//! Precedence is first-triggered-wins: while any failure is active every
//! other trigger is refused until the active one clears, so at most one flag
//! is ever set.

use crate::command::IgnoreReason;
use crate::core::ElevatorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Weight percentage above which the car is overloaded.
pub const OVERLOAD_THRESHOLD: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    Emergency,
    Overload,
    PowerFailure,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Emergency => "emergency stop",
            Self::Overload => "overload",
            Self::PowerFailure => "power failure",
        })
    }
}

/// Entry written to the emergency log each time EMERGENCY is entered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRecord {
    pub timestamp: DateTime<Utc>,
    pub previous_state: ElevatorState,
    pub floor: u32,
    pub target_floor: Option<u32>,
    pub door_open: bool,
}

/// True when `weight_percent` is over the overload threshold.
pub fn exceeds_capacity(weight_percent: u32) -> bool {
    weight_percent > OVERLOAD_THRESHOLD
}

/// State to resume into once a failure clears.
///
/// Travel is never resumed: the car comes back with its door either open or
/// closed depending on where the door was when the failure struck.
pub fn recovery_state(door_open: bool) -> ElevatorState {
    if door_open {
        ElevatorState::DoorOpen
    } else {
        ElevatorState::DoorClosed
    }
}

#[derive(Clone, Debug, Default)]
pub struct FailureOverlay {
    active: Option<Failure>,
    pre_emergency_state: Option<ElevatorState>,
    emergency_log: Vec<EmergencyRecord>,
}

impl FailureOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active failure, if any.
    pub fn active(&self) -> Option<Failure> {
        self.active
    }

    pub fn any_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_active(&self, failure: Failure) -> bool {
        self.active == Some(failure)
    }

    /// Raise `failure`.
    ///
    /// Redundant triggers and triggers blocked by another active failure are
    /// refused without changing anything.
    pub fn raise(&mut self, failure: Failure) -> Result<(), IgnoreReason> {
        match self.active {
            Some(active) if active == failure => Err(IgnoreReason::AlreadyActive(failure)),
            Some(active) => {
                warn!("{} ignored: {} is already active", failure, active);
                Err(IgnoreReason::FailureActive(active))
            }
            None => {
                self.active = Some(failure);
                Ok(())
            }
        }
    }

    /// Raise the emergency flag, remembering the state it interrupted.
    pub fn raise_emergency(&mut self, interrupted: ElevatorState) -> Result<(), IgnoreReason> {
        self.raise(Failure::Emergency)?;
        self.pre_emergency_state = Some(interrupted);
        Ok(())
    }

    /// Clear `failure`. Refused if it is not the active failure.
    pub fn clear(&mut self, failure: Failure) -> Result<(), IgnoreReason> {
        if self.active != Some(failure) {
            return Err(IgnoreReason::NotActive(failure));
        }
        self.active = None;
        if failure == Failure::Emergency {
            self.pre_emergency_state = None;
        }
        Ok(())
    }

    /// State the current emergency interrupted.
    pub fn pre_emergency_state(&self) -> Option<ElevatorState> {
        self.pre_emergency_state
    }

    pub fn log_emergency(&mut self, record: EmergencyRecord) {
        self.emergency_log.push(record);
    }

    pub fn emergency_log(&self) -> &[EmergencyRecord] {
        &self.emergency_log
    }
}
