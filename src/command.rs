//! Command surface of the controller and the outcome of each command.

use crate::core::{Direction, ElevatorState};
use crate::events::RejectReason;
use crate::overlay::Failure;
use crate::queue::{QueueMode, RequestId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A command accepted by [`Controller::dispatch`](crate::Controller::dispatch).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    RequestFloor {
        floor: i64,
        #[serde(default)]
        direction: Option<Direction>,
        #[serde(default)]
        priority: bool,
    },
    CancelRequest {
        id: RequestId,
    },
    ClearQueue,
    OpenDoor,
    CloseDoor,
    EmergencyStop,
    ResetFromEmergency,
    SimulateOverload,
    ClearOverload,
    SimulatePowerFailure,
    RestorePower,
    AddOccupant,
    RemoveOccupant,
    SetQueueMode {
        mode: QueueMode,
    },
}

impl Command {
    /// Plain floor request with no direction or priority.
    pub fn request(floor: i64) -> Self {
        Self::RequestFloor {
            floor,
            direction: None,
            priority: false,
        }
    }
}

/// Why a command had no effect.
///
/// Ignored commands are not errors: they are redundant or not applicable in
/// the current situation, and nothing is emitted for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IgnoreReason {
    #[error("{0} is already active")]
    AlreadyActive(Failure),

    #[error("{0} is active")]
    FailureActive(Failure),

    #[error("{0} is not active")]
    NotActive(Failure),

    #[error("not applicable in state {0}")]
    InvalidState(ElevatorState),

    #[error("load still at {weight_percent}%")]
    StillOverweight { weight_percent: u32 },

    #[error("car already holds {max} occupants")]
    CarFull { max: u32 },

    #[error("car is empty")]
    CarEmpty,
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command changed the controller.
    Applied,
    /// A floor request was queued.
    Enqueued(RequestId),
    /// Redundant or not applicable; nothing changed.
    Ignored(IgnoreReason),
    /// Refused; a `RequestRejected` event was emitted.
    Rejected(RejectReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied | Self::Enqueued(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    /// Id of the queued request, if one was queued.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Enqueued(id) => Some(*id),
            _ => None,
        }
    }
}
