//! Events emitted by the controller and the sinks that consume them.
//!
//! The controller never renders anything. Renderers, charts, reports and
//! audio subscribe an [`EventSink`] and react to the typed events and to the
//! output vector pushed after every change.

use crate::core::ElevatorState;
use crate::outputs::OutputVector;
use crate::overlay::Failure;
use crate::queue::{Request, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Why a request or id-based command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("system unavailable: {failure} active")]
    SystemUnavailable { failure: Failure },

    #[error("floor {floor} is outside 0..={max_floor}")]
    FloorOutOfRange { floor: i64, max_floor: u32 },

    #[error("'{input}' is not a floor")]
    InvalidFloorInput { input: String },

    #[error("no pending request {id}")]
    UnknownRequest { id: RequestId },

    #[error("request {id} is already queued")]
    DuplicateRequest { id: RequestId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    StateChanged {
        from: ElevatorState,
        to: ElevatorState,
        timestamp: DateTime<Utc>,
        /// Time spent in `from`
        duration: Duration,
    },
    RequestEnqueued {
        request: Request,
    },
    RequestRejected {
        reason: RejectReason,
    },
    RequestCompleted {
        request: Request,
        wait_time_seconds: u64,
    },
    RequestCancelled {
        request: Request,
    },
    QueueCleared {
        dropped: usize,
    },
    EmergencyTriggered,
    EmergencyCleared,
    OverloadTriggered,
    OverloadCleared,
    PowerFailureTriggered,
    PowerRestored,
}

impl ControllerEvent {
    /// Event announcing that `failure` was raised.
    pub fn triggered(failure: Failure) -> Self {
        match failure {
            Failure::Emergency => Self::EmergencyTriggered,
            Failure::Overload => Self::OverloadTriggered,
            Failure::PowerFailure => Self::PowerFailureTriggered,
        }
    }

    /// Event announcing that `failure` was cleared.
    pub fn cleared(failure: Failure) -> Self {
        match failure {
            Failure::Emergency => Self::EmergencyCleared,
            Failure::Overload => Self::OverloadCleared,
            Failure::PowerFailure => Self::PowerRestored,
        }
    }
}

/// Subscriber to controller events.
pub trait EventSink: Send {
    /// Called for every event, in emission order.
    fn emit(&mut self, event: &ControllerEvent);

    /// Called with the fresh output vector after every transition and
    /// failure-flag change.
    fn outputs_changed(&mut self, _outputs: &OutputVector) {}
}

/// Shared, cloneable event collector.
///
/// Every clone appends to the same log, so a collaborator can hand one clone
/// to the controller and keep another to read from.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ControllerEvent>>>,
    outputs: Arc<Mutex<Vec<OutputVector>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event received so far.
    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return every event received so far.
    pub fn take(&self) -> Vec<ControllerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of received events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ControllerEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .count()
    }

    /// The most recently pushed output vector.
    pub fn last_outputs(&self) -> Option<OutputVector> {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &ControllerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn outputs_changed(&mut self, outputs: &OutputVector) {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outputs.clone());
    }
}

/// Writes each event as one JSON object per line.
///
/// Write failures are logged and otherwise ignored; a broken consumer must
/// not stop the controller.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &ControllerEvent) {
        let result = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!("failed to write controller event: {}", e);
        }
    }
}
