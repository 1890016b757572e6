//! Liftsim: a single-car elevator controller modelled as a timed finite-state
//! machine.
//!
//! The controller keeps a pure core (states, guards, history and the output
//! function) apart from the imperative shell that arms timers, owns the
//! request queue and applies the failure overlay. Nothing here renders or
//! sleeps: time is a virtual clock the caller advances, and collaborators
//! observe the controller through typed events.
//!
//! # Core Concepts
//!
//! - **States**: nine `ElevatorState` values, exactly one active at a time
//! - **Timed edges**: door and travel transitions fire from the timer scheduler
//! - **Queue**: FCFS or PRIORITY selection of the next target floor
//! - **Failure overlay**: emergency stop, overload and power failure
//! - **Events**: `ControllerEvent`s and output vectors pushed to `EventSink`s
//!
//! # Example
//!
//! ```rust
//! use liftsim::{Command, ControllerBuilder, ControllerEvent, ElevatorState, EventLog};
//! use std::time::Duration;
//!
//! let log = EventLog::new();
//! let mut controller = ControllerBuilder::new()
//!     .sink(Box::new(log.clone()))
//!     .build()
//!     .unwrap();
//!
//! controller.dispatch(Command::request(3));
//! controller.dispatch(Command::EmergencyStop);
//! assert_eq!(controller.state(), ElevatorState::Emergency);
//!
//! controller.dispatch(Command::ResetFromEmergency);
//! assert_eq!(controller.state(), ElevatorState::DoorClosed);
//!
//! controller.run_until_settled(Duration::from_secs(60));
//! assert_eq!(controller.state(), ElevatorState::Idle);
//! assert_eq!(log.count(|e| *e == ControllerEvent::EmergencyTriggered), 1);
//! ```

pub mod builder;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod events;
pub mod outputs;
pub mod overlay;
pub mod queue;
pub mod stats;
pub mod timer;

// Re-export commonly used types
pub use builder::ControllerBuilder;
pub use command::{Command, IgnoreReason, Outcome};
pub use config::{ControllerConfig, TimingConfig};
pub use controller::{Controller, ControllerSnapshot};
pub use crate::core::{Direction, ElevatorState, Guard, State, StateHistory, StateTransition};
pub use error::{BuildError, ConfigError};
pub use events::{ControllerEvent, EventLog, EventSink, JsonLinesSink, RejectReason};
pub use outputs::OutputVector;
pub use overlay::{EmergencyRecord, Failure};
pub use queue::{QueueMode, Request, RequestId};
pub use stats::Statistics;
