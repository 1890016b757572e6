//! Builder for constructing controllers.

use crate::clock::VirtualClock;
use crate::config::{ControllerConfig, TimingConfig};
use crate::controller::Controller;
use crate::error::BuildError;
use crate::events::EventSink;
use crate::queue::QueueMode;
use chrono::{DateTime, Utc};

/// Builder for constructing a [`Controller`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use liftsim::{ControllerBuilder, EventLog, QueueMode};
///
/// let log = EventLog::new();
/// let controller = ControllerBuilder::new()
///     .max_floor(9)
///     .queue_mode(QueueMode::Priority)
///     .sink(Box::new(log.clone()))
///     .build()
///     .unwrap();
///
/// assert_eq!(controller.config().max_floor, 9);
/// assert_eq!(controller.queue_mode(), QueueMode::Priority);
/// ```
pub struct ControllerBuilder {
    config: ControllerConfig,
    start_time: Option<DateTime<Utc>>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl ControllerBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            start_time: None,
            sinks: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_floor(mut self, max_floor: u32) -> Self {
        self.config.max_floor = max_floor;
        self
    }

    pub fn initial_floor(mut self, floor: u32) -> Self {
        self.config.initial_floor = floor;
        self
    }

    pub fn max_occupants(mut self, max: u32) -> Self {
        self.config.max_occupants = max;
        self
    }

    pub fn weight_per_occupant(mut self, percent: u32) -> Self {
        self.config.weight_per_occupant = percent;
        self
    }

    pub fn queue_mode(mut self, mode: QueueMode) -> Self {
        self.config.queue_mode = mode;
        self
    }

    pub fn timings(mut self, timings: TimingConfig) -> Self {
        self.config.timings = timings;
        self
    }

    /// Anchor the virtual clock at `start` instead of the current time.
    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Subscribe an event sink from the start.
    pub fn sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the controller.
    /// Returns every configuration violation at once if the config is invalid.
    pub fn build(self) -> Result<Controller, BuildError> {
        let clock = match self.start_time {
            Some(start) => VirtualClock::starting_at(start),
            None => VirtualClock::default(),
        };

        let mut controller = Controller::with_clock(self.config, clock)?;
        for sink in self.sinks {
            controller.subscribe(sink);
        }
        Ok(controller)
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
