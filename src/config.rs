//! Controller configuration.
//!
//! Every field has a default matching a five-stop building (G to 4) with
//! the standard door and travel timings, so an empty JSON object is a valid
//! configuration.

use crate::error::{BuildError, ConfigError};
use crate::queue::QueueMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Timings of the auto-advance edges, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Travel time per floor
    pub travel_per_floor: u64,
    pub door_opening: u64,
    pub door_open: u64,
    pub door_closing: u64,
    /// Pause in DOOR_CLOSED before the queue is consulted
    pub door_closed: u64,
    /// Automatic restore after a power failure
    pub power_recovery: u64,
    /// Delay between power restore and resuming the door cycle
    pub power_reboot: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            travel_per_floor: 2000,
            door_opening: 2000,
            door_open: 5000,
            door_closing: 2000,
            door_closed: 1000,
            power_recovery: 10_000,
            power_reboot: 2000,
        }
    }
}

impl TimingConfig {
    /// Travel time for `floors` floors.
    pub fn travel(&self, floors: u32) -> Duration {
        Duration::from_millis(self.travel_per_floor.saturating_mul(u64::from(floors)))
    }

    pub fn door_opening(&self) -> Duration {
        Duration::from_millis(self.door_opening)
    }

    pub fn door_open(&self) -> Duration {
        Duration::from_millis(self.door_open)
    }

    pub fn door_closing(&self) -> Duration {
        Duration::from_millis(self.door_closing)
    }

    pub fn door_closed(&self) -> Duration {
        Duration::from_millis(self.door_closed)
    }

    pub fn power_recovery(&self) -> Duration {
        Duration::from_millis(self.power_recovery)
    }

    pub fn power_reboot(&self) -> Duration {
        Duration::from_millis(self.power_reboot)
    }

    fn named(&self) -> [(&'static str, u64); 7] {
        [
            ("travel_per_floor", self.travel_per_floor),
            ("door_opening", self.door_opening),
            ("door_open", self.door_open),
            ("door_closing", self.door_closing),
            ("door_closed", self.door_closed),
            ("power_recovery", self.power_recovery),
            ("power_reboot", self.power_reboot),
        ]
    }
}

/// Static description of the car and building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Highest floor; floors run from 0 (ground) to `max_floor`
    pub max_floor: u32,
    pub initial_floor: u32,
    pub max_occupants: u32,
    /// Load each occupant adds, as a percentage of rated capacity
    pub weight_per_occupant: u32,
    pub queue_mode: QueueMode,
    pub timings: TimingConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_floor: 4,
            initial_floor: 0,
            max_occupants: 6,
            weight_per_occupant: 20,
            queue_mode: QueueMode::Fcfs,
            timings: TimingConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON document and validate it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use liftsim::config::ControllerConfig;
    ///
    /// let config = ControllerConfig::from_json(r#"{"max_floor": 9}"#).unwrap();
    /// assert_eq!(config.max_floor, 9);
    /// assert_eq!(config.max_occupants, 6);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BuildError::InvalidConfig(vec![ConfigError::Parse(e.to_string())]))?;
        config.validated()
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();

        checks.push(if self.max_floor == 0 {
            Validation::fail(ConfigError::TooFewFloors(self.max_floor))
        } else {
            Validation::success(())
        });

        checks.push(if self.initial_floor > self.max_floor {
            Validation::fail(ConfigError::InitialFloorOutOfRange {
                initial: self.initial_floor,
                max: self.max_floor,
            })
        } else {
            Validation::success(())
        });

        checks.push(if self.max_occupants == 0 {
            Validation::fail(ConfigError::NoCapacity)
        } else {
            Validation::success(())
        });

        checks.push(if self.weight_per_occupant == 0 {
            Validation::fail(ConfigError::ZeroOccupantWeight)
        } else {
            Validation::success(())
        });

        for (name, value) in self.timings.named() {
            checks.push(if value == 0 {
                Validation::fail(ConfigError::ZeroTiming { name })
            } else {
                Validation::success(())
            });
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate, converting accumulated violations into a [`BuildError`].
    pub fn validated(self) -> Result<Self, BuildError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(BuildError::InvalidConfig(
                errors.iter().cloned().collect(),
            )),
        }
    }

    /// Weight percentage for `occupants` people.
    pub fn weight_percent(&self, occupants: u32) -> u32 {
        occupants.saturating_mul(self.weight_per_occupant)
    }
}
