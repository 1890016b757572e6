//! Construction-time errors.
//!
//! Runtime command problems are never errors: they come back as an
//! [`Outcome`](crate::Outcome). Only configuration and building can fail.

use thiserror::Error;

/// A single configuration violation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_floor must be at least 1 (got {0})")]
    TooFewFloors(u32),

    #[error("initial_floor {initial} is above max_floor {max}")]
    InitialFloorOutOfRange { initial: u32, max: u32 },

    #[error("max_occupants must be at least 1")]
    NoCapacity,

    #[error("weight_per_occupant must be at least 1 percent")]
    ZeroOccupantWeight,

    #[error("timing '{name}' must be greater than zero")]
    ZeroTiming { name: &'static str },

    #[error("invalid configuration document: {0}")]
    Parse(String),
}

/// Errors that can occur when building a controller.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {}", describe(.0))]
    InvalidConfig(Vec<ConfigError>),
}

fn describe(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildError {
    /// Every configuration violation carried by this error.
    pub fn violations(&self) -> &[ConfigError] {
        match self {
            Self::InvalidConfig(errors) => errors,
        }
    }
}

impl From<Vec<ConfigError>> for BuildError {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::InvalidConfig(errors)
    }
}
