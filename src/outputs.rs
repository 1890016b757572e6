//! Output vector: what the car shows and drives in each state.
//!
//! Outputs are a pure function of the current state plus a handful of
//! auxiliary fields (floor, target, occupancy, weight, door, power). The
//! display text during travel names the target floor, which is why the
//! target is part of the input and not derivable from the state alone.

use crate::core::{Direction, ElevatorState};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Motor {
    Stop,
    Up,
    Down,
    Failure,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DoorOutput {
    Open,
    Opening,
    Closing,
    Closed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Light {
    On,
    Off,
    Flashing,
    Emergency,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alarm {
    On,
    Off,
}

/// Everything external renderers need to draw the car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputVector {
    pub motor: Motor,
    pub door: DoorOutput,
    pub direction: Direction,
    pub light: Light,
    pub alarm: Alarm,
    pub display_text: String,
    pub weight_percent: u32,
}

/// Auxiliary fields the output function reads besides the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputInputs {
    pub current_floor: u32,
    pub target_floor: Option<u32>,
    pub occupants: u32,
    pub weight_percent: u32,
    pub door_open: bool,
    /// Power is out, or has just come back and the car is still rebooting
    pub power_failure: bool,
}

/// Floor label as shown on the car display: ground floor is `G`.
pub fn floor_label(floor: u32) -> String {
    if floor == 0 {
        "G".to_string()
    } else {
        floor.to_string()
    }
}

/// Compute the output vector for `state`.
///
/// A power failure overrides motor, light and display with the degraded
/// emergency-lighting output regardless of state.
pub fn compute_outputs(state: ElevatorState, inputs: &OutputInputs) -> OutputVector {
    let here = floor_label(inputs.current_floor);
    let target = floor_label(inputs.target_floor.unwrap_or(inputs.current_floor));
    let cabin_light = if inputs.occupants > 0 {
        Light::On
    } else {
        Light::Off
    };

    let (motor, door, direction, light, alarm, display_text) = match state {
        ElevatorState::Idle => (
            Motor::Stop,
            DoorOutput::Closed,
            Direction::None,
            cabin_light,
            Alarm::Off,
            format!("Floor {here}"),
        ),
        ElevatorState::MovingUp => (
            Motor::Up,
            DoorOutput::Closed,
            Direction::Up,
            Light::On,
            Alarm::Off,
            format!("Moving to {target}"),
        ),
        ElevatorState::MovingDown => (
            Motor::Down,
            DoorOutput::Closed,
            Direction::Down,
            Light::On,
            Alarm::Off,
            format!("Moving to {target}"),
        ),
        ElevatorState::DoorOpening => (
            Motor::Stop,
            DoorOutput::Opening,
            Direction::None,
            Light::On,
            Alarm::Off,
            format!("Opening at {here}"),
        ),
        ElevatorState::DoorOpen => (
            Motor::Stop,
            DoorOutput::Open,
            Direction::None,
            Light::On,
            Alarm::Off,
            format!("Door Open at {here}"),
        ),
        ElevatorState::DoorClosing => (
            Motor::Stop,
            DoorOutput::Closing,
            Direction::None,
            Light::On,
            Alarm::Off,
            "Closing Door".to_string(),
        ),
        ElevatorState::DoorClosed => (
            Motor::Stop,
            DoorOutput::Closed,
            Direction::None,
            cabin_light,
            Alarm::Off,
            format!("Floor {here}"),
        ),
        ElevatorState::Emergency => (
            Motor::Stop,
            if inputs.door_open {
                DoorOutput::Open
            } else {
                DoorOutput::Closed
            },
            Direction::None,
            Light::Flashing,
            Alarm::On,
            "EMERGENCY".to_string(),
        ),
        ElevatorState::Overload => (
            Motor::Stop,
            DoorOutput::Open,
            Direction::None,
            Light::Flashing,
            Alarm::On,
            "OVERLOAD".to_string(),
        ),
    };

    let mut outputs = OutputVector {
        motor,
        door,
        direction,
        light,
        alarm,
        display_text,
        weight_percent: inputs.weight_percent,
    };

    if inputs.power_failure {
        outputs.motor = Motor::Failure;
        outputs.light = Light::Emergency;
        outputs.display_text = "POWER FAILURE".to_string();
    }

    outputs
}
