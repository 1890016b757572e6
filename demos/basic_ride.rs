//! Basic Ride
//!
//! A single passenger boards at the ground floor and rides to floor 3.
//!
//! Key concepts:
//! - Timed door and travel transitions driven by the virtual clock
//! - Output vector after each step
//! - Dwell time per state from the transition history
//!
//! Run with: cargo run --example basic_ride
//! Set RUST_LOG=debug to see timers being armed and fired.

use liftsim::{Command, ControllerBuilder, ElevatorState, EventLog, State};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== Basic Ride ===\n");

    let log = EventLog::new();
    let mut controller = ControllerBuilder::new()
        .sink(Box::new(log.clone()))
        .build()
        .unwrap();

    controller.dispatch(Command::AddOccupant);
    controller.dispatch(Command::request(3));

    while controller.state() != ElevatorState::Idle {
        let outputs = controller.outputs();
        println!(
            "[{:>5.1}s] {:<13} motor={:?} door={:?} display=\"{}\"",
            controller.uptime().as_secs_f64(),
            controller.state().name(),
            outputs.motor,
            outputs.door,
            outputs.display_text
        );
        controller.advance(Duration::from_millis(500));
    }

    println!("\nArrived: {}", controller.outputs().display_text);

    println!("\nTime spent per state:");
    for state in ElevatorState::ALL {
        let dwell = controller.history().time_in_state(&state);
        if !dwell.is_zero() {
            println!("  {:<13} {:?}", state.name(), dwell);
        }
    }

    let stats = controller.stats();
    println!("\nFloors traveled: {}", stats.floors_traveled);
    println!("Door operations: {}", stats.door_operations);
    println!("Events emitted:  {}", log.events().len());

    println!("\n=== Example Complete ===");
}
