//! Emergency Drill
//!
//! Exercises the failure overlay: an emergency stop mid-travel, an overload
//! from too many passengers, and a power failure that recovers on its own.
//!
//! Key concepts:
//! - Failures cancel every armed timer and suspend the request queue
//! - Recovery routes to DOOR_OPEN or DOOR_CLOSED, never back into travel
//! - Requests during a failure are rejected, not queued
//! - Every event is written as a JSON line
//!
//! Ignored commands are marked with `~`.
//!
//! Run with: cargo run --example emergency_drill

use liftsim::{Command, ControllerBuilder, EventLog, JsonLinesSink, Outcome};
use std::io;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

fn report(label: &str, outcome: &Outcome, controller: &liftsim::Controller) {
    let marker = if outcome.is_ignored() { "~" } else { " " };
    println!(
        "{}{:<27} -> {:?}  [{} | {}]",
        marker,
        label,
        outcome,
        controller.state(),
        controller.outputs().display_text
    );
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== Emergency Drill ===\n");

    let log = EventLog::new();
    let mut controller = ControllerBuilder::new()
        .sink(Box::new(log.clone()))
        .sink(Box::new(JsonLinesSink::new(io::stdout())))
        .build()
        .unwrap();

    println!("--- Scenario 1: emergency stop while moving ---");
    let outcome = controller.dispatch(Command::request(3));
    report("request floor 3", &outcome, &controller);
    controller.advance(Duration::from_secs(3));

    let outcome = controller.dispatch(Command::EmergencyStop);
    report("emergency stop", &outcome, &controller);
    let outcome = controller.dispatch(Command::request(1));
    report("request floor 1", &outcome, &controller);

    controller.advance(Duration::from_secs(5));
    let outcome = controller.dispatch(Command::ResetFromEmergency);
    report("reset from emergency", &outcome, &controller);
    controller.run_until_settled(Duration::from_secs(60));
    println!("settled at floor {}\n", controller.snapshot().current_floor);

    println!("--- Scenario 2: overload ---");
    for _ in 0..6 {
        let outcome = controller.dispatch(Command::AddOccupant);
        report("add occupant", &outcome, &controller);
    }
    let outcome = controller.dispatch(Command::ClearOverload);
    report("clear overload", &outcome, &controller);
    let outcome = controller.dispatch(Command::RemoveOccupant);
    report("remove occupant", &outcome, &controller);
    controller.run_until_settled(Duration::from_secs(60));
    println!();

    println!("--- Scenario 3: power failure ---");
    let outcome = controller.dispatch(Command::request(0));
    report("request floor G", &outcome, &controller);
    controller.advance(Duration::from_secs(1));
    let outcome = controller.dispatch(Command::SimulatePowerFailure);
    report("power failure", &outcome, &controller);
    controller.advance(Duration::from_secs(12));
    report("after automatic recovery", &Outcome::Applied, &controller);
    controller.run_until_settled(Duration::from_secs(60));

    println!("\nEmergency log:");
    for record in controller.emergency_log() {
        println!(
            "  {} in {} at floor {} (target {:?}, door open: {})",
            record.timestamp, record.previous_state, record.floor, record.target_floor,
            record.door_open
        );
    }

    let stats = controller.stats();
    println!(
        "\nEmergencies: {}  Overloads: {}  Power failures: {}  (total {})",
        stats.emergency_events,
        stats.overload_events,
        stats.power_failures,
        stats.failure_events()
    );
    println!("Events recorded: {}", log.events().len());

    println!("\n=== Example Complete ===");
}
