//! End-to-end controller scenarios driven on the virtual clock.

use chrono::{TimeZone, Utc};
use liftsim::outputs::{Alarm, DoorOutput, Light, Motor};
use liftsim::{
    Command, Controller, ControllerBuilder, ControllerEvent, Direction, ElevatorState, EventLog,
    Failure, IgnoreReason, Outcome, QueueMode, RejectReason,
};
use std::time::Duration;

fn build(mode: QueueMode) -> (Controller, EventLog) {
    let log = EventLog::new();
    let controller = ControllerBuilder::new()
        .queue_mode(mode)
        .start_time(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        .sink(Box::new(log.clone()))
        .build()
        .unwrap();
    (controller, log)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn completed_floors(log: &EventLog) -> Vec<u32> {
    log.events()
        .into_iter()
        .filter_map(|e| match e {
            ControllerEvent::RequestCompleted { request, .. } => Some(request.floor),
            _ => None,
        })
        .collect()
}

fn entries_into(log: &EventLog, state: ElevatorState) -> usize {
    log.count(|e| matches!(e, ControllerEvent::StateChanged { to, .. } if *to == state))
}

#[test]
fn priority_request_is_served_before_earlier_plain_request() {
    let (mut controller, log) = build(QueueMode::Priority);
    controller.dispatch(Command::request(1));
    assert_eq!(controller.state(), ElevatorState::MovingUp);

    controller.request_floor(2, None, false);
    controller.request_floor(4, None, true);

    assert!(controller.run_until_settled(secs(120)));
    assert_eq!(completed_floors(&log), vec![1, 4, 2]);
}

#[test]
fn fcfs_ignores_priority_flags() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(1));

    controller.request_floor(2, None, false);
    controller.request_floor(4, None, true);

    assert!(controller.run_until_settled(secs(120)));
    assert_eq!(completed_floors(&log), vec![1, 2, 4]);
}

#[test]
fn switching_to_priority_mode_reorders_selection() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(1));
    controller.request_floor(3, None, false);
    controller.request_floor(2, None, true);

    controller.dispatch(Command::SetQueueMode {
        mode: QueueMode::Priority,
    });
    assert!(controller.run_until_settled(secs(120)));
    assert_eq!(completed_floors(&log), vec![1, 2, 3]);
}

#[test]
fn emergency_stop_is_idempotent() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(3));

    assert_eq!(controller.dispatch(Command::EmergencyStop), Outcome::Applied);
    assert_eq!(
        controller.dispatch(Command::EmergencyStop),
        Outcome::Ignored(IgnoreReason::AlreadyActive(Failure::Emergency))
    );

    assert_eq!(log.count(|e| *e == ControllerEvent::EmergencyTriggered), 1);
    assert_eq!(entries_into(&log, ElevatorState::Emergency), 1);
    assert_eq!(controller.emergency_log().len(), 1);
    assert_eq!(controller.stats().emergency_events, 1);
}

#[test]
fn emergency_recovery_never_resumes_travel() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(3));
    controller.advance(secs(1));
    assert_eq!(controller.state(), ElevatorState::MovingUp);

    controller.dispatch(Command::EmergencyStop);
    let outputs = controller.outputs();
    assert_eq!(outputs.motor, Motor::Stop);
    assert_eq!(outputs.alarm, Alarm::On);
    assert_eq!(outputs.light, Light::Flashing);
    assert_eq!(outputs.display_text, "EMERGENCY");

    // the travel timer must be gone
    controller.advance(secs(10));
    assert_eq!(controller.state(), ElevatorState::Emergency);

    assert_eq!(
        controller.dispatch(Command::ResetFromEmergency),
        Outcome::Applied
    );
    assert_eq!(controller.state(), ElevatorState::DoorClosed);
    assert_eq!(log.count(|e| *e == ControllerEvent::EmergencyCleared), 1);

    assert!(controller.run_until_settled(secs(60)));
    assert_eq!(controller.state(), ElevatorState::Idle);
    assert_eq!(controller.snapshot().current_floor, 0);
    assert_eq!(entries_into(&log, ElevatorState::MovingUp), 1);
}

#[test]
fn reset_is_only_valid_from_emergency() {
    let (mut controller, _) = build(QueueMode::Fcfs);
    assert_eq!(
        controller.dispatch(Command::ResetFromEmergency),
        Outcome::Ignored(IgnoreReason::InvalidState(ElevatorState::Idle))
    );
}

#[test]
fn requests_queued_before_emergency_are_served_after_reset() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(2));
    controller.request_floor(4, None, false);
    controller.advance(secs(1));

    controller.dispatch(Command::EmergencyStop);
    assert!(controller.request_floor(1, None, false).is_rejected());
    assert_eq!(controller.queue().len(), 1);

    controller.dispatch(Command::ResetFromEmergency);
    assert!(controller.run_until_settled(secs(120)));

    assert_eq!(completed_floors(&log), vec![2, 4]);
    assert_eq!(controller.snapshot().current_floor, 4);
    assert!(controller.queue().is_empty());
}

#[test]
fn overload_triggers_automatically_past_capacity() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    for _ in 0..5 {
        controller.dispatch(Command::AddOccupant);
    }
    assert_eq!(controller.weight_percent(), 100);
    assert_eq!(controller.state(), ElevatorState::Idle);

    controller.dispatch(Command::AddOccupant);
    assert_eq!(controller.weight_percent(), 120);
    assert_eq!(controller.state(), ElevatorState::Overload);
    assert!(controller.snapshot().door_open);
    assert_eq!(log.count(|e| *e == ControllerEvent::OverloadTriggered), 1);

    let outputs = controller.outputs();
    assert_eq!(outputs.door, DoorOutput::Open);
    assert_eq!(outputs.display_text, "OVERLOAD");
    assert_eq!(outputs.weight_percent, 120);
}

#[test]
fn requests_are_rejected_during_overload() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::SimulateOverload);
    let queued_before = controller.queue().len();

    let outcome = controller.dispatch(Command::request(3));

    assert_eq!(
        outcome,
        Outcome::Rejected(RejectReason::SystemUnavailable {
            failure: Failure::Overload
        })
    );
    assert_eq!(controller.queue().len(), queued_before);
    assert_eq!(
        log.count(|e| matches!(e, ControllerEvent::RequestRejected { .. })),
        1
    );
    assert_eq!(controller.stats().total_requests, 0);
}

#[test]
fn clearing_overload_reopens_door_and_resumes() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::SimulateOverload);

    assert_eq!(controller.dispatch(Command::ClearOverload), Outcome::Applied);
    assert_eq!(controller.state(), ElevatorState::DoorOpen);
    assert_eq!(log.count(|e| *e == ControllerEvent::OverloadCleared), 1);

    controller.request_floor(2, None, false);
    assert!(controller.run_until_settled(secs(120)));
    assert_eq!(controller.snapshot().current_floor, 2);
}

#[test]
fn emergency_cancels_pending_auto_close() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(0));
    controller.advance(secs(2));
    assert_eq!(controller.state(), ElevatorState::DoorOpen);

    // auto-close was due 5s after entering DOOR_OPEN
    controller.advance(secs(1));
    controller.dispatch(Command::EmergencyStop);
    controller.advance(secs(1));
    controller.dispatch(Command::ResetFromEmergency);
    assert_eq!(controller.state(), ElevatorState::DoorOpen);

    controller.advance(Duration::from_millis(3500));
    assert_eq!(controller.state(), ElevatorState::DoorOpen);
    assert_eq!(entries_into(&log, ElevatorState::DoorClosing), 0);

    // only the timer armed on re-entry closes the door
    controller.advance(Duration::from_millis(1500));
    assert_eq!(controller.state(), ElevatorState::DoorClosing);
}

#[test]
fn power_failure_mid_travel_recovers_with_door_closed() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(4));
    controller.advance(Duration::from_millis(4500));

    assert_eq!(
        controller.dispatch(Command::SimulatePowerFailure),
        Outcome::Applied
    );
    let snapshot = controller.snapshot();
    assert!(snapshot.power_failure);
    assert_eq!(snapshot.state, ElevatorState::MovingUp);
    assert_eq!(snapshot.current_floor, 2);

    let outputs = controller.outputs();
    assert_eq!(outputs.motor, Motor::Failure);
    assert_eq!(outputs.light, Light::Emergency);
    assert_eq!(outputs.display_text, "POWER FAILURE");

    assert_eq!(
        controller.dispatch(Command::OpenDoor),
        Outcome::Ignored(IgnoreReason::FailureActive(Failure::PowerFailure))
    );

    controller.advance(secs(12));
    assert!(!controller.snapshot().power_failure);
    assert_eq!(controller.state(), ElevatorState::DoorClosed);
    assert_eq!(log.count(|e| *e == ControllerEvent::PowerFailureTriggered), 1);
    assert_eq!(log.count(|e| *e == ControllerEvent::PowerRestored), 1);

    assert!(controller.run_until_settled(secs(60)));
    assert_eq!(controller.state(), ElevatorState::Idle);
    assert_eq!(controller.snapshot().current_floor, 2);
}

#[test]
fn reboot_delay_does_not_interrupt_new_trip() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::SimulatePowerFailure);
    assert_eq!(controller.dispatch(Command::RestorePower), Outcome::Applied);

    assert!(controller.dispatch(Command::request(3)).is_applied());
    assert_eq!(controller.state(), ElevatorState::MovingUp);

    // the reboot timer armed on restore is now stale
    controller.advance(secs(2));
    assert_eq!(controller.state(), ElevatorState::MovingUp);
    assert_eq!(entries_into(&log, ElevatorState::DoorClosed), 0);
    assert_eq!(controller.outputs().display_text, "Moving to 3");

    assert!(controller.run_until_settled(secs(60)));
    assert_eq!(controller.state(), ElevatorState::Idle);
    assert_eq!(controller.snapshot().current_floor, 3);
    assert_eq!(entries_into(&log, ElevatorState::MovingUp), 1);
}

#[test]
fn wait_times_count_whole_seconds_from_enqueue() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(1));
    controller.advance(Duration::from_millis(500));
    controller.dispatch(Command::request(3));

    assert!(controller.run_until_settled(secs(120)));

    let waits: Vec<u64> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ControllerEvent::RequestCompleted {
                wait_time_seconds, ..
            } => Some(wait_time_seconds),
            _ => None,
        })
        .collect();
    assert_eq!(waits, vec![0, 11]);
    assert_eq!(controller.stats().wait_times, vec![0, 11]);
    assert_eq!(controller.stats().completed_requests, 2);
}

#[test]
fn queue_drains_to_idle() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    for floor in [3, 1, 4, 0, 2, 2] {
        controller.request_floor(floor, None, false);
    }

    assert!(controller.run_until_settled(secs(600)));
    assert_eq!(controller.state(), ElevatorState::Idle);
    assert!(controller.queue().is_empty());
    assert_eq!(controller.stats().completed_requests, 6);
    assert_eq!(log.count(|e| *e == ControllerEvent::EmergencyTriggered), 0);
}

#[test]
fn rush_hour_sequence_serves_priorities_first() {
    let (mut controller, log) = build(QueueMode::Priority);
    let calls = [
        (4, Direction::Up, true),
        (2, Direction::Down, false),
        (3, Direction::Up, false),
        (0, Direction::Down, true),
        (1, Direction::Up, false),
    ];
    for (floor, direction, priority) in calls {
        controller.request_floor(floor, Some(direction), priority);
        controller.advance(secs(1));
    }

    assert!(controller.run_until_settled(secs(600)));
    assert_eq!(completed_floors(&log), vec![4, 0, 2, 3, 1]);
    assert_eq!(controller.stats().total_requests, 5);
    assert!(controller.stats().average_wait().is_some());
}

#[test]
fn transition_events_match_history() {
    let (mut controller, log) = build(QueueMode::Fcfs);
    controller.dispatch(Command::request(2));
    controller.run_until_settled(secs(60));

    let events: Vec<_> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ControllerEvent::StateChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    let recorded: Vec<_> = controller
        .history()
        .transitions()
        .iter()
        .map(|t| (t.from, t.to))
        .collect();

    assert_eq!(events, recorded);
    assert_eq!(
        controller
            .history()
            .time_in_state(&ElevatorState::DoorOpen),
        secs(5)
    );
}
