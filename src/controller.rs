//! The controller: composition root of the state machine, request queue,
//! failure overlay and timer scheduler.
//!
//! All mutation goes through `&mut self`, either from a command
//! ([`Controller::dispatch`] and the named command methods) or from a timer
//! fired while advancing the virtual clock. Each runs to completion before the
//! next one starts, so the controller needs no locking of its own. Wrap it in
//! a `Mutex` or hand it to a single task to share it.

use crate::clock::{since, VirtualClock};
use crate::command::{Command, IgnoreReason, Outcome};
use crate::config::ControllerConfig;
use crate::core::{Direction, ElevatorState, Guard, StateHistory, StateTransition};
use crate::error::BuildError;
use crate::events::{ControllerEvent, EventSink, RejectReason};
use crate::outputs::{compute_outputs, OutputInputs, OutputVector};
use crate::overlay::{exceeds_capacity, recovery_state, EmergencyRecord, Failure, FailureOverlay};
use crate::queue::{QueueError, QueueMode, Request, RequestId, RequestQueue};
use crate::stats::Statistics;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerScheduler, TimerToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Point-in-time view of everything the controller tracks besides its queue
/// contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub state: ElevatorState,
    pub current_floor: u32,
    pub target_floor: Option<u32>,
    pub direction: Direction,
    pub door_open: bool,
    pub occupants: u32,
    pub weight_percent: u32,
    pub emergency: bool,
    pub overload: bool,
    pub power_failure: bool,
    pub queue_length: usize,
}

impl ControllerSnapshot {
    pub fn any_failure(&self) -> bool {
        self.emergency || self.overload || self.power_failure
    }
}

/// Travel leg in progress, used to work out where an interrupted car stopped.
#[derive(Clone, Copy, Debug)]
struct TravelLeg {
    from: u32,
    started_at: DateTime<Utc>,
}

/// Single-car elevator controller.
///
/// # Example
///
/// ```rust
/// use liftsim::{Command, ControllerBuilder, ElevatorState};
/// use std::time::Duration;
///
/// let mut controller = ControllerBuilder::new().build().unwrap();
/// let outcome = controller.dispatch(Command::request(2));
/// assert!(outcome.is_applied());
/// assert_eq!(controller.state(), ElevatorState::MovingUp);
///
/// controller.run_until_settled(Duration::from_secs(60));
/// assert_eq!(controller.state(), ElevatorState::Idle);
/// assert_eq!(controller.snapshot().current_floor, 2);
/// ```
pub struct Controller {
    config: ControllerConfig,
    clock: VirtualClock,
    timers: TimerScheduler,
    queue: RequestQueue,
    queue_mode: QueueMode,
    overlay: FailureOverlay,
    history: StateHistory<ElevatorState>,
    stats: Statistics,
    sinks: Vec<Box<dyn EventSink>>,
    /// Auto-advance edges only fire while this passes
    auto_advance: Guard<ControllerSnapshot>,

    state: ElevatorState,
    entered_at: DateTime<Utc>,
    /// Bumped on every state entry; timers armed under an older epoch are stale
    epoch: u64,
    current_floor: u32,
    target_floor: Option<u32>,
    direction: Direction,
    door_open: bool,
    occupants: u32,
    next_request_id: u64,
    travel: Option<TravelLeg>,
    recovery_timer: Option<TimerId>,
    /// Epoch at which power came back; outputs stay degraded until the
    /// reboot delay ends or the state changes
    reboot_epoch: Option<u64>,
}

impl Controller {
    /// Create a controller in IDLE at the configured initial floor, with the
    /// virtual clock starting now.
    pub fn new(config: ControllerConfig) -> Result<Self, BuildError> {
        Self::with_clock(config, VirtualClock::default())
    }

    pub(crate) fn with_clock(
        config: ControllerConfig,
        clock: VirtualClock,
    ) -> Result<Self, BuildError> {
        let config = config.validated()?;
        let now = clock.now();

        Ok(Self {
            queue_mode: config.queue_mode,
            current_floor: config.initial_floor,
            config,
            clock,
            timers: TimerScheduler::new(),
            queue: RequestQueue::new(),
            overlay: FailureOverlay::new(),
            history: StateHistory::new(),
            stats: Statistics::new(),
            sinks: Vec::new(),
            auto_advance: Guard::new(|s: &ControllerSnapshot| !s.any_failure()),
            state: ElevatorState::Idle,
            entered_at: now,
            epoch: 0,
            target_floor: None,
            direction: Direction::None,
            door_open: false,
            occupants: 0,
            next_request_id: 1,
            travel: None,
            recovery_timer: None,
            reboot_epoch: None,
        })
    }

    /// Add an event subscriber. It receives the current outputs immediately.
    pub fn subscribe(&mut self, mut sink: Box<dyn EventSink>) {
        sink.outputs_changed(&self.outputs());
        self.sinks.push(sink);
    }

    /// Apply one command. This is the single serialized entry point.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        debug!("dispatching {:?}", command);
        match command {
            Command::RequestFloor {
                floor,
                direction,
                priority,
            } => self.request_floor(floor, direction, priority),
            Command::CancelRequest { id } => self.cancel_request(id),
            Command::ClearQueue => self.clear_queue(),
            Command::OpenDoor => self.open_door(),
            Command::CloseDoor => self.close_door(),
            Command::EmergencyStop => self.emergency_stop(),
            Command::ResetFromEmergency => self.reset_from_emergency(),
            Command::SimulateOverload => self.simulate_overload(),
            Command::ClearOverload => self.clear_overload(),
            Command::SimulatePowerFailure => self.simulate_power_failure(),
            Command::RestorePower => self.restore_power(),
            Command::AddOccupant => self.add_occupant(),
            Command::RemoveOccupant => self.remove_occupant(),
            Command::SetQueueMode { mode } => self.set_queue_mode(mode),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn state(&self) -> ElevatorState {
        self.state
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            current_floor: self.current_floor,
            target_floor: self.target_floor,
            direction: self.direction,
            door_open: self.door_open,
            occupants: self.occupants,
            weight_percent: self.weight_percent(),
            emergency: self.overlay.is_active(Failure::Emergency),
            overload: self.overlay.is_active(Failure::Overload),
            power_failure: self.overlay.is_active(Failure::PowerFailure),
            queue_length: self.queue.len(),
        }
    }

    /// Current output vector. Never mutates anything.
    pub fn outputs(&self) -> OutputVector {
        compute_outputs(
            self.state,
            &OutputInputs {
                current_floor: self.current_floor,
                target_floor: self.target_floor,
                occupants: self.occupants,
                weight_percent: self.weight_percent(),
                door_open: self.door_open,
                power_failure: self.overlay.is_active(Failure::PowerFailure)
                    || self.reboot_epoch == Some(self.epoch),
            },
        )
    }

    pub fn weight_percent(&self) -> u32 {
        self.config.weight_percent(self.occupants)
    }

    pub fn history(&self) -> &StateHistory<ElevatorState> {
        &self.history
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn queue_mode(&self) -> QueueMode {
        self.queue_mode
    }

    pub fn emergency_log(&self) -> &[EmergencyRecord] {
        self.overlay.emergency_log()
    }

    /// The failure currently overriding normal operation, if any.
    pub fn active_failure(&self) -> Option<Failure> {
        self.overlay.active()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Virtual time since the controller was created.
    pub fn uptime(&self) -> Duration {
        self.clock.elapsed()
    }

    /// How long the controller has been in its current state.
    pub fn time_in_current_state(&self) -> Duration {
        since(self.entered_at, self.clock.now())
    }

    /// When the next armed timer fires.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    /// True when no timer is armed, so nothing changes without a command.
    pub fn is_settled(&self) -> bool {
        self.timers.is_empty()
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    /// Advance the virtual clock by `by`, firing every timer that comes due.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.clock.after(by);
        self.advance_to(until)
    }

    /// Advance the virtual clock to `until`, firing due timers in order.
    pub fn advance_to(&mut self, until: DateTime<Utc>) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(until) {
            self.clock.advance_to(timer.fire_at);
            self.fire(timer);
            fired += 1;
        }
        self.clock.advance_to(until);
        fired
    }

    /// Keep firing timers until none is armed or `limit` of virtual time has
    /// passed. Returns whether the controller settled.
    pub fn run_until_settled(&mut self, limit: Duration) -> bool {
        let deadline = self.clock.after(limit);
        while let Some(next) = self.timers.next_deadline() {
            if next > deadline {
                break;
            }
            self.advance_to(next);
        }
        self.is_settled()
    }

    fn fire(&mut self, fired: FiredTimer) {
        let token = fired.token;
        debug!(
            "{:?} timer fired at {} (armed in {}, epoch {})",
            token.kind, fired.fire_at, token.state, token.epoch
        );

        match token.kind {
            TimerKind::PowerRecovery => {
                self.recovery_timer = None;
                if self.overlay.is_active(Failure::PowerFailure) {
                    info!("power restored automatically");
                    self.restore_power();
                } else {
                    debug!("dropping power recovery timer: power already restored");
                }
            }
            TimerKind::PowerReboot => {
                self.reboot_epoch = None;
                if self.overlay.any_active() || token.epoch != self.epoch {
                    debug!("dropping stale power reboot timer");
                    return;
                }
                self.resume_into(recovery_state(self.door_open));
            }
            kind => {
                if !self.honours(&token) {
                    debug!(
                        "dropping stale {:?} timer: armed in {} (epoch {}), now {} (epoch {})",
                        kind, token.state, token.epoch, self.state, self.epoch
                    );
                    return;
                }
                match kind {
                    TimerKind::Travel => self.arrive(),
                    TimerKind::DoorOpening => self.transition_to(ElevatorState::DoorOpen),
                    TimerKind::DoorOpen => self.transition_to(ElevatorState::DoorClosing),
                    TimerKind::DoorClosing => self.transition_to(ElevatorState::DoorClosed),
                    TimerKind::DoorClosed => self.process_next_request(),
                    TimerKind::PowerRecovery | TimerKind::PowerReboot => {}
                }
            }
        }
    }

    /// Stale-timer guard for state timers.
    fn honours(&self, token: &TimerToken) -> bool {
        token.epoch == self.epoch
            && token.state == self.state
            && self.auto_advance.check(&self.snapshot())
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let token = TimerToken {
            kind,
            state: self.state,
            epoch: self.epoch,
        };
        let fire_at = self.clock.after(delay);
        self.timers.arm(fire_at, token)
    }

    // ---------------------------------------------------------------------
    // State machine
    // ---------------------------------------------------------------------

    /// The only place the state value changes.
    fn transition_to(&mut self, to: ElevatorState) {
        if to == self.state {
            return;
        }

        let now = self.clock.now();
        let from = self.state;
        let duration = since(self.entered_at, now);

        self.history.record(StateTransition {
            from,
            to,
            timestamp: now,
            duration,
        });
        info!(
            "{} -> {} at floor {} after {:?}",
            from, to, self.current_floor, duration
        );
        self.emit(ControllerEvent::StateChanged {
            from,
            to,
            timestamp: now,
            duration,
        });

        self.state = to;
        self.entered_at = now;
        self.enter_current_state();
    }

    /// Resume normal operation in `state` after a failure clears.
    ///
    /// If the car is already in `state` its entry behaviour runs again, so the
    /// door cycle restarts instead of stalling with no timer armed.
    fn resume_into(&mut self, state: ElevatorState) {
        if state == self.state {
            info!("resuming in {}", state);
            self.enter_current_state();
        } else {
            self.transition_to(state);
        }
    }

    /// Entry behaviour of the current state, then push the new outputs.
    fn enter_current_state(&mut self) {
        self.epoch += 1;
        self.timers.cancel_state_timers();
        let timings = self.config.timings.clone();

        match self.state {
            ElevatorState::MovingUp | ElevatorState::MovingDown => {
                let target = self.target_floor.unwrap_or(self.current_floor);
                let distance = target.abs_diff(self.current_floor);
                self.travel = Some(TravelLeg {
                    from: self.current_floor,
                    started_at: self.clock.now(),
                });
                self.arm(TimerKind::Travel, timings.travel(distance));
            }
            ElevatorState::DoorOpening => {
                self.stats.door_operations += 1;
                self.door_open = true;
                self.arm(TimerKind::DoorOpening, timings.door_opening());
            }
            ElevatorState::DoorOpen => {
                self.door_open = true;
                self.arm(TimerKind::DoorOpen, timings.door_open());
            }
            ElevatorState::DoorClosing => {
                self.door_open = false;
                self.arm(TimerKind::DoorClosing, timings.door_closing());
            }
            ElevatorState::DoorClosed => {
                self.door_open = false;
                self.arm(TimerKind::DoorClosed, timings.door_closed());
            }
            ElevatorState::Idle => {
                self.door_open = false;
                self.direction = Direction::None;
                self.target_floor = None;
            }
            ElevatorState::Emergency => {
                let previous_state = self
                    .overlay
                    .pre_emergency_state()
                    .unwrap_or(self.state);
                self.overlay.log_emergency(EmergencyRecord {
                    timestamp: self.clock.now(),
                    previous_state,
                    floor: self.current_floor,
                    target_floor: self.target_floor,
                    door_open: self.door_open,
                });
            }
            ElevatorState::Overload => {
                self.door_open = true;
            }
        }

        self.push_outputs();
    }

    /// Travel timer completed: the car is at its target.
    fn arrive(&mut self) {
        let target = self.target_floor.unwrap_or(self.current_floor);
        let floors = target.abs_diff(self.current_floor);
        self.stats.floors_traveled += u64::from(floors);
        self.current_floor = target;
        self.travel = None;
        self.transition_to(ElevatorState::DoorOpening);
    }

    /// Stop a car that is moving when a failure strikes.
    ///
    /// The car is placed at the last floor it fully passed. Travel is not
    /// resumed after recovery.
    fn interrupt_travel(&mut self) {
        let Some(leg) = self.travel.take() else {
            return;
        };
        if !self.state.is_moving() {
            return;
        }

        let target = self.target_floor.unwrap_or(leg.from);
        let distance = target.abs_diff(leg.from);
        let elapsed = since(leg.started_at, self.clock.now()).as_millis();
        let per_floor = u128::from(self.config.timings.travel_per_floor.max(1));
        let passed = u32::try_from(elapsed / per_floor)
            .unwrap_or(u32::MAX)
            .min(distance);

        self.current_floor = match self.state {
            ElevatorState::MovingUp => leg.from + passed,
            _ => leg.from - passed,
        };
        self.stats.floors_traveled += u64::from(passed);
        info!(
            "travel from {} to {} interrupted at floor {}",
            leg.from, target, self.current_floor
        );
    }

    /// Consult the queue from IDLE or DOOR_CLOSED.
    fn process_next_request(&mut self) {
        let next = self.queue.select_next(self.queue_mode).map(|r| r.id);
        let Some(id) = next else {
            if self.state == ElevatorState::DoorClosed {
                self.transition_to(ElevatorState::Idle);
            }
            return;
        };

        let request = match self.queue.consume(id) {
            Ok(request) => request,
            Err(e) => {
                warn!("could not take {} from the queue: {}", id, e);
                return;
            }
        };

        let wait = since(request.enqueued_at, self.clock.now()).as_secs();
        self.stats.record_wait(wait);
        info!(
            "serving request {} for floor {} after {}s",
            request.id, request.floor, wait
        );

        let floor = request.floor;
        let explicit = request.direction;
        self.emit(ControllerEvent::RequestCompleted {
            request,
            wait_time_seconds: wait,
        });

        self.target_floor = Some(floor);
        if floor == self.current_floor {
            self.direction = Direction::None;
            self.transition_to(ElevatorState::DoorOpening);
            return;
        }

        self.direction = explicit.unwrap_or_else(|| Direction::between(self.current_floor, floor));
        let moving = if floor > self.current_floor {
            ElevatorState::MovingUp
        } else {
            ElevatorState::MovingDown
        };
        self.transition_to(moving);
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    /// Request a floor.
    ///
    /// Refused while any failure is active or when the floor is outside the
    /// building. A request for the current floor while IDLE opens the door
    /// without touching the queue.
    pub fn request_floor(
        &mut self,
        floor: i64,
        direction: Option<Direction>,
        priority: bool,
    ) -> Outcome {
        if let Some(failure) = self.overlay.active() {
            return self.reject(RejectReason::SystemUnavailable { failure });
        }

        let max_floor = self.config.max_floor;
        let Some(floor) = u32::try_from(floor).ok().filter(|f| *f <= max_floor) else {
            return self.reject(RejectReason::FloorOutOfRange { floor, max_floor });
        };

        if floor == self.current_floor && self.state == ElevatorState::Idle {
            self.stats.total_requests += 1;
            info!("request for current floor {} opens the door", floor);
            self.transition_to(ElevatorState::DoorOpening);
            return Outcome::Applied;
        }

        let request = Request {
            id: RequestId(self.next_request_id),
            floor,
            direction,
            priority,
            enqueued_at: self.clock.now(),
        };
        if let Err(e) = self.queue.enqueue(request.clone(), self.queue_mode) {
            return self.reject(queue_rejection(e));
        }
        self.next_request_id += 1;
        self.stats.total_requests += 1;

        info!(
            "queued request {} for floor {}{} ({} pending)",
            request.id,
            floor,
            if priority { " [priority]" } else { "" },
            self.queue.len()
        );
        let id = request.id;
        self.emit(ControllerEvent::RequestEnqueued { request });

        if self.state.accepts_dispatch() {
            self.process_next_request();
        }
        Outcome::Enqueued(id)
    }

    /// Request a floor from text input: `G`/`g` or a decimal number.
    pub fn request_floor_text(
        &mut self,
        input: &str,
        direction: Option<Direction>,
        priority: bool,
    ) -> Outcome {
        match parse_floor(input) {
            Some(floor) => self.request_floor(floor, direction, priority),
            None => self.reject(RejectReason::InvalidFloorInput {
                input: input.to_string(),
            }),
        }
    }

    pub fn cancel_request(&mut self, id: RequestId) -> Outcome {
        match self.queue.consume(id) {
            Ok(request) => {
                info!("cancelled request {} for floor {}", id, request.floor);
                self.emit(ControllerEvent::RequestCancelled { request });
                Outcome::Applied
            }
            Err(e) => self.reject(queue_rejection(e)),
        }
    }

    /// Drop every pending request.
    pub fn clear_queue(&mut self) -> Outcome {
        let dropped = self.queue.clear().len();
        info!("cleared {} pending request(s)", dropped);
        self.emit(ControllerEvent::QueueCleared { dropped });
        Outcome::Applied
    }

    pub fn set_queue_mode(&mut self, mode: QueueMode) -> Outcome {
        if self.queue_mode != mode {
            info!("queue mode {} -> {}", self.queue_mode, mode);
            self.queue_mode = mode;
        }
        Outcome::Applied
    }

    fn reject(&mut self, reason: RejectReason) -> Outcome {
        warn!("request rejected: {}", reason);
        self.emit(ControllerEvent::RequestRejected {
            reason: reason.clone(),
        });
        Outcome::Rejected(reason)
    }

    // ---------------------------------------------------------------------
    // Doors
    // ---------------------------------------------------------------------

    /// Reopen the door. Honoured while the door is open, closing or closed.
    pub fn open_door(&mut self) -> Outcome {
        if let Some(failure) = self.overlay.active() {
            return Outcome::Ignored(IgnoreReason::FailureActive(failure));
        }
        match self.state {
            ElevatorState::DoorOpen | ElevatorState::DoorClosing | ElevatorState::DoorClosed => {
                self.transition_to(ElevatorState::DoorOpening);
                Outcome::Applied
            }
            state => Outcome::Ignored(IgnoreReason::InvalidState(state)),
        }
    }

    /// Close an open door early.
    pub fn close_door(&mut self) -> Outcome {
        if let Some(failure) = self.overlay.active() {
            return Outcome::Ignored(IgnoreReason::FailureActive(failure));
        }
        match self.state {
            ElevatorState::DoorOpen => {
                self.transition_to(ElevatorState::DoorClosing);
                Outcome::Applied
            }
            state => Outcome::Ignored(IgnoreReason::InvalidState(state)),
        }
    }

    // ---------------------------------------------------------------------
    // Failures
    // ---------------------------------------------------------------------

    /// Common protocol for a newly raised failure.
    fn suspend_operation(&mut self, failure: Failure) {
        let cancelled = self.timers.cancel_all();
        self.recovery_timer = None;
        self.reboot_epoch = None;
        debug!("{} cancelled {} timer(s)", failure, cancelled);
        self.interrupt_travel();
        self.queue.suspend(failure);
        warn!(
            "{} at floor {} in {}",
            failure, self.current_floor, self.state
        );
        self.emit(ControllerEvent::triggered(failure));
    }

    fn resume_operation(&mut self, failure: Failure) {
        self.queue.resume();
        info!("{} cleared at floor {}", failure, self.current_floor);
        self.emit(ControllerEvent::cleared(failure));
    }

    pub fn emergency_stop(&mut self) -> Outcome {
        if let Err(reason) = self.overlay.raise_emergency(self.state) {
            return Outcome::Ignored(reason);
        }
        self.stats.emergency_events += 1;
        self.suspend_operation(Failure::Emergency);
        self.transition_to(ElevatorState::Emergency);
        Outcome::Applied
    }

    /// Leave EMERGENCY. Travel is never resumed.
    pub fn reset_from_emergency(&mut self) -> Outcome {
        if self.state != ElevatorState::Emergency {
            return Outcome::Ignored(IgnoreReason::InvalidState(self.state));
        }
        if let Err(reason) = self.overlay.clear(Failure::Emergency) {
            return Outcome::Ignored(reason);
        }
        self.resume_operation(Failure::Emergency);
        self.transition_to(recovery_state(self.door_open));
        Outcome::Applied
    }

    pub fn simulate_overload(&mut self) -> Outcome {
        if let Err(reason) = self.overlay.raise(Failure::Overload) {
            return Outcome::Ignored(reason);
        }
        self.stats.overload_events += 1;
        self.suspend_operation(Failure::Overload);
        self.door_open = true;
        self.transition_to(ElevatorState::Overload);
        Outcome::Applied
    }

    /// Clear the overload if the current occupancy allows it.
    pub fn clear_overload(&mut self) -> Outcome {
        if !self.overlay.is_active(Failure::Overload) {
            return Outcome::Ignored(IgnoreReason::NotActive(Failure::Overload));
        }
        let weight_percent = self.weight_percent();
        if exceeds_capacity(weight_percent) {
            return Outcome::Ignored(IgnoreReason::StillOverweight { weight_percent });
        }
        if let Err(reason) = self.overlay.clear(Failure::Overload) {
            return Outcome::Ignored(reason);
        }
        self.resume_operation(Failure::Overload);
        self.transition_to(ElevatorState::DoorOpen);
        Outcome::Applied
    }

    /// Cut power. The state value is kept but every timer stops, and power
    /// comes back on its own after the recovery delay.
    pub fn simulate_power_failure(&mut self) -> Outcome {
        if let Err(reason) = self.overlay.raise(Failure::PowerFailure) {
            return Outcome::Ignored(reason);
        }
        self.stats.power_failures += 1;
        self.suspend_operation(Failure::PowerFailure);
        self.push_outputs();
        let recovery = self.config.timings.power_recovery();
        self.recovery_timer = Some(self.arm(TimerKind::PowerRecovery, recovery));
        Outcome::Applied
    }

    /// Restore power. Normal operation resumes after the reboot delay.
    pub fn restore_power(&mut self) -> Outcome {
        if let Err(reason) = self.overlay.clear(Failure::PowerFailure) {
            return Outcome::Ignored(reason);
        }
        if let Some(id) = self.recovery_timer.take() {
            self.timers.cancel(id);
        }
        self.resume_operation(Failure::PowerFailure);
        self.reboot_epoch = Some(self.epoch);
        self.push_outputs();
        let reboot = self.config.timings.power_reboot();
        self.arm(TimerKind::PowerReboot, reboot);
        Outcome::Applied
    }

    // ---------------------------------------------------------------------
    // Occupancy
    // ---------------------------------------------------------------------

    /// One person steps in. Crossing the capacity threshold raises overload.
    pub fn add_occupant(&mut self) -> Outcome {
        if let Some(failure) = self.overlay.active() {
            return Outcome::Ignored(IgnoreReason::FailureActive(failure));
        }
        let max = self.config.max_occupants;
        if self.occupants >= max {
            return Outcome::Ignored(IgnoreReason::CarFull { max });
        }

        self.occupants += 1;
        let weight = self.weight_percent();
        info!("occupant in: {} aboard, load {}%", self.occupants, weight);
        self.push_outputs();

        if exceeds_capacity(weight) {
            self.simulate_overload();
        }
        Outcome::Applied
    }

    /// One person steps out. Dropping back under the threshold clears an
    /// active overload.
    pub fn remove_occupant(&mut self) -> Outcome {
        match self.overlay.active() {
            Some(failure @ (Failure::Emergency | Failure::PowerFailure)) => {
                return Outcome::Ignored(IgnoreReason::FailureActive(failure));
            }
            _ => {}
        }
        if self.occupants == 0 {
            return Outcome::Ignored(IgnoreReason::CarEmpty);
        }

        self.occupants -= 1;
        let weight = self.weight_percent();
        info!("occupant out: {} aboard, load {}%", self.occupants, weight);
        self.push_outputs();

        if self.overlay.is_active(Failure::Overload) && !exceeds_capacity(weight) {
            self.clear_overload();
        }
        Outcome::Applied
    }

    // ---------------------------------------------------------------------
    // Sinks
    // ---------------------------------------------------------------------

    fn emit(&mut self, event: ControllerEvent) {
        for sink in &mut self.sinks {
            sink.emit(&event);
        }
    }

    fn push_outputs(&mut self) {
        if self.sinks.is_empty() {
            return;
        }
        let outputs = self.outputs();
        for sink in &mut self.sinks {
            sink.outputs_changed(&outputs);
        }
    }
}

fn queue_rejection(error: QueueError) -> RejectReason {
    match error {
        QueueError::Suspended(failure) => RejectReason::SystemUnavailable { failure },
        QueueError::NotFound(id) => RejectReason::UnknownRequest { id },
        QueueError::DuplicateId(id) => RejectReason::DuplicateRequest { id },
    }
}

fn parse_floor(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("g") {
        return Some(0);
    }
    trimmed.parse().ok()
}
