//! Timer scheduler for the controller's timed transitions.
//!
//! Timers are plain data: a fire time plus a [`TimerToken`] describing the
//! context that armed them. Firing a timer hands the token back to the
//! controller, which honours it only if the context still matches.

use crate::core::ElevatorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// What an armed timer will do when it fires.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TimerKind {
    /// Car arrives at its target floor.
    Travel,
    /// DOOR_OPENING -> DOOR_OPEN.
    DoorOpening,
    /// DOOR_OPEN -> DOOR_CLOSING (auto-close).
    DoorOpen,
    /// DOOR_CLOSING -> DOOR_CLOSED.
    DoorClosing,
    /// DOOR_CLOSED -> consult the queue.
    DoorClosed,
    /// Automatic restore after a power failure.
    PowerRecovery,
    /// Delay between power restore and resuming the door cycle.
    PowerReboot,
}

impl TimerKind {
    /// Timers that belong to the power-failure condition rather than a state.
    pub fn is_power(&self) -> bool {
        matches!(self, Self::PowerRecovery | Self::PowerReboot)
    }
}

/// Context captured when a timer is armed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TimerToken {
    pub kind: TimerKind,
    /// State that was current when the timer was armed
    pub state: ElevatorState,
    /// Controller context epoch at arming time
    pub epoch: u64,
}

/// Handle to an armed timer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that has come due.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FiredTimer {
    pub id: TimerId,
    pub fire_at: DateTime<Utc>,
    pub token: TimerToken,
}

/// Ordered set of armed timers.
///
/// At most one timer per [`TimerKind`] is armed at any time: arming a kind
/// replaces the previous timer of that kind, so two timers can never be
/// responsible for the same transition.
#[derive(Debug, Default)]
pub struct TimerScheduler {
    armed: BTreeMap<(DateTime<Utc>, TimerId), TimerToken>,
    next_seq: u64,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer to fire at `fire_at`, replacing any timer of the same kind.
    pub fn arm(&mut self, fire_at: DateTime<Utc>, token: TimerToken) -> TimerId {
        self.cancel_kind(token.kind);
        let id = TimerId(self.next_seq);
        self.next_seq += 1;
        debug!(
            "arming {:?} timer for {} (epoch {})",
            token.kind, fire_at, token.epoch
        );
        self.armed.insert((fire_at, id), token);
        id
    }

    /// Cancel one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.armed.keys().find(|(_, armed)| *armed == id).copied();
        match key {
            Some(key) => self.armed.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every timer of `kind`.
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        self.cancel_where(|token| token.kind == kind)
    }

    /// Cancel every timer tied to a state (everything but power timers).
    pub fn cancel_state_timers(&mut self) -> usize {
        self.cancel_where(|token| !token.kind.is_power())
    }

    /// Cancel every armed timer.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.armed.len();
        self.armed.clear();
        if count > 0 {
            debug!("cancelled {} armed timer(s)", count);
        }
        count
    }

    fn cancel_where(&mut self, mut predicate: impl FnMut(&TimerToken) -> bool) -> usize {
        let before = self.armed.len();
        self.armed.retain(|_, token| !predicate(token));
        before - self.armed.len()
    }

    /// Earliest pending fire time.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.armed.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest timer due at or before `now`.
    ///
    /// Timers with equal fire times come out in arming order.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<FiredTimer> {
        let (&(fire_at, id), _) = self.armed.iter().next()?;
        if fire_at > now {
            return None;
        }
        let token = self.armed.remove(&(fire_at, id))?;
        Some(FiredTimer { id, fire_at, token })
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}
