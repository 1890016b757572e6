//! State transition history tracking.
//!
//! The controller appends one [`StateTransition`] per state change. The log
//! is append-only: records are never edited or removed, and timestamps are
//! monotonically non-decreasing because they come from the controller's
//! virtual clock.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use liftsim::core::{ElevatorState, StateTransition};
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let transition = StateTransition {
///     from: ElevatorState::Idle,
///     to: ElevatorState::MovingUp,
///     timestamp: Utc::now(),
///     duration: Duration::from_secs(3),
/// };
/// assert_eq!(transition.duration.as_secs(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Time spent in `from` before this transition
    pub duration: Duration,
}

/// Ordered, append-only history of state transitions.
///
/// # Example
///
/// ```rust
/// use liftsim::core::{ElevatorState, StateHistory, StateTransition};
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: ElevatorState::Idle,
///     to: ElevatorState::DoorOpening,
///     timestamp: Utc::now(),
///     duration: Duration::ZERO,
/// });
/// history.record(StateTransition {
///     from: ElevatorState::DoorOpening,
///     to: ElevatorState::DoorOpen,
///     timestamp: Utc::now(),
///     duration: Duration::from_secs(2),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // IDLE -> DOOR_OPENING -> DOOR_OPEN
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition to the log.
    pub fn record(&mut self, transition: StateTransition<S>) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: initial state, then
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and the last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Total completed dwell time in `state`.
    ///
    /// Only stays that have ended (i.e. were left by a recorded transition)
    /// are counted; the time spent in the current state is not included.
    pub fn time_in_state(&self, state: &S) -> Duration {
        self.transitions
            .iter()
            .filter(|t| &t.from == state)
            .map(|t| t.duration)
            .sum()
    }

    /// The last `n` transitions, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter().rev().take(n)
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ElevatorState;

    fn transition(
        from: ElevatorState,
        to: ElevatorState,
        at: DateTime<Utc>,
        secs: u64,
    ) -> StateTransition<ElevatorState> {
        StateTransition {
            from,
            to,
            timestamp: at,
            duration: Duration::from_secs(secs),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<ElevatorState> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_appends() {
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::Idle,
            ElevatorState::MovingUp,
            Utc::now(),
            0,
        ));

        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().to, ElevatorState::MovingUp);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let now = Utc::now();
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::Idle,
            ElevatorState::MovingUp,
            now,
            0,
        ));
        history.record(transition(
            ElevatorState::MovingUp,
            ElevatorState::DoorOpening,
            now,
            4,
        ));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![
                &ElevatorState::Idle,
                &ElevatorState::MovingUp,
                &ElevatorState::DoorOpening
            ]
        );
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::Idle,
            ElevatorState::MovingUp,
            start,
            0,
        ));
        history.record(transition(
            ElevatorState::MovingUp,
            ElevatorState::DoorOpening,
            start + chrono::Duration::seconds(6),
            6,
        ));

        assert_eq!(history.duration(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::Idle,
            ElevatorState::DoorOpening,
            Utc::now(),
            9,
        ));

        assert_eq!(history.duration(), Some(Duration::ZERO));
    }

    #[test]
    fn time_in_state_sums_completed_stays() {
        let now = Utc::now();
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::DoorOpen,
            ElevatorState::DoorClosing,
            now,
            5,
        ));
        history.record(transition(
            ElevatorState::DoorClosing,
            ElevatorState::DoorOpening,
            now,
            1,
        ));
        history.record(transition(
            ElevatorState::DoorOpening,
            ElevatorState::DoorOpen,
            now,
            2,
        ));
        history.record(transition(
            ElevatorState::DoorOpen,
            ElevatorState::DoorClosing,
            now,
            5,
        ));

        assert_eq!(
            history.time_in_state(&ElevatorState::DoorOpen),
            Duration::from_secs(10)
        );
        assert_eq!(
            history.time_in_state(&ElevatorState::Idle),
            Duration::ZERO
        );
    }

    #[test]
    fn recent_is_newest_first() {
        let now = Utc::now();
        let mut history = StateHistory::new();
        history.record(transition(ElevatorState::Idle, ElevatorState::MovingUp, now, 0));
        history.record(transition(ElevatorState::MovingUp, ElevatorState::DoorOpening, now, 2));
        history.record(transition(ElevatorState::DoorOpening, ElevatorState::DoorOpen, now, 2));

        let recent: Vec<_> = history.recent(2).map(|t| t.to).collect();
        assert_eq!(recent, vec![ElevatorState::DoorOpen, ElevatorState::DoorOpening]);
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::new();
        history.record(transition(
            ElevatorState::Idle,
            ElevatorState::MovingDown,
            Utc::now(),
            1,
        ));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<ElevatorState> = serde_json::from_str(&json).unwrap();

        assert_eq!(history.transitions(), deserialized.transitions());
    }
}
