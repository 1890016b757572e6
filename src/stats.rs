//! Operating statistics.

use serde::{Deserialize, Serialize};

/// Counters kept by the controller over its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Valid floor requests accepted (queued or served on the spot)
    pub total_requests: u64,
    /// Requests taken from the queue and dispatched
    pub completed_requests: u64,
    pub floors_traveled: u64,
    /// Entries into DOOR_OPENING
    pub door_operations: u64,
    pub emergency_events: u64,
    pub overload_events: u64,
    pub power_failures: u64,
    /// Queue wait of every dispatched request, in whole seconds
    pub wait_times: Vec<u64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_wait(&mut self, seconds: u64) {
        self.completed_requests += 1;
        self.wait_times.push(seconds);
    }

    /// Mean queue wait in seconds, or `None` before the first dispatch.
    pub fn average_wait(&self) -> Option<f64> {
        if self.wait_times.is_empty() {
            return None;
        }
        let total: u64 = self.wait_times.iter().sum();
        Some(total as f64 / self.wait_times.len() as f64)
    }

    /// Total failure events of any kind.
    pub fn failure_events(&self) -> u64 {
        self.emergency_events + self.overload_events + self.power_failures
    }
}
