//! Pending floor requests: admission and next-target selection.

use crate::core::Direction;
use crate::overlay::Failure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Monotonic request identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A floor request. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub floor: u32,
    /// Hall-call direction, if the request came from a call button
    pub direction: Option<Direction>,
    pub priority: bool,
    pub enqueued_at: DateTime<Utc>,
}

/// Selection policy for the next request.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueueMode {
    /// First come, first served; priority flags are ignored.
    #[default]
    Fcfs,
    /// Priority-flagged requests are served first, in arrival order.
    Priority,
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fcfs => "FCFS",
            Self::Priority => "PRIORITY",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    #[error("request {0} is not in the queue")]
    NotFound(RequestId),

    #[error("request {0} is already queued")]
    DuplicateId(RequestId),

    #[error("queue is suspended by {0}")]
    Suspended(Failure),
}

/// Ordered sequence of pending requests.
///
/// Insertion order is preserved; in [`QueueMode::Priority`] a priority
/// request jumps to the head. The failure overlay suspends the queue, and a
/// suspended queue refuses every new request.
#[derive(Clone, Debug, Default)]
pub struct RequestQueue {
    requests: VecDeque<Request>,
    suspended_by: Option<Failure>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request under the given selection mode.
    pub fn enqueue(&mut self, request: Request, mode: QueueMode) -> Result<(), QueueError> {
        if let Some(failure) = self.suspended_by {
            return Err(QueueError::Suspended(failure));
        }
        if self.contains(request.id) {
            return Err(QueueError::DuplicateId(request.id));
        }

        if request.priority && mode == QueueMode::Priority {
            self.requests.push_front(request);
        } else {
            self.requests.push_back(request);
        }
        Ok(())
    }

    /// The request that would be served next, without removing it.
    ///
    /// Among equally ranked requests the earliest arrival wins.
    pub fn select_next(&self, mode: QueueMode) -> Option<&Request> {
        match mode {
            QueueMode::Priority => self
                .requests
                .iter()
                .find(|r| r.priority)
                .or_else(|| self.requests.front()),
            QueueMode::Fcfs => self.requests.front(),
        }
    }

    /// Remove and return a request by id.
    pub fn consume(&mut self, id: RequestId) -> Result<Request, QueueError> {
        let index = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(QueueError::NotFound(id))?;
        self.requests.remove(index).ok_or(QueueError::NotFound(id))
    }

    /// Drop every pending request, returning them in queue order.
    pub fn clear(&mut self) -> Vec<Request> {
        self.requests.drain(..).collect()
    }

    pub fn suspend(&mut self, failure: Failure) {
        self.suspended_by = Some(failure);
    }

    pub fn resume(&mut self) {
        self.suspended_by = None;
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.requests.iter().any(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: u64, floor: u32, priority: bool) -> Request {
        Request {
            id: RequestId(id),
            floor,
            direction: None,
            priority,
            enqueued_at: Utc::now(),
        }
    }

    fn floors(queue: &RequestQueue) -> Vec<u32> {
        queue.iter().map(|r| r.floor).collect()
    }

    #[test]
    fn fcfs_preserves_arrival_order() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, 2, false), QueueMode::Fcfs).unwrap();
        queue.enqueue(request(2, 4, true), QueueMode::Fcfs).unwrap();

        assert_eq!(floors(&queue), vec![2, 4]);
        assert_eq!(queue.select_next(QueueMode::Fcfs).unwrap().floor, 2);
    }

    #[test]
    fn priority_mode_puts_priority_at_head() {
        let mut queue = RequestQueue::new();
        queue
            .enqueue(request(1, 2, false), QueueMode::Priority)
            .unwrap();
        queue
            .enqueue(request(2, 4, true), QueueMode::Priority)
            .unwrap();

        assert_eq!(floors(&queue), vec![4, 2]);
        assert_eq!(queue.select_next(QueueMode::Priority).unwrap().floor, 4);
    }

    #[test]
    fn priority_selection_finds_flagged_request_after_mode_switch() {
        // Enqueued under FCFS, selected under PRIORITY.
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, 1, false), QueueMode::Fcfs).unwrap();
        queue.enqueue(request(2, 3, true), QueueMode::Fcfs).unwrap();
        queue.enqueue(request(3, 0, true), QueueMode::Fcfs).unwrap();

        let next = queue.select_next(QueueMode::Priority).unwrap();
        assert_eq!(next.id, RequestId(2));
    }

    #[test]
    fn priority_falls_back_to_head() {
        let mut queue = RequestQueue::new();
        queue
            .enqueue(request(1, 3, false), QueueMode::Priority)
            .unwrap();
        queue
            .enqueue(request(2, 1, false), QueueMode::Priority)
            .unwrap();

        assert_eq!(
            queue.select_next(QueueMode::Priority).unwrap().id,
            RequestId(1)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(7, 2, false), QueueMode::Fcfs).unwrap();

        let result = queue.enqueue(request(7, 3, false), QueueMode::Fcfs);
        assert_eq!(result, Err(QueueError::DuplicateId(RequestId(7))));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn consume_removes_by_id() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, 2, false), QueueMode::Fcfs).unwrap();
        queue.enqueue(request(2, 3, false), QueueMode::Fcfs).unwrap();

        let taken = queue.consume(RequestId(2)).unwrap();
        assert_eq!(taken.floor, 3);
        assert_eq!(floors(&queue), vec![2]);

        assert_eq!(
            queue.consume(RequestId(2)),
            Err(QueueError::NotFound(RequestId(2)))
        );
    }

    #[test]
    fn suspended_queue_refuses_requests() {
        let mut queue = RequestQueue::new();
        queue.suspend(Failure::Overload);

        let result = queue.enqueue(request(1, 3, false), QueueMode::Fcfs);
        assert_eq!(result, Err(QueueError::Suspended(Failure::Overload)));
        assert!(queue.is_empty());

        queue.resume();
        assert!(queue.enqueue(request(1, 3, false), QueueMode::Fcfs).is_ok());
    }

    #[test]
    fn clear_returns_everything_in_order() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, 2, false), QueueMode::Fcfs).unwrap();
        queue.enqueue(request(2, 0, false), QueueMode::Fcfs).unwrap();

        let dropped = queue.clear();
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].id, RequestId(1));
        assert!(queue.is_empty());
    }
}
