//! Bounded FIFO of registrations waiting for a context path.
//!
//! Append fails fast when the queue is full; there is no wait-for-space.
//! Insertion order is promotion order.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::registration::{Registration, RegistrationIdentity};

/// Default standby capacity per context path.
pub const MAX_QUEUE_SIZE: usize = 10;

/// Per-path standby queue.
#[derive(Debug)]
pub struct StandbyQueue {
    entries: VecDeque<Arc<Registration>>,
    capacity: usize,
}

impl StandbyQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail. Returns `false` if the queue is full.
    ///
    /// Callers are expected to check [`position`](Self::position) first; the
    /// queue itself does not deduplicate.
    pub fn try_push(&mut self, registration: Arc<Registration>) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push_back(registration);
        true
    }

    /// Remove and return the head (the next registration to promote).
    pub fn pop_head(&mut self) -> Option<Arc<Registration>> {
        self.entries.pop_front()
    }

    /// Remove a registration by identity, wherever it sits.
    pub fn remove(&mut self, identity: &RegistrationIdentity) -> Option<Arc<Registration>> {
        let index = self
            .entries
            .iter()
            .position(|r| r.identity() == identity)?;
        self.entries.remove(index)
    }

    /// 1-based position of the registration, if queued.
    pub fn position(&self, identity: &RegistrationIdentity) -> Option<usize> {
        self.entries
            .iter()
            .position(|r| r.identity() == identity)
            .map(|i| i + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }
}
