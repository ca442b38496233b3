//! Ownership state of a single context path.
//!
//! `OwnershipSlot` is a plain state machine with no locking and no side
//! effects. The arbiter serializes access to it and turns the returned
//! [`Claim`] / [`Release`] transitions into health and activity writes.
//!
//! ## Invariants
//!
//! - At most one active registration.
//! - The active registration is never also in the standby queue.
//! - No identity appears twice in the standby queue.
//! - A slot with no active registration has an empty standby queue.

use serde::Serialize;
use std::sync::Arc;

use crate::path::ContextPath;
use crate::registration::{Registration, RegistrationIdentity};
use crate::standby::StandbyQueue;

/// Result of claiming a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The path was unowned; the registration is now active.
    Activated,
    /// Appended to the standby queue at this 1-based position.
    Queued { position: usize },
    /// The identity is already the active owner. Nothing changed.
    AlreadyActive,
    /// The identity is already queued at this position. Nothing changed.
    AlreadyQueued { position: usize },
    /// The standby queue is full. Nothing changed.
    Rejected,
}

/// Result of releasing a path.
#[derive(Debug, Clone)]
pub enum Release {
    /// The active registration left and the standby head took over.
    Promoted {
        previous: Arc<Registration>,
        next: Arc<Registration>,
    },
    /// The active registration left and nobody was waiting.
    Vacated { previous: Arc<Registration> },
    /// A standby registration was withdrawn. The owner is unchanged.
    Withdrawn { removed: Arc<Registration> },
    /// The identity was neither active nor queued.
    NotFound,
}

/// Active owner plus standby queue for one context path.
#[derive(Debug)]
pub struct OwnershipSlot {
    active: Option<Arc<Registration>>,
    // Allocated on first contention, dropped again once drained.
    standby: Option<StandbyQueue>,
    capacity: usize,
}

impl OwnershipSlot {
    pub fn new(capacity: usize) -> Self {
        Self {
            active: None,
            standby: None,
            capacity,
        }
    }

    pub fn claim(&mut self, registration: Arc<Registration>) -> Claim {
        let identity = registration.identity();

        let Some(active) = &self.active else {
            self.active = Some(registration);
            return Claim::Activated;
        };

        if active.identity() == identity {
            return Claim::AlreadyActive;
        }

        if let Some(position) = self.standby_position(identity) {
            return Claim::AlreadyQueued { position };
        }

        let capacity = self.capacity;
        let queue = self
            .standby
            .get_or_insert_with(|| StandbyQueue::new(capacity));
        if queue.try_push(registration) {
            Claim::Queued {
                position: queue.len(),
            }
        } else {
            Claim::Rejected
        }
    }

    pub fn release(&mut self, identity: &RegistrationIdentity) -> Release {
        if let Some(previous) = self.active.take_if(|active| active.identity() == identity) {
            return match self.pop_standby_head() {
                Some(next) => {
                    self.active = Some(Arc::clone(&next));
                    Release::Promoted { previous, next }
                }
                None => Release::Vacated { previous },
            };
        }

        let removed = self.standby.as_mut().and_then(|q| q.remove(identity));
        match removed {
            Some(removed) => {
                self.drop_drained_queue();
                Release::Withdrawn { removed }
            }
            None => Release::NotFound,
        }
    }

    pub fn active(&self) -> Option<&Arc<Registration>> {
        self.active.as_ref()
    }

    pub fn standby(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.standby.iter().flat_map(|q| q.iter())
    }

    pub fn standby_len(&self) -> usize {
        self.standby.as_ref().map_or(0, StandbyQueue::len)
    }

    /// 1-based standby position of an identity.
    pub fn standby_position(&self, identity: &RegistrationIdentity) -> Option<usize> {
        self.standby.as_ref().and_then(|q| q.position(identity))
    }

    pub fn has_standby_queue(&self) -> bool {
        self.standby.is_some()
    }

    /// No owner and nobody waiting; the path is free.
    pub fn is_vacant(&self) -> bool {
        self.active.is_none() && self.standby_len() == 0
    }

    pub fn snapshot(&self, path: &ContextPath) -> SlotSnapshot {
        SlotSnapshot {
            path: path.clone(),
            active: self.active.as_ref().map(|r| r.identity().clone()),
            standby: self.standby().map(|r| r.identity().clone()).collect(),
        }
    }

    fn pop_standby_head(&mut self) -> Option<Arc<Registration>> {
        let head = self.standby.as_mut().and_then(StandbyQueue::pop_head);
        self.drop_drained_queue();
        head
    }

    fn drop_drained_queue(&mut self) {
        if self.standby.as_ref().is_some_and(StandbyQueue::is_empty) {
            self.standby = None;
        }
    }
}

/// Read-only view of a slot: active first, then standby in promotion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    pub path: ContextPath,
    pub active: Option<RegistrationIdentity>,
    pub standby: Vec<RegistrationIdentity>,
}

impl SlotSnapshot {
    /// All identities, active first.
    pub fn all(&self) -> impl Iterator<Item = &RegistrationIdentity> {
        self.active.iter().chain(self.standby.iter())
    }
}
