//! ContextArbiter - exclusive ownership of inbound context paths.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            ContextArbiter                                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  slots: RwLock<HashMap<ContextPath, Arc<SlotCell>>>          │
//! │                                                              │
//! │  SlotCell                                                    │
//! │    state:  Mutex<OwnershipSlot>   (per-path mutation lock)   │
//! │    active: ArcSwapOption<Registration>  (lock-free mirror)   │
//! └──────────────────────────────────────────────────────────────┘
//!           ▲                                  ▲
//!           │ register / deregister            │ get_active
//!     ┌─────────────────────┐          ┌──────────────────┐
//!     │ lifecycle manager   │          │ HTTP dispatch    │
//!     └─────────────────────┘          └──────────────────┘
//! ```
//!
//! ## Locking
//!
//! 1. The table lock is held only to look up, insert or remove a cell. It is
//!    never held while waiting for a per-path lock.
//! 2. All mutations of one path, including the sink writes they trigger, run
//!    under that path's `Mutex`. Different paths never contend on it.
//! 3. `get_active` reads the `ArcSwapOption` mirror and never touches the
//!    per-path lock. The mirror is swapped under the per-path lock, so
//!    readers see the old owner or the new one, never two.
//! 4. A cell that becomes vacant is marked retired under its lock and then
//!    removed from the table. Writers that raced onto a retired cell look it
//!    up again.
//!
//! Sinks run under the per-path lock and must not call back into the arbiter
//! for the same path.

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ArbiterConfig;
use crate::diagnostics;
use crate::error::ArbiterError;
use crate::path::ContextPath;
use crate::registration::{Registration, RegistrationIdentity};
use crate::slot::{Claim, OwnershipSlot, Release, SlotSnapshot};

/// Where a registration sits after `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RegistrationOutcome {
    /// Serving traffic for the path.
    Active,
    /// Waiting in standby at this 1-based position.
    Queued { position: usize },
}

impl RegistrationOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

struct CellState {
    slot: OwnershipSlot,
    retired: bool,
}

struct SlotCell {
    state: Mutex<CellState>,
    active: ArcSwapOption<Registration>,
}

impl SlotCell {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CellState {
                slot: OwnershipSlot::new(capacity),
                retired: false,
            }),
            active: ArcSwapOption::empty(),
        }
    }
}

/// Single source of truth for who owns each context path.
///
/// Construct one per runtime and share it (`Arc<ContextArbiter>`) between the
/// lifecycle manager and the HTTP dispatch layer. Independent instances share
/// nothing.
pub struct ContextArbiter {
    slots: RwLock<HashMap<ContextPath, Arc<SlotCell>>>,
    capacity: usize,
}

impl ContextArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            capacity: config.max_queue_size,
        }
    }

    /// Standby capacity per path.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claim `path` for `registration`.
    ///
    /// The first registration for an unowned path becomes active (health Up,
    /// `Activation` entry). Later ones are queued (health Down naming the
    /// owner, `Queueing` entry). Registering an identity that is already
    /// active or queued changes nothing and returns where it sits; the
    /// originally registered handle is kept.
    ///
    /// Fails with [`ArbiterError::RegistrationRejected`] when the standby
    /// queue is full. The rejected registration's sinks are not written.
    pub fn register(
        &self,
        path: &ContextPath,
        registration: Arc<Registration>,
    ) -> Result<RegistrationOutcome, ArbiterError> {
        loop {
            let cell = self.cell_or_insert(path);
            let mut state = cell.state.lock();
            if state.retired {
                continue;
            }

            return match state.slot.claim(Arc::clone(&registration)) {
                Claim::Activated => {
                    cell.active.store(Some(Arc::clone(&registration)));
                    info!(
                        path = %path,
                        registration = %registration.identity(),
                        "Registration activated"
                    );
                    diagnostics::announce_activation(path, &registration);
                    Ok(RegistrationOutcome::Active)
                }
                Claim::Queued { position } => {
                    debug!(
                        path = %path,
                        registration = %registration.identity(),
                        position,
                        "Registration queued in standby"
                    );
                    if let Some(active) = state.slot.active() {
                        diagnostics::announce_queued(path, &registration, active);
                    }
                    Ok(RegistrationOutcome::Queued { position })
                }
                Claim::AlreadyActive => {
                    debug!(path = %path, registration = %registration.identity(), "Already active");
                    Ok(RegistrationOutcome::Active)
                }
                Claim::AlreadyQueued { position } => {
                    debug!(
                        path = %path,
                        registration = %registration.identity(),
                        position,
                        "Already queued"
                    );
                    Ok(RegistrationOutcome::Queued { position })
                }
                Claim::Rejected => {
                    warn!(
                        path = %path,
                        registration = %registration.identity(),
                        capacity = self.capacity,
                        "Registration rejected: standby queue full"
                    );
                    Err(ArbiterError::RegistrationRejected {
                        path: path.clone(),
                        capacity: self.capacity,
                    })
                }
            };
        }
    }

    /// Withdraw `registration` from `path`.
    ///
    /// Removing the owner promotes the standby head (health Up, `Activation`
    /// entry) and repoints every remaining standby Down cause at it. With
    /// nobody waiting the path becomes free. Removing a standby entry leaves
    /// the owner and the other entries untouched. Unknown registrations are a
    /// no-op.
    pub fn deregister(&self, path: &ContextPath, registration: &Registration) {
        let identity = registration.identity();
        loop {
            let Some(cell) = self.cell(path) else {
                debug!(path = %path, registration = %identity, "Deregister on unowned path ignored");
                return;
            };
            let mut state = cell.state.lock();
            if state.retired {
                continue;
            }

            match state.slot.release(identity) {
                Release::Promoted { previous, next } => {
                    cell.active.store(Some(Arc::clone(&next)));
                    info!(
                        path = %path,
                        previous = %previous.identity(),
                        registration = %next.identity(),
                        remaining = state.slot.standby_len(),
                        "Standby registration promoted"
                    );
                    diagnostics::announce_activation(path, &next);
                    diagnostics::refresh_standby(path, &next, state.slot.standby());
                }
                Release::Vacated { previous } => {
                    cell.active.store(None);
                    state.retired = true;
                    let mut slots = self.slots.write();
                    if slots.get(path).is_some_and(|c| Arc::ptr_eq(c, &cell)) {
                        slots.remove(path);
                    }
                    drop(slots);
                    info!(path = %path, previous = %previous.identity(), "Context path released");
                }
                Release::Withdrawn { removed } => {
                    debug!(
                        path = %path,
                        registration = %removed.identity(),
                        "Standby registration withdrawn"
                    );
                }
                Release::NotFound => {
                    debug!(path = %path, registration = %identity, "Deregister of unknown registration ignored");
                }
            }
            return;
        }
    }

    /// Current owner of `path`. Never blocks on registration traffic for the
    /// same path.
    pub fn get_active(&self, path: &ContextPath) -> Option<Arc<Registration>> {
        self.slots
            .read()
            .get(path)
            .and_then(|cell| cell.active.load_full())
    }

    /// Where `identity` currently sits for `path`, if anywhere.
    pub fn status(
        &self,
        path: &ContextPath,
        identity: &RegistrationIdentity,
    ) -> Option<RegistrationOutcome> {
        let cell = self.cell(path)?;
        let state = cell.state.lock();
        if state.retired {
            return None;
        }
        if state
            .slot
            .active()
            .is_some_and(|active| active.identity() == identity)
        {
            return Some(RegistrationOutcome::Active);
        }
        state
            .slot
            .standby_position(identity)
            .map(|position| RegistrationOutcome::Queued { position })
    }

    pub fn is_registered(&self, path: &ContextPath, identity: &RegistrationIdentity) -> bool {
        self.status(path, identity).is_some()
    }

    pub fn snapshot(&self, path: &ContextPath) -> Option<SlotSnapshot> {
        let cell = self.cell(path)?;
        let state = cell.state.lock();
        if state.retired || state.slot.is_vacant() {
            return None;
        }
        Some(state.slot.snapshot(path))
    }

    /// Snapshots of every owned path, sorted by path.
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        let mut cells: Vec<(ContextPath, Arc<SlotCell>)> = self
            .slots
            .read()
            .iter()
            .map(|(path, cell)| (path.clone(), Arc::clone(cell)))
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));

        cells
            .into_iter()
            .filter_map(|(path, cell)| {
                let state = cell.state.lock();
                if state.retired || state.slot.is_vacant() {
                    None
                } else {
                    Some(state.slot.snapshot(&path))
                }
            })
            .collect()
    }

    /// Paths with a slot, sorted.
    pub fn paths(&self) -> Vec<ContextPath> {
        let mut paths: Vec<_> = self.slots.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn cell(&self, path: &ContextPath) -> Option<Arc<SlotCell>> {
        self.slots.read().get(path).cloned()
    }

    fn cell_or_insert(&self, path: &ContextPath) -> Arc<SlotCell> {
        if let Some(cell) = self.cell(path) {
            return cell;
        }
        let mut slots = self.slots.write();
        let cell = slots
            .entry(path.clone())
            .or_insert_with(|| Arc::new(SlotCell::new(self.capacity)));
        Arc::clone(cell)
    }
}

impl Default for ContextArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}
