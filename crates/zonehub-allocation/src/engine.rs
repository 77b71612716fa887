//! Allocation engine: the board operations and the list lifecycle.
//!
//! Every operation validates first and mutates second, so a returned
//! [`ZoneError`] always leaves the board exactly as it was.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use zonehub_core::error::ZoneError;
use zonehub_core::result::ZoneResult;
use zonehub_core::types::{Identity, Position, Snapshot, WaitEntry, ZoneOrdinal};

use crate::store::AllocationStore;
use crate::swap::SwapPlan;

/// Open/closed flag and rotation stamp of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationState {
    /// When the list was last rotated or opened.
    pub last_rotation_at: Option<DateTime<Utc>>,
    /// Whether board commands are accepted.
    pub is_open: bool,
}

/// Owns the store and applies board operations to it.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    store: AllocationStore,
    state: RotationState,
}

impl AllocationEngine {
    /// Creates a closed, empty board with `zone_count` zones.
    pub fn new(zone_count: u8) -> Self {
        Self {
            store: AllocationStore::new(zone_count),
            state: RotationState::default(),
        }
    }

    /// Read access to the store.
    pub fn store(&self) -> &AllocationStore {
        &self.store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Copy of the board for presentation.
    pub fn snapshot(&self) -> Snapshot {
        self.store
            .snapshot(self.state.last_rotation_at, self.state.is_open)
    }

    /// Opens the list and stamps the rotation clock.
    pub fn open(&mut self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
        if self.state.is_open {
            return Err(ZoneError::AlreadyOpen);
        }
        self.state.is_open = true;
        self.state.last_rotation_at = Some(now);
        info!(at = %now, "List opened");
        Ok(self.snapshot())
    }

    /// Closes the list and clears every placement.
    pub fn close(&mut self) -> ZoneResult<Snapshot> {
        if !self.state.is_open {
            return Err(ZoneError::AlreadyClosed);
        }
        self.state.is_open = false;
        self.store.clear_all();
        info!("List closed");
        Ok(self.snapshot())
    }

    /// Clears zones and waitlist without touching the lifecycle state.
    pub fn clear_placements(&mut self) -> Snapshot {
        self.store.clear_all();
        self.snapshot()
    }

    /// Returns to the closed, empty, never-rotated state.
    pub fn reset(&mut self) -> Snapshot {
        self.store.clear_all();
        self.state = RotationState::default();
        self.snapshot()
    }

    /// Places `who` in `zone` if it is empty and `who` is not placed elsewhere.
    pub fn join(&mut self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        self.ensure_unplaced(who)?;
        if self.store.zone(zone).is_some() {
            return Err(ZoneError::ZoneFull { zone });
        }
        self.store.set_zone(zone, Some(who.clone()));
        debug!(who = %who, zone = %zone, "Joined zone");
        Ok(self.snapshot())
    }

    /// Empties `zone` if `who` occupies it. The zone is immediately available.
    pub fn leave(&mut self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        if self.store.zone(zone) != Some(who) {
            return Err(ZoneError::NotInZone {
                zone,
                who: who.clone(),
            });
        }
        self.store.set_zone(zone, None);
        debug!(who = %who, zone = %zone, "Left zone");
        Ok(self.snapshot())
    }

    /// Appends `who` to the end of the waitlist.
    pub fn join_waitlist(&mut self, who: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        self.ensure_unplaced(who)?;
        self.store.push_wait(who.clone());
        debug!(
            who = %who,
            position = self.store.waitlist().len(),
            "Joined waitlist"
        );
        Ok(self.snapshot())
    }

    /// Overwrites the front-most free waitlist entry with `who`.
    pub fn reclaim_free(&mut self, who: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        if self.store.waitlist().is_empty() {
            return Err(ZoneError::NoFreeSlot);
        }
        self.ensure_unplaced(who)?;
        let index = self.store.first_free().ok_or(ZoneError::NoFreeSlot)?;
        self.store
            .set_wait_at(index, WaitEntry::Occupied(who.clone()));
        debug!(who = %who, index = index, "Reclaimed free waitlist slot");
        Ok(self.snapshot())
    }

    /// Removes `who` from its zone, or turns its waitlist entry into a hole.
    ///
    /// Waitlist entries are never removed here so later entries keep their
    /// place in the rotation order.
    pub fn exit(&mut self, who: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        match self.store.position_of(who) {
            Some(Position::Zone(zone)) => {
                self.store.set_zone(zone, None);
                debug!(who = %who, zone = %zone, "Removed from zone");
            }
            Some(Position::Wait(index)) => {
                self.store.set_wait_at(index, WaitEntry::Free);
                debug!(who = %who, index = index, "Removed from waitlist");
            }
            None => return Err(ZoneError::NotFound { who: who.clone() }),
        }
        Ok(self.snapshot())
    }

    /// Swaps the placements of two identities; see [`SwapPlan`].
    pub fn swap(&mut self, first: &Identity, second: &Identity) -> ZoneResult<Snapshot> {
        self.ensure_open()?;
        if first == second {
            return Err(ZoneError::SelfSwap { who: first.clone() });
        }
        let plan = SwapPlan::resolve(&self.store, first, second).ok_or_else(|| {
            ZoneError::NeitherFound {
                first: first.clone(),
                second: second.clone(),
            }
        })?;
        plan.apply(&mut self.store);
        match &plan {
            SwapPlan::Exchange { first: a, second: b } => {
                debug!(first = %first, second = %second, from = %a, to = %b, "Swapped");
            }
            SwapPlan::Replace {
                at,
                displaced,
                incoming,
            } => {
                warn!(
                    displaced = %displaced,
                    incoming = %incoming,
                    at = %at,
                    "Swap with an unplaced identity replaced the slot holder"
                );
            }
        }
        Ok(self.snapshot())
    }

    /// Moves the front of the waitlist into the zones.
    ///
    /// Zone `i` receives waitlist entry `i` when that entry is occupied and
    /// stays empty when it is a hole. The first `min(zones, waitlist)`
    /// entries are dropped either way, and the previous occupants leave.
    pub fn rotate(&mut self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
        if !self.state.is_open {
            return Err(ZoneError::ListClosed);
        }
        let consumed = self.store.truncate_wait_front(self.store.zone_count());
        let mut incoming = consumed.into_iter().map(|entry| match entry {
            WaitEntry::Occupied(who) => Some(who),
            WaitEntry::Free => None,
        });
        for index in 0..self.store.zone_count() {
            let occupant = incoming.next().flatten();
            self.store.set_zone(ZoneOrdinal::from_index(index), occupant);
        }
        self.state.last_rotation_at = Some(now);
        info!(
            at = %now,
            waiting = self.store.waitlist().len(),
            "Zones rotated"
        );
        Ok(self.snapshot())
    }

    fn ensure_open(&self) -> ZoneResult<()> {
        if self.state.is_open {
            Ok(())
        } else {
            Err(ZoneError::ListClosed)
        }
    }

    fn ensure_unplaced(&self, who: &Identity) -> ZoneResult<()> {
        match self.store.position_of(who) {
            Some(at) => Err(ZoneError::AlreadyPlaced {
                who: who.clone(),
                at,
            }),
            None => Ok(()),
        }
    }
}
