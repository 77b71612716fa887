//! Zones and waitlist with invariant-checked mutation primitives.
//!
//! The store never decides *whether* a placement is allowed; that is the
//! engine's job. It only guarantees that, after every mutator returns, no
//! identity is held in more than one place. Callers remove a prior
//! placement before adding the identity somewhere else.

use std::collections::HashSet;

use zonehub_core::types::{Identity, Position, Snapshot, WaitEntry, ZoneOrdinal, ZoneView};

/// Zones and the ordered waitlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationStore {
    /// One slot per zone, index = ordinal - 1.
    zones: Vec<Option<Identity>>,
    /// Front first.
    waitlist: Vec<WaitEntry>,
}

impl AllocationStore {
    /// Creates a store with `zone_count` empty zones and an empty waitlist.
    pub fn new(zone_count: u8) -> Self {
        Self {
            zones: vec![None; usize::from(zone_count)],
            waitlist: Vec::new(),
        }
    }

    /// Number of zones.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Occupant of a zone.
    ///
    /// # Panics
    ///
    /// Panics if `zone` is outside the fixed zone set.
    pub fn zone(&self, zone: ZoneOrdinal) -> Option<&Identity> {
        self.zones[self.slot(zone)].as_ref()
    }

    /// The waitlist, front first.
    pub fn waitlist(&self) -> &[WaitEntry] {
        &self.waitlist
    }

    /// Where `who` is placed, if anywhere.
    pub fn position_of(&self, who: &Identity) -> Option<Position> {
        if let Some(index) = self.zones.iter().position(|z| z.as_ref() == Some(who)) {
            return Some(Position::Zone(ZoneOrdinal::from_index(index)));
        }
        self.waitlist
            .iter()
            .position(|entry| entry.occupant() == Some(who))
            .map(Position::Wait)
    }

    /// Index of the front-most free waitlist entry.
    pub fn first_free(&self) -> Option<usize> {
        self.waitlist.iter().position(WaitEntry::is_free)
    }

    /// Identity held at a position, if any.
    pub fn occupant_at(&self, position: Position) -> Option<&Identity> {
        match position {
            Position::Zone(zone) => self.zone(zone),
            Position::Wait(index) => self.waitlist.get(index).and_then(WaitEntry::occupant),
        }
    }

    /// Sets or clears a zone occupant.
    ///
    /// # Panics
    ///
    /// Panics if `zone` is outside the fixed zone set.
    pub fn set_zone(&mut self, zone: ZoneOrdinal, occupant: Option<Identity>) {
        let slot = self.slot(zone);
        self.zones[slot] = occupant;
        self.debug_check();
    }

    /// Appends an identity to the end of the waitlist.
    pub fn push_wait(&mut self, who: Identity) {
        self.waitlist.push(WaitEntry::Occupied(who));
        self.debug_check();
    }

    /// Overwrites a waitlist entry in place; order and length are kept.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the waitlist.
    pub fn set_wait_at(&mut self, index: usize, entry: WaitEntry) {
        assert!(
            index < self.waitlist.len(),
            "waitlist index {index} out of range for {} entries",
            self.waitlist.len()
        );
        self.waitlist[index] = entry;
        self.debug_check();
    }

    /// Writes an identity (or a hole) at a position.
    pub fn set_at(&mut self, position: Position, occupant: Option<Identity>) {
        match position {
            Position::Zone(zone) => self.set_zone(zone, occupant),
            Position::Wait(index) => {
                let entry = occupant.map_or(WaitEntry::Free, WaitEntry::Occupied);
                self.set_wait_at(index, entry);
            }
        }
    }

    /// Drops the first `n` waitlist entries (all of them if `n` exceeds the length).
    pub fn truncate_wait_front(&mut self, n: usize) -> Vec<WaitEntry> {
        let n = n.min(self.waitlist.len());
        self.waitlist.drain(..n).collect()
    }

    /// Empties every zone and the waitlist.
    pub fn clear_all(&mut self) {
        self.zones.iter_mut().for_each(|zone| *zone = None);
        self.waitlist.clear();
    }

    /// Whether every identity appears at most once across zones and waitlist.
    pub fn placements_are_unique(&self) -> bool {
        let mut seen = HashSet::new();
        self.zones
            .iter()
            .flatten()
            .chain(self.waitlist.iter().filter_map(WaitEntry::occupant))
            .all(|who| seen.insert(who))
    }

    /// Copy of the placements for presentation.
    pub fn views(&self) -> (Vec<ZoneView>, Vec<WaitEntry>) {
        let zones = self
            .zones
            .iter()
            .enumerate()
            .map(|(index, occupant)| ZoneView {
                ordinal: ZoneOrdinal::from_index(index),
                occupant: occupant.clone(),
            })
            .collect();
        (zones, self.waitlist.clone())
    }

    /// Builds a snapshot with the given lifecycle fields.
    pub fn snapshot(
        &self,
        last_rotation_at: Option<chrono::DateTime<chrono::Utc>>,
        is_open: bool,
    ) -> Snapshot {
        let (zones, waitlist) = self.views();
        Snapshot {
            zones,
            waitlist,
            last_rotation_at,
            is_open,
        }
    }

    fn slot(&self, zone: ZoneOrdinal) -> usize {
        let index = zone.index();
        assert!(
            index < self.zones.len(),
            "zone {zone} out of range for {} zones",
            self.zones.len()
        );
        index
    }

    fn debug_check(&self) {
        debug_assert!(
            self.placements_are_unique(),
            "an identity is placed more than once: {self:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(handle: &str) -> Identity {
        Identity::from_handle(handle).unwrap()
    }

    fn zone(n: u8) -> ZoneOrdinal {
        ZoneOrdinal::new(n).unwrap()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AllocationStore::new(3);
        assert_eq!(store.zone_count(), 3);
        assert!(store.zone(zone(1)).is_none());
        assert!(store.waitlist().is_empty());
    }

    #[test]
    fn test_position_of_zone_and_wait() {
        let mut store = AllocationStore::new(3);
        store.set_zone(zone(2), Some(id("@a")));
        store.push_wait(id("@b"));
        assert_eq!(store.position_of(&id("@a")), Some(Position::Zone(zone(2))));
        assert_eq!(store.position_of(&id("@b")), Some(Position::Wait(0)));
        assert_eq!(store.position_of(&id("@c")), None);
    }

    #[test]
    fn test_first_free_is_front_most() {
        let mut store = AllocationStore::new(3);
        store.push_wait(id("@a"));
        store.push_wait(id("@b"));
        store.push_wait(id("@c"));
        store.set_wait_at(2, WaitEntry::Free);
        store.set_wait_at(0, WaitEntry::Free);
        assert_eq!(store.first_free(), Some(0));
    }

    #[test]
    fn test_truncate_wait_front_clamps() {
        let mut store = AllocationStore::new(3);
        store.push_wait(id("@a"));
        let dropped = store.truncate_wait_front(5);
        assert_eq!(dropped.len(), 1);
        assert!(store.waitlist().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut store = AllocationStore::new(2);
        store.set_zone(zone(1), Some(id("@a")));
        store.push_wait(id("@b"));
        store.clear_all();
        assert_eq!(store, AllocationStore::new(2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_zone_out_of_range_panics() {
        let store = AllocationStore::new(3);
        let _ = store.zone(zone(4));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "placed more than once")]
    fn test_duplicate_placement_is_a_defect() {
        let mut store = AllocationStore::new(3);
        store.set_zone(zone(1), Some(id("@a")));
        store.push_wait(id("@a"));
    }
}
