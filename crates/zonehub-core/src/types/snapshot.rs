//! Read-only copy of the board handed to presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::zone::{Position, WaitEntry, ZoneOrdinal};

/// A single zone in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneView {
    /// Zone number.
    pub ordinal: ZoneOrdinal,
    /// Current occupant, `None` when empty.
    pub occupant: Option<Identity>,
}

/// Board state copied under the allocator lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Zones in ordinal order.
    pub zones: Vec<ZoneView>,
    /// Waitlist, front first.
    pub waitlist: Vec<WaitEntry>,
    /// When the last rotation (or open) happened.
    pub last_rotation_at: Option<DateTime<Utc>>,
    /// Whether the list accepts board commands.
    pub is_open: bool,
}

impl Snapshot {
    /// Occupant of a zone, `None` when empty or out of range.
    pub fn occupant(&self, zone: ZoneOrdinal) -> Option<&Identity> {
        self.zones
            .get(zone.index())
            .and_then(|view| view.occupant.as_ref())
    }

    /// Where an identity sits in this snapshot.
    pub fn position_of(&self, who: &Identity) -> Option<Position> {
        if let Some(view) = self
            .zones
            .iter()
            .find(|view| view.occupant.as_ref() == Some(who))
        {
            return Some(Position::Zone(view.ordinal));
        }
        self.waitlist
            .iter()
            .position(|entry| entry.occupant() == Some(who))
            .map(Position::Wait)
    }
}
