//! Zone ordinals, waitlist entries, and board positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// One-based zone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneOrdinal(u8);

impl ZoneOrdinal {
    /// Create an ordinal; `0` is not a zone.
    pub fn new(number: u8) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// The ordinal for a zero-based index.
    pub fn from_index(index: usize) -> Self {
        let number = u8::try_from(index + 1).unwrap_or(u8::MAX);
        Self(number)
    }

    /// The one-based zone number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// The zero-based index into the zone set.
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl fmt::Display for ZoneOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One waitlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "who", rename_all = "snake_case")]
pub enum WaitEntry {
    /// Held by a participant.
    Occupied(Identity),
    /// A hole left by a participant who exited; reclaimable.
    Free,
}

impl WaitEntry {
    /// The participant holding this entry, if any.
    pub fn occupant(&self) -> Option<&Identity> {
        match self {
            Self::Occupied(who) => Some(who),
            Self::Free => None,
        }
    }

    /// Whether this entry is a reclaimable hole.
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Where a participant currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Position {
    /// In the given zone.
    Zone(ZoneOrdinal),
    /// At the given zero-based waitlist index.
    Wait(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(zone) => write!(f, "zone {zone}"),
            Self::Wait(index) => write!(f, "waitlist position {}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_index_round_trip() {
        let zone = ZoneOrdinal::new(3).unwrap();
        assert_eq!(zone.index(), 2);
        assert_eq!(ZoneOrdinal::from_index(2), zone);
        assert!(ZoneOrdinal::new(0).is_none());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::Zone(ZoneOrdinal::new(2).unwrap()).to_string(), "zone 2");
        assert_eq!(Position::Wait(0).to_string(), "waitlist position 1");
    }
}
