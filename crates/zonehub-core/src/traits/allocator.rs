//! Zone allocator trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::ZoneResult;
use crate::types::{Identity, Snapshot, ZoneOrdinal};

/// Serialized access to the zone board.
///
/// Implementations must run every call as one atomic read-modify-write:
/// either the whole operation applies or, on error, the board is left
/// untouched. Each call returns a snapshot copied before the lock is
/// released.
#[async_trait]
pub trait ZoneAllocator: Send + Sync + std::fmt::Debug {
    /// Number of zones on the board.
    fn zone_count(&self) -> u8;

    /// Open the list and stamp the rotation clock.
    async fn open(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot>;

    /// Close the list, clearing zones and waitlist.
    async fn close(&self) -> ZoneResult<Snapshot>;

    /// Clear all placements, keeping the open flag and rotation stamp.
    async fn clear_placements(&self) -> Snapshot;

    /// Return to the closed, empty state.
    async fn reset(&self) -> Snapshot;

    /// Current board state.
    async fn snapshot(&self) -> Snapshot;

    /// Place `who` in an empty zone.
    async fn join(&self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot>;

    /// Remove `who` from the zone it occupies.
    async fn leave(&self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot>;

    /// Append `who` to the waitlist.
    async fn join_waitlist(&self, who: &Identity) -> ZoneResult<Snapshot>;

    /// Put `who` into the front-most free waitlist entry.
    async fn reclaim_free(&self, who: &Identity) -> ZoneResult<Snapshot>;

    /// Remove `who` from wherever it is placed.
    async fn exit(&self, who: &Identity) -> ZoneResult<Snapshot>;

    /// Exchange or replace the placements of two identities.
    async fn swap(&self, first: &Identity, second: &Identity) -> ZoneResult<Snapshot>;

    /// Move the front of the waitlist into the zones.
    async fn rotate(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot>;
}
