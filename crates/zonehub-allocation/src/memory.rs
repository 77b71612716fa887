//! In-memory zone allocator guarded by a Tokio mutex.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use zonehub_core::result::ZoneResult;
use zonehub_core::traits::ZoneAllocator;
use zonehub_core::types::{Identity, Snapshot, ZoneOrdinal};

use crate::engine::AllocationEngine;

/// Zone allocator holding the engine behind a single mutex.
///
/// Every call holds the lock for exactly one logical operation (read
/// positions, compute, write, copy the snapshot) and never awaits anything
/// else while holding it, so no caller observes a half-applied swap or
/// rotation.
#[derive(Debug, Clone)]
pub struct MemoryZoneAllocator {
    /// Protected engine.
    engine: Arc<Mutex<AllocationEngine>>,
    /// Fixed at construction.
    zone_count: u8,
}

impl MemoryZoneAllocator {
    /// Creates a closed, empty board with `zone_count` zones.
    pub fn new(zone_count: u8) -> Self {
        info!(zones = zone_count, "Zone allocator created");
        Self {
            engine: Arc::new(Mutex::new(AllocationEngine::new(zone_count))),
            zone_count,
        }
    }
}

#[async_trait]
impl ZoneAllocator for MemoryZoneAllocator {
    fn zone_count(&self) -> u8 {
        self.zone_count
    }

    async fn open(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
        self.engine.lock().await.open(now)
    }

    async fn close(&self) -> ZoneResult<Snapshot> {
        self.engine.lock().await.close()
    }

    async fn clear_placements(&self) -> Snapshot {
        let snapshot = self.engine.lock().await.clear_placements();
        debug!("Placements cleared");
        snapshot
    }

    async fn reset(&self) -> Snapshot {
        let snapshot = self.engine.lock().await.reset();
        info!("Board reset");
        snapshot
    }

    async fn snapshot(&self) -> Snapshot {
        self.engine.lock().await.snapshot()
    }

    async fn join(&self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.join(zone, who)
    }

    async fn leave(&self, zone: ZoneOrdinal, who: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.leave(zone, who)
    }

    async fn join_waitlist(&self, who: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.join_waitlist(who)
    }

    async fn reclaim_free(&self, who: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.reclaim_free(who)
    }

    async fn exit(&self, who: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.exit(who)
    }

    async fn swap(&self, first: &Identity, second: &Identity) -> ZoneResult<Snapshot> {
        self.engine.lock().await.swap(first, second)
    }

    async fn rotate(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
        self.engine.lock().await.rotate(now)
    }
}
