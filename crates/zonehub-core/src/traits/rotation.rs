//! Capability handed to the rotation scheduler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::ZoneResult;
use crate::types::{ChatId, Snapshot};

/// Something the rotation timer can fire against.
///
/// The scheduler holds only this capability, never the board itself.
#[async_trait]
pub trait RotationTarget: Send + Sync + std::fmt::Debug {
    /// Run one rotation.
    ///
    /// `ListClosed` and `NotAuthorized` mean the fire is stale and the
    /// timer should stop.
    async fn rotate(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot>;

    /// The chat that receives rotation broadcasts, if any.
    async fn broadcast_chat(&self) -> Option<ChatId>;
}
