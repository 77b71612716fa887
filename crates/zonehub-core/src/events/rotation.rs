//! Rotation timer events.

use serde::{Deserialize, Serialize};

use crate::types::chat::ChatId;
use crate::types::snapshot::Snapshot;

/// Events produced by the rotation scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RotationEvent {
    /// A rotation ran; the snapshot is the board after it.
    Rotated {
        /// The chat the board belongs to, when known.
        chat: Option<ChatId>,
        /// The board after rotation.
        snapshot: Snapshot,
    },
    /// The timer stopped itself after a stale fire.
    Disarmed {
        /// Why the fire was dropped.
        reason: String,
    },
}
