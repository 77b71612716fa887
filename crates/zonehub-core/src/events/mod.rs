//! Domain events emitted by ZoneHub.
//!
//! Events are published on a broadcast channel and consumed by the chat
//! transport, which pushes rotation results to the authorized chat.

pub mod rotation;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use rotation::RotationEvent;
pub use session::SessionEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A rotation-related event.
    Rotation(RotationEvent),
    /// A session-related event.
    Session(SessionEvent),
}

impl DomainEvent {
    /// Create a new domain event stamped with the given time.
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            payload,
        }
    }

    /// Create a rotation event.
    pub fn rotation(timestamp: DateTime<Utc>, event: RotationEvent) -> Self {
        Self::new(timestamp, EventPayload::Rotation(event))
    }

    /// Create a session event.
    pub fn session(timestamp: DateTime<Utc>, event: SessionEvent) -> Self {
        Self::new(timestamp, EventPayload::Session(event))
    }
}
