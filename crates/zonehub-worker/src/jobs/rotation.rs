//! Rotation job: rotates the board and broadcasts the result.

use std::sync::Arc;

use tokio::sync::broadcast;

use zonehub_core::error::ZoneError;
use zonehub_core::events::{DomainEvent, RotationEvent};
use zonehub_core::traits::{Clock, RotationTarget};
use zonehub_core::types::Snapshot;

/// What a single timer fire did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// The board rotated.
    Rotated(Snapshot),
    /// The list was closed or the session deauthorized; the timer should stop.
    Stale(ZoneError),
    /// The rotation was refused for another reason; the timer keeps running.
    Failed(ZoneError),
}

/// Fires a rotation against the target and publishes the outcome.
#[derive(Debug)]
pub struct RotationJob {
    /// Capability to rotate the board
    target: Arc<dyn RotationTarget>,
    /// Source of rotation timestamps
    clock: Arc<dyn Clock>,
    /// Broadcast bus for rotation events
    events: broadcast::Sender<DomainEvent>,
}

impl RotationJob {
    /// Create a new rotation job
    pub fn new(
        target: Arc<dyn RotationTarget>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<DomainEvent>,
    ) -> Self {
        Self {
            target,
            clock,
            events,
        }
    }

    /// Run one rotation.
    ///
    /// The snapshot is published after the target has released its lock.
    pub async fn fire(&self) -> FireOutcome {
        let now = self.clock.now();

        match self.target.rotate(now).await {
            Ok(snapshot) => {
                let chat = self.target.broadcast_chat().await;
                tracing::info!(
                    chat = ?chat,
                    waiting = snapshot.waitlist.len(),
                    "Rotation fired"
                );
                let event = RotationEvent::Rotated {
                    chat,
                    snapshot: snapshot.clone(),
                };
                let _ = self.events.send(DomainEvent::rotation(now, event));
                FireOutcome::Rotated(snapshot)
            }
            Err(err) if err.is_stale_rotation() => {
                tracing::info!(reason = %err, "Stale rotation fire dropped");
                let event = RotationEvent::Disarmed {
                    reason: err.to_string(),
                };
                let _ = self.events.send(DomainEvent::rotation(now, event));
                FireOutcome::Stale(err)
            }
            Err(err) => {
                tracing::warn!(reason = %err, "Rotation refused");
                FireOutcome::Failed(err)
            }
        }
    }
}
