//! Shared board types: identities, zones, waitlist entries, chat references,
//! and the read-only snapshot handed to presentation.

pub mod chat;
pub mod identity;
pub mod snapshot;
pub mod zone;

pub use chat::{ChatId, ChatKind, ChatRef, UserRef};
pub use identity::Identity;
pub use snapshot::{Snapshot, ZoneView};
pub use zone::{Position, WaitEntry, ZoneOrdinal};
