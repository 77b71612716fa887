//! Session gate events.

use serde::{Deserialize, Serialize};

use crate::types::chat::ChatId;
use crate::types::identity::Identity;

/// Lifecycle events of the authorized session and its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A chat was authorized.
    Authorized {
        /// The authorized chat.
        chat: ChatId,
        /// Who authorized it.
        by: Identity,
    },
    /// The authorized chat was cleared.
    Deauthorized {
        /// The chat that was authorized.
        chat: Option<ChatId>,
        /// Who deauthorized it.
        by: Identity,
    },
    /// The list was opened.
    ListOpened {
        /// The authorized chat.
        chat: ChatId,
        /// The admin who opened it.
        by: Identity,
    },
    /// The list was closed and cleared.
    ListClosed {
        /// The authorized chat.
        chat: ChatId,
        /// The admin who closed it.
        by: Identity,
    },
}
