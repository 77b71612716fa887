//! References handed over by the chat transport.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport-level chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of chat a command arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// A group conversation.
    Group,
    /// A one-to-one conversation with the bot.
    Private,
}

/// The chat a command arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef {
    /// Chat identifier.
    pub id: ChatId,
    /// Chat kind.
    pub kind: ChatKind,
}

impl ChatRef {
    /// A group chat reference.
    pub fn group(id: i64) -> Self {
        Self {
            id: ChatId(id),
            kind: ChatKind::Group,
        }
    }

    /// A private chat reference.
    pub fn private(id: i64) -> Self {
        Self {
            id: ChatId(id),
            kind: ChatKind::Private,
        }
    }

    /// Whether the chat is private.
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }
}

/// A user as resolved by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Stable numeric user id.
    pub id: i64,
    /// Public handle, without or with the leading `@`.
    pub username: Option<String>,
}

impl UserRef {
    /// Create a user reference.
    pub fn new(id: i64, username: Option<&str>) -> Self {
        Self {
            id,
            username: username.map(str::to_string),
        }
    }
}
