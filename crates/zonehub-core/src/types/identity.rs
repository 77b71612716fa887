//! Canonical participant keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chat::UserRef;

/// Canonical handle of a participant.
///
/// Two identities are the same participant exactly when their canonical
/// strings are equal. Handles keep the leading `@`; users without a public
/// handle fall back to `#<numeric id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Parse a `@handle` token.
    ///
    /// Surrounding whitespace is ignored. Returns `None` unless the token has
    /// a single leading `@` followed by ASCII letters, digits, or `_`.
    pub fn from_handle(token: &str) -> Option<Self> {
        let body = token.trim().strip_prefix('@')?;
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self(format!("@{body}")))
    }

    /// Derive the identity of a transport user.
    pub fn from_user(user: &UserRef) -> Self {
        user.username
            .as_deref()
            .and_then(|name| {
                let name = name.trim();
                if name.starts_with('@') {
                    Self::from_handle(name)
                } else {
                    Self::from_handle(&format!("@{name}"))
                }
            })
            .unwrap_or_else(|| Self(format!("#{}", user.id)))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
