//! Chat administrator lookup.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{ChatId, UserRef};

/// Resolves whether a user administers a chat.
///
/// The chat transport owns this knowledge; the gate only consumes the
/// resulting flag.
#[async_trait]
pub trait AdminDirectory: Send + Sync + std::fmt::Debug {
    /// Whether `user` is an administrator of `chat`.
    async fn is_admin(&self, chat: ChatId, user: &UserRef) -> AppResult<bool>;
}
