//! Administrator directory backed by configuration.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::warn;

use zonehub_core::config::SessionConfig;
use zonehub_core::result::AppResult;
use zonehub_core::traits::AdminDirectory;
use zonehub_core::types::{ChatId, Identity, UserRef};

/// Treats the configured creator and admin handles as administrators of
/// every chat.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminDirectory {
    admins: HashSet<Identity>,
}

impl StaticAdminDirectory {
    /// Builds the directory from the session configuration.
    ///
    /// Handles that are not valid `@handle` tokens are skipped with a warning.
    pub fn from_config(config: &SessionConfig) -> Self {
        let admins = std::iter::once(&config.creator)
            .chain(config.admins.iter())
            .filter_map(|handle| {
                let parsed = Identity::from_handle(handle);
                if parsed.is_none() {
                    warn!(handle = %handle, "Ignoring invalid admin handle");
                }
                parsed
            })
            .collect();
        Self { admins }
    }

    /// Number of known administrators.
    pub fn len(&self) -> usize {
        self.admins.len()
    }

    /// Whether no administrator is configured.
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

#[async_trait]
impl AdminDirectory for StaticAdminDirectory {
    async fn is_admin(&self, _chat: ChatId, user: &UserRef) -> AppResult<bool> {
        Ok(self.admins.contains(&Identity::from_user(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creator_and_admins_are_admins() {
        let config = SessionConfig {
            creator: "@boss".to_string(),
            admins: vec!["@helper".to_string(), "not a handle".to_string()],
            ..SessionConfig::default()
        };
        let directory = StaticAdminDirectory::from_config(&config);
        assert_eq!(directory.len(), 2);

        let chat = ChatId(-1);
        assert!(directory.is_admin(chat, &UserRef::new(1, Some("boss"))).await.unwrap());
        assert!(directory.is_admin(chat, &UserRef::new(2, Some("helper"))).await.unwrap());
        assert!(!directory.is_admin(chat, &UserRef::new(3, Some("alice"))).await.unwrap());
        assert!(!directory.is_admin(chat, &UserRef::new(4, None)).await.unwrap());
    }
}
