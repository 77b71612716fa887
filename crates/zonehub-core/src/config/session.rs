//! Session gate configuration.

use serde::{Deserialize, Serialize};

/// Session gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Handle of the user allowed to authorize and deauthorize a chat.
    #[serde(default = "default_creator")]
    pub creator: String,
    /// Handles treated as chat administrators.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Whether removing another participant with `/exit @user` needs admin rights.
    #[serde(default)]
    pub remote_exit_requires_admin: bool,
    /// Whether placing another participant with `/zN @user` needs admin rights.
    #[serde(default)]
    pub remote_join_requires_admin: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            creator: default_creator(),
            admins: Vec::new(),
            remote_exit_requires_admin: false,
            remote_join_requires_admin: false,
        }
    }
}

fn default_creator() -> String {
    "@zone_creator".to_string()
}
