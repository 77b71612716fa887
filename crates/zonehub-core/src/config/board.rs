//! Zone board configuration.

use serde::{Deserialize, Serialize};

/// Zone board configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of zones created when a chat is authorized.
    #[serde(default = "default_zone_count")]
    pub zone_count: u8,
    /// Name shown in the board header.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            zone_count: default_zone_count(),
            name: default_name(),
        }
    }
}

fn default_zone_count() -> u8 {
    3
}

fn default_name() -> String {
    "EXAMPLE".to_string()
}
