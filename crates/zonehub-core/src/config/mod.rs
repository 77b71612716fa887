//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod board;
pub mod logging;
pub mod presentation;
pub mod rotation;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::board::BoardConfig;
pub use self::logging::LoggingConfig;
pub use self::presentation::{PresentationConfig, TimezoneLabel};
pub use self::rotation::{MAX_PERIOD_MINUTES, RotationConfig};
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Highest zone count the command table can address (`/z1` .. `/z9`).
pub const MAX_ZONES: u8 = 9;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay + env vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Zone board settings.
    #[serde(default)]
    pub board: BoardConfig,
    /// Rotation timer settings.
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Session gate settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Board rendering settings.
    #[serde(default)]
    pub presentation: PresentationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base file, an environment-specific overlay
    /// (`config/{env}`), and environment variables prefixed with `ZONEHUB__`.
    pub fn load(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ZONEHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        tracing::debug!(
            base = base,
            env = env,
            zones = loaded.board.zone_count,
            period_minutes = loaded.rotation.period_minutes,
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Reject values the board cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.board.zone_count == 0 || self.board.zone_count > MAX_ZONES {
            return Err(AppError::configuration(format!(
                "board.zone_count must be between 1 and {MAX_ZONES}, got {}",
                self.board.zone_count
            )));
        }
        if self.rotation.period_minutes == 0
            || self.rotation.period_minutes > MAX_PERIOD_MINUTES
        {
            return Err(AppError::configuration(format!(
                "rotation.period_minutes must be between 1 and {MAX_PERIOD_MINUTES}, got {}",
                self.rotation.period_minutes
            )));
        }
        if self.presentation.waitlist_group_size == 0 {
            return Err(AppError::configuration(
                "presentation.waitlist_group_size must be greater than zero",
            ));
        }
        if let Some(unknown) = self
            .presentation
            .timezones
            .iter()
            .find(|tz| tz.tz().is_none())
        {
            return Err(AppError::configuration(format!(
                "presentation.timezones: unknown IANA zone '{}' for '{}'",
                unknown.zone, unknown.label
            )));
        }
        Ok(())
    }
}
