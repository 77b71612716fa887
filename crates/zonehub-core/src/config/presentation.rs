//! Board rendering configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A labelled IANA timezone used to print rotation windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneLabel {
    /// Label printed before the window.
    pub label: String,
    /// IANA zone name, e.g. `Europe/Madrid`.
    pub zone: String,
}

impl TimezoneLabel {
    /// The parsed zone, `None` if the name is unknown.
    pub fn tz(&self) -> Option<Tz> {
        self.zone.parse().ok()
    }
}

/// Board rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Rotation windows are printed once per entry.
    #[serde(default = "default_timezones")]
    pub timezones: Vec<TimezoneLabel>,
    /// A blank line is inserted after every group of this many waitlist entries.
    #[serde(default = "default_group_size")]
    pub waitlist_group_size: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            timezones: default_timezones(),
            waitlist_group_size: default_group_size(),
        }
    }
}

fn default_timezones() -> Vec<TimezoneLabel> {
    [
        ("Colombia", "America/Bogota"),
        ("Mexico", "America/Mexico_City"),
        ("Venezuela", "America/Caracas"),
        ("Argentina / Chile", "America/Argentina/Buenos_Aires"),
        ("Spain", "Europe/Madrid"),
    ]
    .into_iter()
    .map(|(label, zone)| TimezoneLabel {
        label: label.to_string(),
        zone: zone.to_string(),
    })
    .collect()
}

fn default_group_size() -> usize {
    3
}
