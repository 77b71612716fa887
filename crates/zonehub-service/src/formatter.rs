//! Text rendering of boards, confirmations, and rejections.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use zonehub_core::config::{BoardConfig, PresentationConfig, RotationConfig};
use zonehub_core::error::ZoneError;
use zonehub_core::types::{ChatId, Identity, Snapshot, WaitEntry};

use crate::commands::{Command, CommandTable};
use crate::gate::ChatStatus;

const RULES: &str = "Zone rules:
1. Only take a zone if you are available.
2. Respect turns and rotations.
3. Use /exit to leave your zone or the waitlist.
4. Do not abuse the system.
5. Do not edit messages that contain commands.

Be kind to each other!";

/// Renders everything the bot says.
#[derive(Debug, Clone)]
pub struct BoardFormatter {
    name: String,
    period: chrono::Duration,
    timezones: Vec<(String, Tz)>,
    group_size: usize,
}

impl BoardFormatter {
    /// Creates a formatter from configuration.
    ///
    /// Timezones with an unknown IANA name are dropped with a warning.
    pub fn new(
        board: &BoardConfig,
        rotation: &RotationConfig,
        presentation: &PresentationConfig,
    ) -> Self {
        let timezones = presentation
            .timezones
            .iter()
            .filter_map(|tz| match tz.tz() {
                Some(zone) => Some((tz.label.clone(), zone)),
                None => {
                    warn!(label = %tz.label, zone = %tz.zone, "Ignoring unknown timezone");
                    None
                }
            })
            .collect();

        Self {
            name: board.name.clone(),
            period: rotation.chrono_period(),
            timezones,
            group_size: presentation.waitlist_group_size.max(1),
        }
    }

    /// Full board: rotation windows, zones, countdown, and waitlist.
    pub fn board(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} zone board", self.name);

        out.push_str("\nRotation windows:\n");
        let start = snapshot.last_rotation_at.unwrap_or(now);
        let end = start + self.period;
        for (label, zone) in &self.timezones {
            let _ = writeln!(
                out,
                "{label}\n  {} – {}",
                start.with_timezone(zone).format("%H:%M"),
                end.with_timezone(zone).format("%H:%M"),
            );
        }

        out.push_str("\nZones:\n");
        for zone in &snapshot.zones {
            match &zone.occupant {
                Some(who) => {
                    let _ = writeln!(out, "Zone {}: {who}", zone.ordinal);
                }
                None => {
                    let _ = writeln!(out, "Zone {}: empty", zone.ordinal);
                }
            }
        }

        let _ = writeln!(
            out,
            "\nNext rotation in: {} minutes",
            self.minutes_left(snapshot, now)
        );

        out.push_str("\nWaitlist:\n");
        if snapshot.waitlist.is_empty() {
            out.push_str("none");
        } else {
            let total = snapshot.waitlist.len();
            for (i, entry) in snapshot.waitlist.iter().enumerate() {
                match entry {
                    WaitEntry::Occupied(who) => out.push_str(who.as_str()),
                    WaitEntry::Free => out.push_str("free"),
                }
                let count = i + 1;
                if count < total {
                    out.push('\n');
                    if count % self.group_size == 0 {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    /// The period in minutes less the whole minutes elapsed since the last
    /// rotation, never negative.
    ///
    /// Zero when the list has never been rotated or opened.
    pub fn minutes_left(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> i64 {
        snapshot.last_rotation_at.map_or(0, |last| {
            let elapsed = (now - last).num_minutes();
            (self.period.num_minutes() - elapsed).max(0)
        })
    }

    /// Message posted to the chat after an automatic rotation.
    pub fn rotation_broadcast(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> String {
        format!("Automatic rotation done\n\n{}", self.board(snapshot, now))
    }

    /// Confirmation line for a command that succeeded.
    pub fn confirmation(&self, command: &Command, caller: &Identity) -> Option<String> {
        let target = |t: &Option<Identity>| t.clone().unwrap_or_else(|| caller.clone());
        let line = match command {
            Command::Deauthorize => "Bot deactivated. Authorized chat cleared.".to_string(),
            Command::Open => "List opened.".to_string(),
            Command::Close => "List closed.".to_string(),
            Command::Join { zone, target: t } => {
                format!("{} assigned to zone {zone}", target(t))
            }
            Command::Leave { zone } => format!("{caller} left zone {zone}"),
            Command::JoinWaitlist { target: t } => {
                format!("{} added to the waitlist", target(t))
            }
            Command::ReclaimFree => format!("{caller} took a free waitlist slot"),
            Command::Exit { target: t } => {
                let who = target(t);
                if &who == caller {
                    "You left successfully.".to_string()
                } else {
                    format!("{who} was removed.")
                }
            }
            Command::Swap { first, second } => match second {
                Some(second) => format!("Swapped {first} and {second}"),
                None => format!("Swapped {caller} and {first}"),
            },
            // Authorize replies with its own text.
            Command::Authorize
            | Command::Show
            | Command::Rules
            | Command::Help
            | Command::ChatStatus => return None,
        };
        Some(line)
    }

    /// User-facing text for a rejected command.
    pub fn error(&self, err: &ZoneError) -> String {
        match err {
            ZoneError::AlreadyPlaced { who, at } => {
                format!("{who} is already at {at}. Use /exit first.")
            }
            ZoneError::ZoneFull { zone } => format!("Zone {zone} is already taken."),
            ZoneError::NotInZone { zone, who } => format!("{who} is not in zone {zone}."),
            ZoneError::NoFreeSlot => "There are no free waitlist slots.".to_string(),
            ZoneError::NotFound { who } => {
                format!("{who} is not in any zone or on the waitlist.")
            }
            ZoneError::NeitherFound { first, second } => {
                format!("Neither {first} nor {second} is in a zone or on the waitlist.")
            }
            ZoneError::SelfSwap { .. } => "You cannot swap with yourself.".to_string(),
            ZoneError::AlreadyOpen => "The list is already open.".to_string(),
            ZoneError::AlreadyClosed => "The list is already closed.".to_string(),
            ZoneError::ListClosed => {
                "The list is closed. An admin must open it with /open.".to_string()
            }
            ZoneError::NotAuthorized => "This bot is not authorized at the moment.".to_string(),
            ZoneError::WrongChat { .. } => "This bot is not authorized in this chat.".to_string(),
            ZoneError::PrivateChat => "This bot does not work in private messages.".to_string(),
            ZoneError::AdminRequired { action } => {
                format!("Only administrators can {action}.")
            }
            ZoneError::CreatorRequired { action } => {
                format!("Only the creator can {action}.")
            }
            ZoneError::Usage { usage } => format!("Usage: {usage}"),
        }
    }

    /// Reply to a successful authorization.
    pub fn authorized(&self, chat: ChatId) -> String {
        format!("Bot authorized for this chat.\nAuthorized chat id: {chat}")
    }

    /// The rules text.
    pub fn rules(&self) -> String {
        RULES.to_string()
    }

    /// Command menu grouped by audience.
    pub fn help(&self, table: &CommandTable) -> String {
        let mut out = String::from("Commands:");
        let mut section = None;
        for spec in table.specs() {
            if section != Some(spec.audience) {
                section = Some(spec.audience);
                let _ = write!(out, "\n\n{}:", spec.audience.title());
            }
            let _ = write!(out, "\n/{}", spec.name);
            if !spec.arguments.is_empty() {
                let _ = write!(out, " {}", spec.arguments);
            }
            let _ = write!(out, " - {}", spec.summary);
            if !spec.aliases.is_empty() {
                let aliases: Vec<String> = spec.aliases.iter().map(|a| format!("/{a}")).collect();
                let _ = write!(out, " (also {})", aliases.join(", "));
            }
        }
        out
    }

    /// Chat id report.
    pub fn chat_status(&self, status: &ChatStatus) -> String {
        let state = if status.authorized {
            "AUTHORIZED"
        } else {
            "NOT AUTHORIZED"
        };
        format!("Chat id: {}\nStatus: {state}", status.chat)
    }
}
