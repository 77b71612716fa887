//! Unified error types for ZoneHub.
//!
//! Infrastructure failures (configuration, I/O, background tasks) are
//! carried by [`AppError`]. Rejections of a board operation are carried by
//! [`ZoneError`]; every variant is expected and recoverable, and the board
//! is left untouched when one is returned.

use std::fmt;
use thiserror::Error;

use crate::types::chat::ChatId;
use crate::types::identity::Identity;
use crate::types::zone::{Position, ZoneOrdinal};

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested participant or slot was not found.
    NotFound,
    /// The caller does not have permission to perform the action.
    Authorization,
    /// Input validation failed.
    Validation,
    /// The request conflicts with the current board state.
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// An I/O error occurred on the transport.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
        }
    }
}

/// The unified application error used throughout ZoneHub.
///
/// Crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

/// Rejection of a requested board operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// The identity already holds a zone or a waitlist entry.
    #[error("{who} is already placed at {at}")]
    AlreadyPlaced {
        /// The identity that was asked to be placed.
        who: Identity,
        /// Where it currently sits.
        at: Position,
    },

    /// The requested zone has an occupant.
    #[error("zone {zone} is already occupied")]
    ZoneFull {
        /// The requested zone.
        zone: ZoneOrdinal,
    },

    /// The caller does not occupy the zone it tried to leave.
    #[error("{who} is not in zone {zone}")]
    NotInZone {
        /// The zone named by the caller.
        zone: ZoneOrdinal,
        /// The caller.
        who: Identity,
    },

    /// There is no free waitlist entry to reclaim.
    #[error("no free waitlist slot")]
    NoFreeSlot,

    /// The identity is neither in a zone nor on the waitlist.
    #[error("{who} is not in any zone or on the waitlist")]
    NotFound {
        /// The identity that was looked up.
        who: Identity,
    },

    /// Neither side of a swap is placed anywhere.
    #[error("neither {first} nor {second} is placed")]
    NeitherFound {
        /// First swap participant.
        first: Identity,
        /// Second swap participant.
        second: Identity,
    },

    /// Both swap arguments resolve to the same identity.
    #[error("cannot swap {who} with itself")]
    SelfSwap {
        /// The repeated identity.
        who: Identity,
    },

    /// The list is already open.
    #[error("the list is already open")]
    AlreadyOpen,

    /// The list is already closed.
    #[error("the list is already closed")]
    AlreadyClosed,

    /// Board commands are refused while the list is closed.
    #[error("the list is closed")]
    ListClosed,

    /// No chat is currently authorized.
    #[error("no chat is authorized")]
    NotAuthorized,

    /// The command came from a chat other than the authorized one.
    #[error("chat {chat} is not the authorized chat")]
    WrongChat {
        /// The chat that sent the command.
        chat: ChatId,
    },

    /// Commands are not accepted in private chats.
    #[error("commands are not accepted in private chats")]
    PrivateChat,

    /// The action needs chat administrator rights.
    #[error("administrator rights required to {action}")]
    AdminRequired {
        /// Short description of the refused action.
        action: String,
    },

    /// The action is reserved to the configured creator.
    #[error("only the creator may {action}")]
    CreatorRequired {
        /// Short description of the refused action.
        action: String,
    },

    /// Arguments did not match the command's usage.
    #[error("usage: {usage}")]
    Usage {
        /// The expected usage line.
        usage: String,
    },
}

impl ZoneError {
    /// Create an admin-required rejection.
    pub fn admin_required(action: impl Into<String>) -> Self {
        Self::AdminRequired {
            action: action.into(),
        }
    }

    /// Create a creator-required rejection.
    pub fn creator_required(action: impl Into<String>) -> Self {
        Self::CreatorRequired {
            action: action.into(),
        }
    }

    /// Create a usage rejection.
    pub fn usage(usage: impl Into<String>) -> Self {
        Self::Usage {
            usage: usage.into(),
        }
    }

    /// The error category used when surfacing this rejection as an [`AppError`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::NeitherFound { .. } | Self::NotInZone { .. } => {
                ErrorKind::NotFound
            }
            Self::AlreadyPlaced { .. }
            | Self::ZoneFull { .. }
            | Self::NoFreeSlot
            | Self::AlreadyOpen
            | Self::AlreadyClosed
            | Self::ListClosed => ErrorKind::Conflict,
            Self::NotAuthorized
            | Self::WrongChat { .. }
            | Self::PrivateChat
            | Self::AdminRequired { .. }
            | Self::CreatorRequired { .. } => ErrorKind::Authorization,
            Self::SelfSwap { .. } | Self::Usage { .. } => ErrorKind::Validation,
        }
    }

    /// Whether a rotation fire that hit this error should quietly disarm its
    /// timer instead of reporting a failure.
    pub fn is_stale_rotation(&self) -> bool {
        matches!(self, Self::ListClosed | Self::NotAuthorized)
    }
}

impl From<ZoneError> for AppError {
    fn from(err: ZoneError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
