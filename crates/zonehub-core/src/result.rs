//! Convenience result type aliases for ZoneHub.

use crate::error::{AppError, ZoneError};

/// A specialized `Result` type for infrastructure operations.
pub type AppResult<T> = Result<T, AppError>;

/// Result of a board operation as seen by the chat boundary.
pub type ZoneResult<T> = Result<T, ZoneError>;
