//! # zonehub-core
//!
//! Core crate for ZoneHub. Contains the identity key, zone and waitlist
//! types, configuration schemas, domain events, collaborator traits,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other ZoneHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ZoneError};
pub use result::AppResult;
