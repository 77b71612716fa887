//! # zonehub-service
//!
//! The boundary between a chat transport and the zone board.
//!
//! ## Modules
//!
//! - `gate`: single authorized chat, privilege checks, rotation timer ownership
//! - `commands`: data-driven command table and command-line parsing
//! - `dispatcher`: routes a chat message through the gate and renders replies
//! - `formatter`: text rendering of snapshots, confirmations, and rejections
//! - `admin`: config-backed administrator directory

pub mod admin;
pub mod commands;
pub mod dispatcher;
pub mod formatter;
pub mod gate;

pub use admin::StaticAdminDirectory;
pub use commands::{Audience, Command, CommandSpec, CommandTable, Invocation, Operation};
pub use dispatcher::CommandDispatcher;
pub use formatter::BoardFormatter;
pub use gate::{ChatStatus, CommandContext, SessionGate};
