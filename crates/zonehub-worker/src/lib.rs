//! Timer-driven work for ZoneHub.
//!
//! This crate provides:
//! - The rotation scheduler: one repeating timer per authorized session,
//!   armed with cancel-then-arm so at most one timer is ever live
//! - The rotation job fired by that timer, which rotates the board and
//!   broadcasts the resulting snapshot

pub mod jobs;
pub mod scheduler;

pub use jobs::rotation::{FireOutcome, RotationJob};
pub use scheduler::RotationScheduler;
