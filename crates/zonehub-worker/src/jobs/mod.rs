//! Jobs run by the scheduler.

pub mod rotation;
