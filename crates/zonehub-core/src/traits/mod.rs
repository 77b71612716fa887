//! Core traits defined in `zonehub-core` and implemented by other crates.

pub mod admin;
pub mod allocator;
pub mod clock;
pub mod rotation;

pub use admin::AdminDirectory;
pub use allocator::ZoneAllocator;
pub use clock::{Clock, SystemClock};
pub use rotation::RotationTarget;
