//! # zonehub-allocation
//!
//! The zone board: who may occupy a zone, how the waitlist is queued and
//! compacted, how swaps are resolved, and how rotation moves the front of
//! the waitlist into the zones.
//!
//! ## Modules
//!
//! - `store`: zones and waitlist with invariant-checked mutators
//! - `swap`: resolution table for swapping two identities
//! - `engine`: join/leave/wait/reclaim/exit/swap/rotate against the store
//! - `memory`: mutex-guarded allocator implementing [`ZoneAllocator`]
//!
//! [`ZoneAllocator`]: zonehub_core::traits::ZoneAllocator

pub mod engine;
pub mod memory;
pub mod store;
pub mod swap;

pub use engine::{AllocationEngine, RotationState};
pub use memory::MemoryZoneAllocator;
pub use store::AllocationStore;
pub use swap::SwapPlan;
