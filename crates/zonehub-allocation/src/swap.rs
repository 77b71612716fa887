//! Resolution table for swapping two identities.
//!
//! | first | second | plan |
//! |---|---|---|
//! | placed | placed | `Exchange` (zone/zone, zone/wait, wait/zone, wait/wait) |
//! | placed | absent | `Replace`: the absent identity takes the slot |
//! | absent | placed | `Replace`, mirrored |
//! | absent | absent | none (`NeitherFound`) |

use zonehub_core::types::{Identity, Position};

use crate::store::AllocationStore;

/// How a swap request maps onto the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapPlan {
    /// Both are placed: each takes the other's position.
    Exchange {
        /// Where the first identity sits.
        first: Position,
        /// Where the second identity sits.
        second: Position,
    },
    /// Only one is placed: the unplaced identity overwrites that slot.
    ///
    /// The displaced identity is not placed anywhere else.
    // TODO: decide whether the displaced identity should be moved to the
    // incoming identity's slot (there is none) or onto the waitlist tail.
    Replace {
        /// The slot being overwritten.
        at: Position,
        /// Who sat there.
        displaced: Identity,
        /// Who takes it over.
        incoming: Identity,
    },
}

impl SwapPlan {
    /// Resolves the plan for two distinct identities, or `None` if neither is placed.
    pub fn resolve(store: &AllocationStore, first: &Identity, second: &Identity) -> Option<Self> {
        match (store.position_of(first), store.position_of(second)) {
            (Some(a), Some(b)) => Some(Self::Exchange {
                first: a,
                second: b,
            }),
            (Some(at), None) => Some(Self::Replace {
                at,
                displaced: first.clone(),
                incoming: second.clone(),
            }),
            (None, Some(at)) => Some(Self::Replace {
                at,
                displaced: second.clone(),
                incoming: first.clone(),
            }),
            (None, None) => None,
        }
    }

    /// Applies the plan to the store.
    ///
    /// Slots are vacated before being refilled so that every intermediate
    /// store state keeps placements unique.
    pub fn apply(&self, store: &mut AllocationStore) {
        match self {
            Self::Exchange { first, second } => {
                let first_holder = store.occupant_at(*first).cloned();
                let second_holder = store.occupant_at(*second).cloned();
                store.set_at(*first, None);
                store.set_at(*second, first_holder);
                store.set_at(*first, second_holder);
            }
            Self::Replace { at, incoming, .. } => {
                store.set_at(*at, Some(incoming.clone()));
            }
        }
    }
}
