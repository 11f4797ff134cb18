//! # Identifier Space
//!
//! Three disjoint ID kinds address the content graph:
//!
//! - `CompId`: a reusable component payload
//! - `RefId`: one usage site of a component (pointer + overrides)
//! - `NodeId`: one position in a content tree
//!
//! IDs are random `u32` values. They are opaque handles: never reused,
//! never shown to authors as editable data. Allocation goes through
//! [`IdAllocator`], which tracks every ID it has handed out per kind and
//! resamples on collision, so uniqueness is guaranteed rather than assumed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identifier of a reusable component payload.
    CompId
);
define_id!(
    /// Identifier of a reference (one usage site of a component).
    RefId
);
define_id!(
    /// Identifier of a node (one position in a content tree).
    NodeId
);

/// Centralized ID allocator.
///
/// Owns the set of issued IDs for each kind and resamples until it draws a
/// fresh value. Stores register pre-existing IDs (e.g. when loaded from a
/// snapshot) via the `observe_*` methods so later allocations cannot collide
/// with persisted data.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    comp_ids: HashSet<u32>,
    ref_ids: HashSet<u32>,
    node_ids: HashSet<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_comp_id(&mut self) -> CompId {
        CompId(sample_unique(&mut self.comp_ids))
    }

    pub fn next_ref_id(&mut self) -> RefId {
        RefId(sample_unique(&mut self.ref_ids))
    }

    pub fn next_node_id(&mut self) -> NodeId {
        NodeId(sample_unique(&mut self.node_ids))
    }

    pub fn observe_comp_id(&mut self, id: CompId) {
        self.comp_ids.insert(id.0);
    }

    pub fn observe_ref_id(&mut self, id: RefId) {
        self.ref_ids.insert(id.0);
    }

    pub fn observe_node_id(&mut self, id: NodeId) {
        self.node_ids.insert(id.0);
    }
}

fn sample_unique(issued: &mut HashSet<u32>) -> u32 {
    let mut rng = rand::thread_rng();
    loop {
        let candidate: u32 = rng.gen();
        if issued.insert(candidate) {
            return candidate;
        }
    }
}
