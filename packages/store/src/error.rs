//! Error types for the content graph.
//!
//! Every mutation that names a missing ID is an error, not a silent no-op:
//! callers (and tests) can tell "nothing to do" apart from referential
//! corruption.

use thiserror::Error;
use trellis_common::{CompId, NodeId, RefId};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Component not found: {0}")]
    ComponentNotFound(CompId),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(RefId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Component {comp_id} still has {reference_count} live reference(s)")]
    ComponentInUse {
        comp_id: CompId,
        reference_count: u32,
    },

    #[error("Reference {ref_id} is already used by node {node_id}")]
    ReferenceInUse { ref_id: RefId, node_id: NodeId },

    #[error("Component {comp_id} is a {found}, expected a {expected}")]
    TypeMismatch {
        comp_id: CompId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Node {node_id} is not a child of the target parent")]
    NotASibling { node_id: NodeId },

    #[error("Moving node {node_id} under {new_parent} would create a cycle")]
    WouldCycle { node_id: NodeId, new_parent: NodeId },
}
