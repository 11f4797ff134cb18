//! # Trellis Store
//!
//! The content graph: components, references, nodes, and the tree engine
//! that keeps sibling order intact under every edit.
//!
//! ## Shape of the graph
//!
//! ```text
//! Node ──ref_id──▶ Reference ──comp_id──▶ Component
//!  │ parent/order                           │ typed config
//!  ▼                                        ▼
//! Node tree (per view)                reusable payloads
//! ```
//!
//! A `Component` is a reusable payload (`ComponentConfig`, tagged by type).
//! A `Reference` is one usage site of a component, optionally carrying a
//! partial config override. A `Node` is one position in a content tree and
//! points to exactly one reference.
//!
//! [`ContentGraph`] bundles the three stores and owns every cross-store
//! invariant: reference counts move transactionally with reference
//! create/delete, nodes can only be created against live unused references,
//! and removing a node removes its whole subtree plus the references under
//! it. Individual stores stay dumb maps.

pub mod component;
pub mod error;
pub mod graph;
pub mod node;
pub mod reference;

#[cfg(test)]
mod tests_comprehensive;

pub use component::{Component, ComponentConfig, ComponentStore, ComponentType};
pub use error::{StoreError, StoreResult};
pub use graph::ContentGraph;
pub use node::{Node, NodeStore};
pub use reference::{Reference, ReferenceStore};
