//! # Trellis Resolver
//!
//! Turns a node subtree plus the content graph into a self-contained,
//! denormalized [`ResolvedNode`] tree ready for rendering.
//!
//! ## Determinism contract
//!
//! Resolution is pure: same graph, same root, same output, every time.
//! It never mutates the graph and holds no state between calls, so it is
//! safe to run concurrently from any number of readers and re-entrant per
//! subtree: an editor can re-resolve just the list it changed instead of
//! the whole view.
//!
//! ## Strictness
//!
//! A dangling `ref_id` or `comp_id` during traversal is data corruption and
//! surfaces as a [`ResolveError`] carrying the offending IDs. The one
//! tolerated anomaly is children found under a leaf-typed component: those
//! are skipped with a warning, because rendering them would invent
//! structure the component type does not have.

pub mod resolver;

#[cfg(test)]
mod tests_resolution;

pub use resolver::{resolve_node, ResolveError, ResolveResult, ResolvedNode};
