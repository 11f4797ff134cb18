//! Depth-first node resolution with config merging.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use trellis_common::{CompId, ConfigMap, NodeId, RefId};
use trellis_store::{ComponentType, ContentGraph};

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {node_id} points at missing reference {ref_id}")]
    ReferenceNotFound { node_id: NodeId, ref_id: RefId },

    #[error("Reference {ref_id} points at missing component {comp_id}")]
    ComponentNotFound { ref_id: RefId, comp_id: CompId },

    #[error("Cycle detected at node {node_id} during resolution")]
    CycleDetected { node_id: NodeId },
}

/// A fully resolved node: component type, merged config, ordered children.
///
/// Derived and ephemeral: rebuilt on every resolution request, never the
/// source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub node_id: NodeId,
    pub ref_id: RefId,
    pub comp_id: CompId,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub config: ConfigMap,
    pub children: Vec<ResolvedNode>,
}

/// Resolve the subtree rooted at `node_id`.
///
/// For each node: dereference node → reference → component, merge the
/// reference's overrides onto the component's base config (override keys
/// win, nothing is ever deleted), and recurse into ordered children,
/// container types only. Children under a leaf type are skipped with a
/// warning.
#[instrument(skip(graph), fields(root = %node_id))]
pub fn resolve_node(graph: &ContentGraph, node_id: NodeId) -> ResolveResult<ResolvedNode> {
    let mut visiting = HashSet::new();
    resolve_inner(graph, node_id, &mut visiting)
}

fn resolve_inner(
    graph: &ContentGraph,
    node_id: NodeId,
    visiting: &mut HashSet<NodeId>,
) -> ResolveResult<ResolvedNode> {
    if !visiting.insert(node_id) {
        return Err(ResolveError::CycleDetected { node_id });
    }

    let node = graph
        .nodes
        .get(node_id)
        .ok_or(ResolveError::NodeNotFound(node_id))?;
    let reference = graph
        .references
        .get(node.ref_id)
        .ok_or(ResolveError::ReferenceNotFound {
            node_id,
            ref_id: node.ref_id,
        })?;
    let component =
        graph
            .components
            .get(reference.comp_id)
            .ok_or(ResolveError::ComponentNotFound {
                ref_id: reference.ref_id,
                comp_id: reference.comp_id,
            })?;

    let component_type = component.component_type();
    let config = reference.merge_config(&component.config.to_map());

    let child_ids = graph.nodes.children_of(Some(node_id));
    let children = if component_type.is_container() {
        let mut resolved = Vec::with_capacity(child_ids.len());
        for &child_id in child_ids {
            resolved.push(resolve_inner(graph, child_id, visiting)?);
        }
        resolved
    } else {
        if !child_ids.is_empty() {
            warn!(
                node_id = %node_id,
                comp_type = %component_type,
                count = child_ids.len(),
                "Skipping children under leaf-typed component"
            );
        }
        Vec::new()
    };

    visiting.remove(&node_id);
    debug!(node_id = %node_id, comp_type = %component_type, children = children.len(), "Resolved node");

    Ok(ResolvedNode {
        node_id,
        ref_id: reference.ref_id,
        comp_id: component.comp_id,
        component_type,
        config,
        children,
    })
}
