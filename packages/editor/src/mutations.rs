//! # Site Mutations
//!
//! Serializable semantic operations on a site.
//!
//! ## Design principles
//!
//! 1. **Intent-preserving**: each mutation is one author action
//! 2. **Validated**: structural constraints are checked before anything is
//!    written, so a failing mutation is never partially applied
//! 3. **Minimal**: the set mirrors the persistence contract, nothing more
//!
//! ## Concurrency semantics
//!
//! Two sessions editing the same entity are not coordinated here; the
//! persistence layer is last-write-wins. Moves of deleted nodes fail,
//! edits of deleted entities fail, and a rebase drops them.

use crate::site::{Site, SiteResult, ViewFields};
use serde::{Deserialize, Serialize};
use trellis_common::{CompId, ConfigMap, NodeId, RefId};
use trellis_store::{ComponentConfig, StoreError};

/// Semantic mutations over a [`Site`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Mutation {
    /// Replace a component's config (same type).
    UpdateComponent {
        comp_id: CompId,
        config: ComponentConfig,
    },

    /// Replace a reference's override map.
    SetOverrides {
        ref_id: RefId,
        overrides: Option<ConfigMap>,
    },

    /// Create component + reference + node under a parent in one step.
    AddChild {
        parent: Option<NodeId>,
        after: Option<NodeId>,
        config: ComponentConfig,
        overrides: Option<ConfigMap>,
    },

    /// Relocate a node (and its subtree).
    MoveNode {
        node_id: NodeId,
        new_parent: Option<NodeId>,
        after: Option<NodeId>,
    },

    /// Remove a node and its subtree.
    RemoveNode { node_id: NodeId },

    /// Update a view's metadata.
    UpdateView {
        comp_id: CompId,
        fields: ViewFields,
    },

    /// Re-point the site's default home fallback.
    SetDefaultHome { node_id: Option<NodeId> },
}

/// What a mutation did. Creation reports the IDs it allocated so optimistic
/// clients can address the new entities; removal reports the subtree that
/// went away so caches can invalidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationResult {
    pub created: Option<(CompId, RefId, NodeId)>,
    pub removed: Vec<NodeId>,
}

impl Mutation {
    /// Validate without applying.
    pub fn validate(&self, site: &Site) -> SiteResult<()> {
        match self {
            Mutation::UpdateComponent { comp_id, .. } => {
                site.graph
                    .components
                    .get(*comp_id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::ComponentNotFound(*comp_id).into())
            }
            Mutation::SetOverrides { ref_id, .. } => {
                site.graph
                    .references
                    .get(*ref_id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::ReferenceNotFound(*ref_id).into())
            }
            Mutation::AddChild { parent, .. } => match parent {
                Some(parent_id) if !site.graph.nodes.contains(*parent_id) => {
                    Err(StoreError::NodeNotFound(*parent_id).into())
                }
                _ => Ok(()),
            },
            Mutation::MoveNode { node_id, .. } | Mutation::RemoveNode { node_id } => {
                site.graph
                    .nodes
                    .get(*node_id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::NodeNotFound(*node_id).into())
            }
            Mutation::UpdateView { comp_id, .. } => {
                site.graph
                    .components
                    .get(*comp_id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::ComponentNotFound(*comp_id).into())
            }
            Mutation::SetDefaultHome { node_id } => match node_id {
                Some(id) if !site.graph.nodes.contains(*id) => {
                    Err(StoreError::NodeNotFound(*id).into())
                }
                _ => Ok(()),
            },
        }
    }

    /// Validate, then apply.
    pub fn apply(&self, site: &mut Site) -> SiteResult<MutationResult> {
        self.validate(site)?;

        match self {
            Mutation::UpdateComponent { comp_id, config } => {
                site.update_component(*comp_id, config.clone())?;
                Ok(MutationResult::default())
            }
            Mutation::SetOverrides { ref_id, overrides } => {
                site.update_reference_overrides(*ref_id, overrides.clone())?;
                Ok(MutationResult::default())
            }
            Mutation::AddChild {
                parent,
                after,
                config,
                overrides,
            } => {
                let created =
                    site.add_child_to_node(*parent, *after, config.clone(), overrides.clone())?;
                Ok(MutationResult {
                    created: Some(created),
                    removed: Vec::new(),
                })
            }
            Mutation::MoveNode {
                node_id,
                new_parent,
                after,
            } => {
                site.move_node(*node_id, *new_parent, *after)?;
                Ok(MutationResult::default())
            }
            Mutation::RemoveNode { node_id } => {
                let removed = site.remove_node(*node_id)?;
                Ok(MutationResult {
                    created: None,
                    removed,
                })
            }
            Mutation::UpdateView { comp_id, fields } => {
                site.update_view(*comp_id, fields.clone())?;
                Ok(MutationResult::default())
            }
            Mutation::SetDefaultHome { node_id } => {
                site.set_default_home_node_id(*node_id)?;
                Ok(MutationResult::default())
            }
        }
    }
}
