//! Nodes and the tree engine.
//!
//! ## Ordering model
//!
//! Sibling order is array-backed: a per-parent order table
//! (`HashMap<Option<NodeId>, Vec<NodeId>>`, `None` keying the root bucket)
//! is the single source of truth for author-visible order. Insert, remove
//! and move keep the table and the node map consistent in one `&mut self`
//! call, so no caller can observe a half-moved tree.
//!
//! The operation contract is still expressed in sibling terms
//! (`after: Option<NodeId>`, `None` meaning "first child"), and
//! [`NodeStore::sibling_chain`] derives classic previous-sibling pointers
//! for consumers that want the linked-list shape.
//!
//! Upward and downward walks bound their iteration by store size, so they
//! terminate even on cyclic corruption instead of spinning.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use trellis_common::{NodeId, RefId};

/// One position in a content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: NodeId,
    pub ref_id: RefId,
    /// `None` for tree roots.
    pub parent: Option<NodeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    fn new(node_id: NodeId, ref_id: RefId, parent: Option<NodeId>) -> Self {
        let now = Utc::now();
        Self {
            node_id,
            ref_id,
            parent,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The node map plus the per-parent order table.
#[derive(Debug, Default, Clone)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    children: HashMap<Option<NodeId>, Vec<NodeId>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordered child IDs of a parent (`None` for the root bucket).
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ordered child nodes of a parent. The order matches what the author
    /// sees, exactly.
    pub fn ordered_children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.children_of(parent)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Tree roots, in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        self.children_of(None)
    }

    /// Children of `parent` paired with their derived previous-sibling
    /// pointer (`None` for the first child).
    pub fn sibling_chain(&self, parent: Option<NodeId>) -> Vec<(NodeId, Option<NodeId>)> {
        let ids = self.children_of(parent);
        ids.iter()
            .enumerate()
            .map(|(i, &id)| (id, if i == 0 { None } else { Some(ids[i - 1]) }))
            .collect()
    }

    /// Insert a new node under `parent`, positioned after `after`
    /// (`None` = first child).
    pub fn insert_after(
        &mut self,
        node_id: NodeId,
        ref_id: RefId,
        parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> StoreResult<()> {
        if let Some(parent_id) = parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(StoreError::NodeNotFound(parent_id));
            }
        }
        let index = self.anchor_index(parent, after)?;
        debug!(node_id = %node_id, ref_id = %ref_id, ?parent, ?after, "Inserting node");
        self.nodes.insert(node_id, Node::new(node_id, ref_id, parent));
        self.children.entry(parent).or_default().insert(index, node_id);
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns every removed node,
    /// parents before children, so the caller can release their references.
    pub fn remove_subtree(&mut self, node_id: NodeId) -> StoreResult<Vec<Node>> {
        if !self.nodes.contains_key(&node_id) {
            return Err(StoreError::NodeNotFound(node_id));
        }
        let doomed = {
            let mut ids = vec![node_id];
            ids.extend(self.descendants_of(node_id));
            ids
        };
        debug!(node_id = %node_id, subtree = doomed.len(), "Removing subtree");

        // Unlink the subtree root from its parent's order; descendants only
        // exist inside buckets that are dropped wholesale below.
        if let Some(root) = self.nodes.get(&node_id) {
            let parent = root.parent;
            if let Some(order) = self.children.get_mut(&parent) {
                order.retain(|&id| id != node_id);
            }
        }

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            self.children.remove(&Some(id));
            if let Some(node) = self.nodes.remove(&id) {
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// Relocate a node (and implicitly its subtree) in one step.
    ///
    /// Rejects moves that would place a node under its own descendant, and
    /// anchors that are not current children of the target parent. There is
    /// no intermediate state in which the node is detached but not yet
    /// re-attached.
    pub fn move_node(
        &mut self,
        node_id: NodeId,
        new_parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> StoreResult<()> {
        if !self.nodes.contains_key(&node_id) {
            return Err(StoreError::NodeNotFound(node_id));
        }
        if let Some(parent_id) = new_parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(StoreError::NodeNotFound(parent_id));
            }
            if parent_id == node_id || self.ancestors_of(parent_id).contains(&node_id) {
                return Err(StoreError::WouldCycle {
                    node_id,
                    new_parent: parent_id,
                });
            }
        }
        if after == Some(node_id) {
            return Err(StoreError::NotASibling { node_id });
        }
        self.anchor_index(new_parent, after)?;

        // All checks passed; detach and re-attach without further fallibility.
        let old_parent = self.nodes[&node_id].parent;
        if let Some(order) = self.children.get_mut(&old_parent) {
            order.retain(|&id| id != node_id);
        }
        let index = self
            .anchor_index(new_parent, after)
            .expect("anchor validated above");
        self.children
            .entry(new_parent)
            .or_default()
            .insert(index, node_id);
        let node = self.nodes.get_mut(&node_id).expect("presence checked above");
        node.parent = new_parent;
        node.updated_at = Utc::now();
        debug!(node_id = %node_id, ?new_parent, ?after, "Moved node");
        Ok(())
    }

    /// Ancestors from the immediate parent upward. Iteration is bounded by
    /// store size so cyclic corruption terminates.
    pub fn ancestors_of(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.nodes.get(&node_id).and_then(|n| n.parent);
        while let Some(id) = current {
            if ancestors.len() > self.nodes.len() {
                break;
            }
            ancestors.push(id);
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        ancestors
    }

    /// Descendants in depth-first order. Bounded like [`Self::ancestors_of`].
    pub fn descendants_of(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = self.children_of(Some(node_id)).to_vec();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) || descendants.len() > self.nodes.len() {
                break;
            }
            descendants.push(id);
            for &child in self.children_of(Some(id)).iter().rev() {
                stack.push(child);
            }
        }
        descendants
    }

    /// Index at which a node anchored by `after` lands in `parent`'s order.
    fn anchor_index(&self, parent: Option<NodeId>, after: Option<NodeId>) -> StoreResult<usize> {
        match after {
            None => Ok(0),
            Some(after_id) => {
                let order = self.children_of(parent);
                match order.iter().position(|&id| id == after_id) {
                    Some(index) => Ok(index + 1),
                    None => {
                        if self.nodes.contains_key(&after_id) {
                            Err(StoreError::NotASibling { node_id: after_id })
                        } else {
                            Err(StoreError::NodeNotFound(after_id))
                        }
                    }
                }
            }
        }
    }
}
