//! The content graph: all three stores plus every cross-store invariant.
//!
//! Invariants owned here:
//!
//! - a reference always names a live component, and component
//!   `reference_count` moves transactionally with reference create/delete;
//! - a node always names a live reference, and a reference is used by at
//!   most one node;
//! - removing a node removes its subtree and the references under it;
//! - components are never deleted while referenced; orphans (count zero)
//!   are collected only by the explicit [`ContentGraph::sweep_orphans`].

use crate::component::{Component, ComponentConfig, ComponentStore, ComponentType};
use crate::error::{StoreError, StoreResult};
use crate::node::NodeStore;
use crate::reference::{Reference, ReferenceStore};
use tracing::{debug, info, instrument, warn};
use trellis_common::{CompId, ConfigMap, IdAllocator, NodeId, RefId};

#[derive(Debug, Default, Clone)]
pub struct ContentGraph {
    pub components: ComponentStore,
    pub references: ReferenceStore,
    pub nodes: NodeStore,
    ids: IdAllocator,
}

impl ContentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- components ----

    pub fn create_component(&mut self, config: ComponentConfig) -> CompId {
        let comp_id = self.ids.next_comp_id();
        debug!(comp_id = %comp_id, comp_type = %config.component_type(), "Creating component");
        self.components.insert(Component::new(comp_id, config));
        comp_id
    }

    /// Replace a component's config. The type is fixed for the component's
    /// lifetime; changing it would silently retype every usage site.
    pub fn update_component(&mut self, comp_id: CompId, config: ComponentConfig) -> StoreResult<()> {
        let component = self
            .components
            .get_mut(comp_id)
            .ok_or(StoreError::ComponentNotFound(comp_id))?;
        if component.config.component_type() != config.component_type() {
            return Err(StoreError::TypeMismatch {
                comp_id,
                expected: component.config.component_type().as_str(),
                found: config.component_type().as_str(),
            });
        }
        component.config = config;
        component.touch();
        Ok(())
    }

    /// Delete a component. Referenced components cannot be deleted; delete
    /// the references (or their nodes) first, then this or
    /// [`Self::sweep_orphans`].
    pub fn delete_component(&mut self, comp_id: CompId) -> StoreResult<Component> {
        let component = self
            .components
            .get(comp_id)
            .ok_or(StoreError::ComponentNotFound(comp_id))?;
        if component.reference_count > 0 {
            return Err(StoreError::ComponentInUse {
                comp_id,
                reference_count: component.reference_count,
            });
        }
        Ok(self.components.remove(comp_id).expect("presence checked above"))
    }

    /// Remove every component whose reference count is zero. Returns the
    /// collected IDs.
    #[instrument(skip(self))]
    pub fn sweep_orphans(&mut self) -> Vec<CompId> {
        let orphans: Vec<CompId> = self
            .components
            .iter()
            .filter(|c| c.reference_count == 0)
            .map(|c| c.comp_id)
            .collect();
        for &comp_id in &orphans {
            self.components.remove(comp_id);
        }
        if !orphans.is_empty() {
            info!(count = orphans.len(), "Swept orphaned components");
        }
        orphans
    }

    // ---- references ----

    pub fn create_reference(
        &mut self,
        comp_id: CompId,
        overrides: Option<ConfigMap>,
    ) -> StoreResult<RefId> {
        let component = self
            .components
            .get_mut(comp_id)
            .ok_or(StoreError::ComponentNotFound(comp_id))?;
        component.reference_count += 1;
        component.touch();
        let ref_id = self.ids.next_ref_id();
        debug!(ref_id = %ref_id, comp_id = %comp_id, "Creating reference");
        self.references.insert(Reference::new(ref_id, comp_id, overrides));
        Ok(ref_id)
    }

    pub fn update_reference_overrides(
        &mut self,
        ref_id: RefId,
        overrides: Option<ConfigMap>,
    ) -> StoreResult<()> {
        let reference = self
            .references
            .get_mut(ref_id)
            .ok_or(StoreError::ReferenceNotFound(ref_id))?;
        reference.overrides = overrides;
        reference.touch();
        Ok(())
    }

    /// Delete a reference and release its hold on the component. A reference
    /// still used by a node cannot be deleted; remove the node instead.
    pub fn delete_reference(&mut self, ref_id: RefId) -> StoreResult<Reference> {
        if !self.references.contains(ref_id) {
            return Err(StoreError::ReferenceNotFound(ref_id));
        }
        if let Some(node) = self.nodes.iter().find(|n| n.ref_id == ref_id) {
            return Err(StoreError::ReferenceInUse {
                ref_id,
                node_id: node.node_id,
            });
        }
        Ok(self.release_reference(ref_id).expect("presence checked above"))
    }

    /// Unconditional removal + refcount decrement, shared by
    /// [`Self::delete_reference`] and subtree removal.
    fn release_reference(&mut self, ref_id: RefId) -> Option<Reference> {
        let reference = self.references.remove(ref_id)?;
        match self.components.get_mut(reference.comp_id) {
            Some(component) => {
                if component.reference_count == 0 {
                    warn!(comp_id = %component.comp_id, "Reference count already zero");
                } else {
                    component.reference_count -= 1;
                }
                component.touch();
            }
            None => {
                warn!(ref_id = %ref_id, comp_id = %reference.comp_id, "Released reference to missing component")
            }
        }
        Some(reference)
    }

    // ---- nodes ----

    /// Create a node pointing at an existing, unused reference.
    pub fn create_node(
        &mut self,
        ref_id: RefId,
        parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> StoreResult<NodeId> {
        if !self.references.contains(ref_id) {
            return Err(StoreError::ReferenceNotFound(ref_id));
        }
        if let Some(node) = self.nodes.iter().find(|n| n.ref_id == ref_id) {
            return Err(StoreError::ReferenceInUse {
                ref_id,
                node_id: node.node_id,
            });
        }
        let node_id = self.ids.next_node_id();
        self.nodes.insert_after(node_id, ref_id, parent, after)?;
        Ok(node_id)
    }

    /// Remove a node, its subtree, and every reference the subtree used.
    /// Components are only de-referenced, never deleted here.
    #[instrument(skip(self), fields(node_id = %node_id))]
    pub fn remove_node(&mut self, node_id: NodeId) -> StoreResult<Vec<NodeId>> {
        let removed = self.nodes.remove_subtree(node_id)?;
        let mut removed_ids = Vec::with_capacity(removed.len());
        for node in removed {
            self.release_reference(node.ref_id);
            removed_ids.push(node.node_id);
        }
        info!(count = removed_ids.len(), "Removed node subtree");
        Ok(removed_ids)
    }

    pub fn move_node(
        &mut self,
        node_id: NodeId,
        new_parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> StoreResult<()> {
        self.nodes.move_node(node_id, new_parent, after)
    }

    // ---- queries ----

    /// Every `(ref_id, node_id)` pair using a component.
    pub fn component_usages(&self, comp_id: CompId) -> Vec<(RefId, Option<NodeId>)> {
        self.references
            .referencing(comp_id)
            .into_iter()
            .map(|r| {
                let node = self.nodes.iter().find(|n| n.ref_id == r.ref_id);
                (r.ref_id, node.map(|n| n.node_id))
            })
            .collect()
    }

    /// The root node of the tree a node belongs to.
    pub fn root_of(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id)?;
        Some(
            self.nodes
                .ancestors_of(node_id)
                .last()
                .copied()
                .unwrap_or(node_id),
        )
    }

    /// Root node of the tree whose root reference points at `comp_id`, if
    /// any. This is how a view container finds its content.
    pub fn root_node_for_component(&self, comp_id: CompId) -> Option<NodeId> {
        self.nodes
            .roots()
            .iter()
            .copied()
            .find(|&root| {
                self.nodes
                    .get(root)
                    .and_then(|n| self.references.get(n.ref_id))
                    .map(|r| r.comp_id == comp_id)
                    .unwrap_or(false)
            })
    }

    /// Integrity sweep. Returns human-readable findings; an empty list means
    /// the graph is consistent.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for node in self.nodes.iter() {
            if !self.references.contains(node.ref_id) {
                findings.push(format!(
                    "node {} has dangling ref_id {}",
                    node.node_id, node.ref_id
                ));
            }
            if let Some(parent) = node.parent {
                if !self.nodes.contains(parent) {
                    findings.push(format!(
                        "node {} has dangling parent {}",
                        node.node_id, parent
                    ));
                } else if !self
                    .nodes
                    .children_of(Some(parent))
                    .contains(&node.node_id)
                {
                    findings.push(format!(
                        "node {} is missing from the order of parent {}",
                        node.node_id, parent
                    ));
                }
            }
        }

        for reference in self.references.iter() {
            if !self.components.contains(reference.comp_id) {
                findings.push(format!(
                    "reference {} has dangling comp_id {}",
                    reference.ref_id, reference.comp_id
                ));
            }
        }

        for component in self.components.iter() {
            let live = self.references.referencing(component.comp_id).len() as u32;
            if live != component.reference_count {
                findings.push(format!(
                    "component {} has reference_count {}, expected {}",
                    component.comp_id, component.reference_count, live
                ));
            }
        }

        if !findings.is_empty() {
            warn!(count = findings.len(), "Integrity validation found problems");
        }
        findings
    }

    /// All view-container components.
    pub fn view_components(&self) -> Vec<&Component> {
        self.components.of_type(ComponentType::ViewContainer)
    }
}
