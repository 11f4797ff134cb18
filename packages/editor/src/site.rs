//! The editable site aggregate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use trellis_common::{CompId, ConfigMap, NodeId, RefId};
use trellis_resolver::{resolve_node, ResolveError, ResolvedNode};
use trellis_router::{collect_views, route, validate_view_path, PathError, RouteError, ViewSummary};
use trellis_store::{ComponentConfig, ComponentType, ContentGraph, StoreError};

pub type SiteResult<T> = Result<T, SiteError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid view path: {0}")]
    Path(#[from] PathError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    #[error("Component {0} is not a view container")]
    NotAView(CompId),

    #[error("View {0} has no content tree")]
    ViewWithoutTree(CompId),
}

/// Site-level configuration. `default_home_node_id` is the routing fallback
/// kept alongside the per-view `is_home` flag; the router arbitrates when
/// the two disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_name: String,
    pub default_home_node_id: Option<NodeId>,
}

/// Author-editable view metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewFields {
    pub path: String,
    pub name: String,
    pub title: String,
    pub browser_title: String,
    pub description: Option<String>,
    pub is_home: bool,
}

impl ViewFields {
    fn into_config(self, tag_ids: Vec<u32>) -> ComponentConfig {
        ComponentConfig::ViewContainer {
            path: self.path,
            name: self.name,
            title: self.title,
            browser_title: self.browser_title,
            description: self.description,
            is_home: self.is_home,
            tag_ids,
        }
    }
}

/// The content graph plus site configuration, with every authoring
/// operation the client contract names.
#[derive(Debug, Default, Clone)]
pub struct Site {
    pub graph: ContentGraph,
    pub config: SiteConfig,
}

impl Site {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            graph: ContentGraph::new(),
            config: SiteConfig {
                site_name: site_name.into(),
                default_home_node_id: None,
            },
        }
    }

    // ---- component / reference / node passthrough ----

    pub fn create_component(&mut self, config: ComponentConfig) -> CompId {
        self.graph.create_component(config)
    }

    pub fn update_component(&mut self, comp_id: CompId, config: ComponentConfig) -> SiteResult<()> {
        Ok(self.graph.update_component(comp_id, config)?)
    }

    pub fn delete_component(&mut self, comp_id: CompId) -> SiteResult<()> {
        self.graph.delete_component(comp_id)?;
        Ok(())
    }

    pub fn create_reference(
        &mut self,
        comp_id: CompId,
        overrides: Option<ConfigMap>,
    ) -> SiteResult<RefId> {
        Ok(self.graph.create_reference(comp_id, overrides)?)
    }

    pub fn update_reference_overrides(
        &mut self,
        ref_id: RefId,
        overrides: Option<ConfigMap>,
    ) -> SiteResult<()> {
        Ok(self.graph.update_reference_overrides(ref_id, overrides)?)
    }

    pub fn delete_reference(&mut self, ref_id: RefId) -> SiteResult<()> {
        self.graph.delete_reference(ref_id)?;
        Ok(())
    }

    pub fn create_node(
        &mut self,
        ref_id: RefId,
        parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> SiteResult<NodeId> {
        Ok(self.graph.create_node(ref_id, parent, after)?)
    }

    pub fn move_node(
        &mut self,
        node_id: NodeId,
        new_parent: Option<NodeId>,
        after: Option<NodeId>,
    ) -> SiteResult<()> {
        Ok(self.graph.move_node(node_id, new_parent, after)?)
    }

    /// Remove a node and its subtree. If the default home pointer named a
    /// removed node it is cleared.
    pub fn remove_node(&mut self, node_id: NodeId) -> SiteResult<Vec<NodeId>> {
        let removed = self.graph.remove_node(node_id)?;
        if let Some(home) = self.config.default_home_node_id {
            if removed.contains(&home) {
                debug!(node_id = %home, "Default home node removed; clearing pointer");
                self.config.default_home_node_id = None;
            }
        }
        Ok(removed)
    }

    // ---- composite conveniences ----

    /// Create component + reference + node under a parent node in one call.
    /// With no `after` anchor the new block lands at the end of the sibling
    /// list, which is where authors expect a freshly added block.
    #[instrument(skip(self, config), fields(parent = ?parent))]
    pub fn add_child_to_node(
        &mut self,
        parent: Option<NodeId>,
        after: Option<NodeId>,
        config: ComponentConfig,
        overrides: Option<ConfigMap>,
    ) -> SiteResult<(CompId, RefId, NodeId)> {
        let after = match after {
            Some(anchor) => Some(anchor),
            None => self.graph.nodes.children_of(parent).last().copied(),
        };
        let comp_id = self.graph.create_component(config);
        let ref_id = self
            .graph
            .create_reference(comp_id, overrides)
            .expect("component created above");
        let node_id = match self.graph.create_node(ref_id, parent, after) {
            Ok(node_id) => node_id,
            Err(err) => {
                // Unwind the half-built block so the failure is not
                // partially applied.
                let _ = self.graph.delete_reference(ref_id);
                let _ = self.graph.delete_component(comp_id);
                return Err(err.into());
            }
        };
        info!(comp_id = %comp_id, ref_id = %ref_id, node_id = %node_id, "Added child block");
        Ok((comp_id, ref_id, node_id))
    }

    /// Create a block as the last child of a view's root.
    pub fn add_component_to_view(
        &mut self,
        view_comp_id: CompId,
        config: ComponentConfig,
        overrides: Option<ConfigMap>,
    ) -> SiteResult<(CompId, RefId, NodeId)> {
        let root = self.view_root(view_comp_id)?;
        self.add_child_to_node(Some(root), None, config, overrides)
    }

    // ---- views ----

    /// Create a view: component, reference and root node in one step. The
    /// path is validated before anything is written.
    #[instrument(skip(self, fields), fields(path = %fields.path))]
    pub fn create_view(&mut self, fields: ViewFields) -> SiteResult<(CompId, NodeId)> {
        validate_view_path(&fields.path, &self.views(), None)?;
        let make_home = fields.is_home;
        let comp_id = self.graph.create_component(fields.into_config(Vec::new()));
        let ref_id = self
            .graph
            .create_reference(comp_id, None)
            .expect("component created above");
        let root = self
            .graph
            .create_node(ref_id, None, None)
            .expect("reference created above");
        if make_home {
            self.clear_other_home_flags(comp_id);
        }
        info!(comp_id = %comp_id, root = %root, "Created view");
        Ok((comp_id, root))
    }

    /// Update view metadata. Path validation excludes the view itself, so
    /// saving without changing the path never self-collides. Setting
    /// `is_home` clears the flag on every other view.
    pub fn update_view(&mut self, comp_id: CompId, fields: ViewFields) -> SiteResult<()> {
        validate_view_path(&fields.path, &self.views(), Some(comp_id))?;
        let component = self
            .graph
            .components
            .get(comp_id)
            .ok_or(StoreError::ComponentNotFound(comp_id))?;
        let tag_ids = match &component.config {
            ComponentConfig::ViewContainer { tag_ids, .. } => tag_ids.clone(),
            _ => return Err(SiteError::NotAView(comp_id)),
        };
        let make_home = fields.is_home;
        self.graph
            .update_component(comp_id, fields.into_config(tag_ids))?;
        if make_home {
            self.clear_other_home_flags(comp_id);
        }
        Ok(())
    }

    /// Delete a view and its whole content tree. If the default home
    /// pointer referenced the deleted tree it falls back to the first
    /// remaining view's root.
    #[instrument(skip(self))]
    pub fn delete_view(&mut self, comp_id: CompId) -> SiteResult<()> {
        if !matches!(
            self.graph.components.get(comp_id).map(|c| c.component_type()),
            Some(ComponentType::ViewContainer)
        ) {
            return Err(SiteError::NotAView(comp_id));
        }
        let had_home_pointer = self.config.default_home_node_id.is_some();
        if let Some(root) = self.graph.root_node_for_component(comp_id) {
            self.remove_node(root)?;
        }
        self.graph.delete_component(comp_id)?;
        // The pointer only moves if the deleted tree held it.
        if had_home_pointer && self.config.default_home_node_id.is_none() {
            self.config.default_home_node_id =
                self.views().iter().find_map(|v| v.root_node_id);
        }
        info!(comp_id = %comp_id, "Deleted view");
        Ok(())
    }

    pub fn views(&self) -> Vec<ViewSummary> {
        collect_views(&self.graph)
    }

    /// Root node of a view's content tree.
    pub fn view_root(&self, comp_id: CompId) -> SiteResult<NodeId> {
        let component = self
            .graph
            .components
            .get(comp_id)
            .ok_or(StoreError::ComponentNotFound(comp_id))?;
        if component.component_type() != ComponentType::ViewContainer {
            return Err(SiteError::NotAView(comp_id));
        }
        self.graph
            .root_node_for_component(comp_id)
            .ok_or(SiteError::ViewWithoutTree(comp_id))
    }

    /// Resolve a view's full tree.
    pub fn resolve_view(&self, comp_id: CompId) -> SiteResult<ResolvedNode> {
        let root = self.view_root(comp_id)?;
        Ok(resolve_node(&self.graph, root)?)
    }

    /// Resolve any subtree. This is the "resolved" query flag of the node API.
    pub fn resolve_subtree(&self, node_id: NodeId) -> SiteResult<ResolvedNode> {
        Ok(resolve_node(&self.graph, node_id)?)
    }

    /// Route a request path to a view summary.
    pub fn route_path(&self, path: &str) -> SiteResult<ViewSummary> {
        let views = self.views();
        let matched = route(&views, path, self.config.default_home_node_id)?;
        Ok(matched.clone())
    }

    // ---- site-level ----

    pub fn default_home_node_id(&self) -> Option<NodeId> {
        self.config.default_home_node_id
    }

    pub fn set_default_home_node_id(&mut self, node_id: Option<NodeId>) -> SiteResult<()> {
        if let Some(id) = node_id {
            if !self.graph.nodes.contains(id) {
                return Err(StoreError::NodeNotFound(id).into());
            }
        }
        self.config.default_home_node_id = node_id;
        Ok(())
    }

    fn clear_other_home_flags(&mut self, keep: CompId) {
        let others: Vec<CompId> = self
            .graph
            .view_components()
            .iter()
            .filter_map(|c| match &c.config {
                ComponentConfig::ViewContainer { is_home: true, .. } if c.comp_id != keep => {
                    Some(c.comp_id)
                }
                _ => None,
            })
            .collect();
        for comp_id in others {
            if let Some(component) = self.graph.components.get_mut(comp_id) {
                if let ComponentConfig::ViewContainer { is_home, .. } = &mut component.config {
                    *is_home = false;
                    component.touch();
                }
            }
        }
    }
}
