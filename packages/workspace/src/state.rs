//! Client-side mirror of resolved views.
//!
//! The UI layer reads from this cache; authoring mutations write to it
//! optimistically (via re-resolution of the affected view) and then persist
//! through the service boundary. On persistence failure the caller decides
//! whether to re-resolve from server state or prompt; the cache itself
//! never rolls anything back.

use std::collections::HashMap;
use tracing::debug;
use trellis_common::{CompId, NodeId};
use trellis_editor::{Site, SiteResult};
use trellis_resolver::ResolvedNode;

/// One cached view tree plus its freshness counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedView {
    pub resolved: ResolvedNode,
    /// Bumped every time this view is re-resolved into the cache.
    pub version: u64,
}

/// Last-resolved views keyed by view component.
#[derive(Debug, Default)]
pub struct ClientCache {
    views: HashMap<CompId, CachedView>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, comp_id: CompId) -> Option<&CachedView> {
        self.views.get(&comp_id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Re-resolve one view from the site and cache it.
    pub fn refresh_view(&mut self, site: &Site, comp_id: CompId) -> SiteResult<&CachedView> {
        let resolved = site.resolve_view(comp_id)?;
        let version = self.views.get(&comp_id).map(|c| c.version + 1).unwrap_or(0);
        debug!(comp_id = %comp_id, version, "Refreshed cached view");
        self.views.insert(comp_id, CachedView { resolved, version });
        Ok(self.views.get(&comp_id).expect("inserted above"))
    }

    /// Re-resolve every view on the site, dropping cache entries for views
    /// that no longer exist.
    pub fn refresh_all(&mut self, site: &Site) -> SiteResult<()> {
        let summaries = site.views();
        self.views
            .retain(|comp_id, _| summaries.iter().any(|v| v.comp_id == *comp_id));
        for summary in &summaries {
            if summary.root_node_id.is_some() {
                self.refresh_view(site, summary.comp_id)?;
            }
        }
        Ok(())
    }

    /// Drop a single cached view (e.g. after its deletion).
    pub fn invalidate(&mut self, comp_id: CompId) {
        self.views.remove(&comp_id);
    }

    /// Drop every cached view containing `node_id`, so the next read
    /// re-resolves the affected subtree's view. Returns the invalidated
    /// view components.
    pub fn invalidate_node(&mut self, node_id: NodeId) -> Vec<CompId> {
        fn contains(node: &ResolvedNode, target: NodeId) -> bool {
            node.node_id == target || node.children.iter().any(|c| contains(c, target))
        }
        let stale: Vec<CompId> = self
            .views
            .iter()
            .filter(|(_, cached)| contains(&cached.resolved, node_id))
            .map(|(comp_id, _)| *comp_id)
            .collect();
        for comp_id in &stale {
            self.views.remove(comp_id);
        }
        stale
    }
}
