//! Request-path to view matching.

use crate::paths::normalize;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use trellis_common::{CompId, NodeId};
use trellis_store::{ComponentConfig, ContentGraph};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("No view matches path '{path}'")]
    NotFound { path: String },

    #[error("Site has no home view")]
    NoHome,
}

/// Routing-relevant slice of a view container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub comp_id: CompId,
    /// Root node of the view's content tree, when one exists.
    pub root_node_id: Option<NodeId>,
    pub path: String,
    pub name: String,
    pub title: String,
    pub is_home: bool,
}

/// Extract a summary for every view container in the graph.
pub fn collect_views(graph: &ContentGraph) -> Vec<ViewSummary> {
    let mut views: Vec<ViewSummary> = graph
        .view_components()
        .into_iter()
        .filter_map(|component| match &component.config {
            ComponentConfig::ViewContainer {
                path,
                name,
                title,
                is_home,
                ..
            } => Some(ViewSummary {
                comp_id: component.comp_id,
                root_node_id: graph.root_node_for_component(component.comp_id),
                path: path.clone(),
                name: name.clone(),
                title: title.clone(),
                is_home: *is_home,
            }),
            _ => None,
        })
        .collect();
    // Store iteration order is arbitrary; keep the output stable.
    views.sort_by_key(|v| v.comp_id);
    views
}

/// Match a request path against the site's views.
///
/// `/` walks the home fallback chain: the `is_home` view, then the view
/// whose root node is `default_home_node_id`, then the view whose literal
/// path is `/`. Any other path matches exactly, tolerating one trailing
/// slash on either side.
#[instrument(skip(views), fields(views = views.len()))]
pub fn route<'a>(
    views: &'a [ViewSummary],
    path: &str,
    default_home_node_id: Option<NodeId>,
) -> Result<&'a ViewSummary, RouteError> {
    let normalized = normalize(path);

    if normalized == "/" {
        if let Some(view) = views.iter().find(|v| v.is_home) {
            debug!(comp_id = %view.comp_id, "Home matched via is_home flag");
            return Ok(view);
        }
        if let Some(home_node) = default_home_node_id {
            if let Some(view) = views.iter().find(|v| v.root_node_id == Some(home_node)) {
                debug!(comp_id = %view.comp_id, "Home matched via default_home_node_id");
                return Ok(view);
            }
        }
        if let Some(view) = views.iter().find(|v| v.path == "/") {
            debug!(comp_id = %view.comp_id, "Home matched via literal root path");
            return Ok(view);
        }
        return Err(RouteError::NoHome);
    }

    views
        .iter()
        .find(|v| {
            let stored = normalize(&v.path);
            stored == normalized
        })
        .ok_or_else(|| RouteError::NotFound {
            path: normalized.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(comp_id: u32, path: &str, is_home: bool) -> ViewSummary {
        ViewSummary {
            comp_id: CompId(comp_id),
            root_node_id: Some(NodeId(comp_id * 100)),
            path: path.to_string(),
            name: String::new(),
            title: String::new(),
            is_home,
        }
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let views = [view(1, "/", true), view(2, "/blog", false)];
        let matched = route(&views, "/blog/", None).unwrap();
        assert_eq!(matched.comp_id, CompId(2));
    }

    #[test]
    fn test_stored_trailing_slash_is_tolerated() {
        let views = [view(2, "/blog/", false)];
        assert_eq!(route(&views, "/blog", None).unwrap().comp_id, CompId(2));
    }

    #[test]
    fn test_home_prefers_is_home_flag() {
        let views = [view(1, "/about", true), view(2, "/", false)];
        assert_eq!(route(&views, "/", Some(NodeId(200))).unwrap().comp_id, CompId(1));
    }

    #[test]
    fn test_home_falls_back_to_default_home_node() {
        let views = [view(1, "/about", false)];
        let matched = route(&views, "/", Some(NodeId(100))).unwrap();
        assert_eq!(matched.comp_id, CompId(1));
    }

    #[test]
    fn test_home_falls_back_to_literal_root_path() {
        let views = [view(1, "/about", false), view(2, "/", false)];
        assert_eq!(route(&views, "/", None).unwrap().comp_id, CompId(2));
    }

    #[test]
    fn test_no_home_at_all() {
        let views = [view(1, "/about", false)];
        assert_eq!(route(&views, "/", None).unwrap_err(), RouteError::NoHome);
    }

    #[test]
    fn test_stale_default_home_pointer_is_skipped() {
        // Pointer names a node no view owns; chain continues to the literal
        // root path.
        let views = [view(1, "/about", false), view(2, "/", false)];
        let matched = route(&views, "/", Some(NodeId(999))).unwrap();
        assert_eq!(matched.comp_id, CompId(2));
    }

    #[test]
    fn test_miss_is_not_found() {
        let views = [view(1, "/blog", false)];
        assert_eq!(
            route(&views, "/nonexistent", None).unwrap_err(),
            RouteError::NotFound {
                path: "/nonexistent".to_string()
            }
        );
    }

    #[test]
    fn test_no_prefix_matching() {
        let views = [view(1, "/blog", false)];
        assert!(route(&views, "/blog/2024", None).is_err());
    }

    #[test]
    fn test_root_slash_is_never_stripped() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize("/blog/"), "/blog");
    }
}
