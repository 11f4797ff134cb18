//! The metadata snapshot: pre-resolved view trees persisted for fast
//! read-only serving.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};
use trellis_common::{CompId, NodeId};
use trellis_editor::{Site, SiteError};
use trellis_resolver::ResolvedNode;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Site error: {0}")]
    Site(#[from] SiteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One view, flattened for serving: metadata at the top level, resolved
/// content blocks under `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub comp_id: CompId,
    pub root_node_id: NodeId,
    pub path: String,
    pub name: String,
    pub title: String,
    pub browser_title: String,
    pub description: Option<String>,
    pub is_home: bool,
    pub components: Vec<ResolvedNode>,
}

/// The persisted representation of the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub site_name: String,
    pub default_home_node_id: Option<NodeId>,
    pub generated_at: DateTime<Utc>,
    pub views: Vec<SnapshotView>,
}

impl Snapshot {
    /// Resolve every view on the site into a snapshot. Views without a
    /// content tree are skipped; they are unreachable anyway.
    #[instrument(skip(site), fields(site_name = %site.config.site_name))]
    pub fn capture(site: &Site) -> Result<Self, SnapshotError> {
        let mut views = Vec::new();
        for summary in site.views() {
            let Some(root_node_id) = summary.root_node_id else {
                continue;
            };
            let resolved = site.resolve_view(summary.comp_id)?;
            let config = &resolved.config;
            views.push(SnapshotView {
                comp_id: summary.comp_id,
                root_node_id,
                path: summary.path.clone(),
                name: summary.name.clone(),
                title: summary.title.clone(),
                browser_title: config
                    .get("browser_title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                description: config
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                is_home: summary.is_home,
                components: resolved.children,
            });
        }
        info!(views = views.len(), "Captured site snapshot");
        Ok(Self {
            site_name: site.config.site_name.clone(),
            default_home_node_id: site.config.default_home_node_id,
            generated_at: Utc::now(),
            views,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), views = self.views.len(), "Wrote snapshot");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
