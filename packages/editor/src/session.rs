//! # Edit Session Management
//!
//! One client's editing view of the site: a local site copy mutated
//! optimistically, plus the queue of mutations awaiting persistence
//! acknowledgment.
//!
//! The core offers no automatic rollback. A rejected mutation is simply
//! dropped from the queue; getting the local copy back in sync happens via
//! [`EditSession::rebase`], which replaces the site with the server's
//! version and replays whatever is still pending. Mutations that no longer
//! apply after the replace are discarded silently, the same last-write-wins
//! stance the persistence layer takes.

use crate::mutations::{Mutation, MutationResult};
use crate::site::{Site, SiteResult};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use trellis_common::NodeId;

/// Mutation waiting for server acknowledgment.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: String,
    pub mutation: Mutation,
    pub queued_at: DateTime<Utc>,
}

/// Single edit session (one authoring client).
pub struct EditSession {
    /// Session identifier; prefixes every mutation ID.
    pub id: String,

    /// Local optimistic copy of the site.
    pub site: Site,

    /// Author's current selection, as node IDs.
    pub selected_nodes: Vec<NodeId>,

    /// Mutations applied locally but not yet confirmed.
    pending: Vec<PendingMutation>,

    /// Monotonic counter feeding mutation IDs.
    sequence: u64,
}

impl EditSession {
    pub fn new(id: impl Into<String>, site: Site) -> Self {
        Self {
            id: id.into(),
            site,
            selected_nodes: Vec::new(),
            pending: Vec::new(),
            sequence: 0,
        }
    }

    /// Apply a mutation to the local site immediately and queue it as
    /// pending. Returns the mutation ID to correlate the eventual
    /// confirm/reject, plus what the mutation did.
    pub fn apply_optimistic(
        &mut self,
        mutation: Mutation,
    ) -> SiteResult<(String, MutationResult)> {
        let result = mutation.apply(&mut self.site)?;
        self.sequence += 1;
        let mutation_id = format!("{}-{}", self.id, self.sequence);
        debug!(mutation_id = %mutation_id, "Queued optimistic mutation");
        self.pending.push(PendingMutation {
            id: mutation_id.clone(),
            mutation,
            queued_at: Utc::now(),
        });
        Ok((mutation_id, result))
    }

    /// Server accepted the mutation; drop it from the queue.
    pub fn confirm(&mut self, mutation_id: &str) {
        self.pending.retain(|m| m.id != mutation_id);
    }

    /// Server rejected the mutation. It leaves the queue; the local site
    /// still reflects it until the caller rebases onto server state.
    pub fn reject(&mut self, mutation_id: &str) {
        debug!(mutation_id = %mutation_id, "Mutation rejected by server");
        self.pending.retain(|m| m.id != mutation_id);
    }

    /// Replace the local site with the server's version and replay pending
    /// mutations on top. Mutations that fail against the new state are
    /// dropped.
    pub fn rebase(&mut self, server_site: Site) {
        let pending = std::mem::take(&mut self.pending);
        self.site = server_site;
        let mut kept = 0;
        for pm in pending {
            match pm.mutation.apply(&mut self.site) {
                Ok(_) => {
                    kept += 1;
                    self.pending.push(pm);
                }
                Err(err) => {
                    debug!(mutation_id = %pm.id, error = %err, "Dropped pending mutation on rebase");
                }
            }
        }
        info!(kept, "Rebased edit session onto server state");
    }

    pub fn set_selection(&mut self, node_ids: Vec<NodeId>) {
        self.selected_nodes = node_ids;
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> &[PendingMutation] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::ViewFields;
    use trellis_store::ComponentConfig;

    fn home_site() -> Site {
        let mut site = Site::new("test");
        site.create_view(ViewFields {
            path: "/".to_string(),
            name: "Home".to_string(),
            title: "Home".to_string(),
            browser_title: String::new(),
            description: None,
            is_home: true,
        })
        .unwrap();
        site
    }

    fn add_text(parent: NodeId) -> Mutation {
        Mutation::AddChild {
            parent: Some(parent),
            after: None,
            config: ComponentConfig::PlainText {
                content: "hello".to_string(),
            },
            overrides: None,
        }
    }

    #[test]
    fn test_optimistic_apply_mutates_local_site() {
        let site = home_site();
        let root = site.views()[0].root_node_id.unwrap();
        let mut session = EditSession::new("client-1", site);

        let (id, result) = session.apply_optimistic(add_text(root)).unwrap();
        assert_eq!(id, "client-1-1");
        assert_eq!(session.pending_count(), 1);
        let (_, _, node_id) = result.created.unwrap();
        assert!(session.site.graph.nodes.contains(node_id));
    }

    #[test]
    fn test_confirm_drains_the_queue() {
        let site = home_site();
        let root = site.views()[0].root_node_id.unwrap();
        let mut session = EditSession::new("client-1", site);
        let (id, _) = session.apply_optimistic(add_text(root)).unwrap();
        session.confirm(&id);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_failed_mutation_is_not_queued() {
        let site = home_site();
        let mut session = EditSession::new("client-1", site);
        let err = session.apply_optimistic(Mutation::RemoveNode {
            node_id: NodeId(999),
        });
        assert!(err.is_err());
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_rebase_replays_surviving_mutations() {
        let server = home_site();
        let root = server.views()[0].root_node_id.unwrap();
        let mut session = EditSession::new("client-1", server.clone());

        session.apply_optimistic(add_text(root)).unwrap();
        // A mutation that will not survive: its target only exists locally.
        let local_node = session
            .site
            .graph
            .nodes
            .children_of(Some(root))
            .first()
            .copied()
            .unwrap();
        session
            .apply_optimistic(Mutation::RemoveNode { node_id: local_node })
            .unwrap();
        assert_eq!(session.pending_count(), 2);

        // Server state never saw the added node, so the removal is dropped
        // and the add is replayed.
        session.rebase(server);
        assert_eq!(session.pending_count(), 1);
        assert_eq!(session.site.graph.nodes.children_of(Some(root)).len(), 1);
    }
}
