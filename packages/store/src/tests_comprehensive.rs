//! Comprehensive tree-engine suite: edit sequences that must keep every
//! sibling chain well-formed, and graph-level consistency under mixed
//! operations.

use crate::*;
use trellis_common::{NodeId, RefId};

/// Assert the derived sibling chain of every populated parent bucket is a
/// single well-formed list: first child pairs with `None`, each later child
/// pairs with its predecessor, no duplicates.
fn assert_chains_well_formed(store: &NodeStore) {
    let mut parents: Vec<Option<NodeId>> = store.iter().map(|n| n.parent).collect();
    parents.push(None);
    parents.sort();
    parents.dedup();

    for parent in parents {
        let chain = store.sibling_chain(parent);
        let mut seen = std::collections::HashSet::new();
        for (i, (node_id, previous)) in chain.iter().enumerate() {
            assert!(seen.insert(*node_id), "duplicate node {node_id} in chain");
            if i == 0 {
                assert_eq!(*previous, None, "first child of {parent:?} has a previous");
            } else {
                assert_eq!(
                    *previous,
                    Some(chain[i - 1].0),
                    "chain of {parent:?} broken at position {i}"
                );
            }
            let node = store.get(*node_id).expect("chain references a live node");
            assert_eq!(node.parent, parent, "node {node_id} in the wrong bucket");
        }
    }
}

mod tree_engine_sequences {
    use super::*;

    #[test]
    fn test_chain_stays_well_formed_under_long_edit_sequence() {
        let mut store = NodeStore::new();
        let root = NodeId(1);
        store.insert_after(root, RefId(1), None, None).unwrap();

        // Deterministic but irregular interleaving of inserts, moves and
        // removals across two levels.
        let mut next_raw = 2u32;
        let mut level_one: Vec<NodeId> = Vec::new();
        for round in 0..40 {
            let id = NodeId(next_raw);
            next_raw += 1;
            let after = match round % 3 {
                0 => None,
                1 => level_one.first().copied(),
                _ => level_one.last().copied(),
            };
            store.insert_after(id, RefId(next_raw), Some(root), after).unwrap();
            level_one.push(id);
            assert_chains_well_formed(&store);

            if round % 5 == 4 {
                let victim = level_one.remove(round % level_one.len());
                store.remove_subtree(victim).unwrap();
                assert_chains_well_formed(&store);
            }
            if round % 7 == 6 && level_one.len() >= 2 {
                let mover = level_one[0];
                let anchor = level_one[level_one.len() - 1];
                store.move_node(mover, Some(root), Some(anchor)).unwrap();
                assert_chains_well_formed(&store);
            }
        }
        assert_eq!(store.children_of(Some(root)).len(), level_one.len());
    }

    #[test]
    fn test_interleaved_inserts_preserve_relative_order() {
        let mut store = NodeStore::new();
        let root = NodeId(1);
        store.insert_after(root, RefId(1), None, None).unwrap();

        let a = NodeId(10);
        let b = NodeId(11);
        let c = NodeId(12);
        store.insert_after(a, RefId(2), Some(root), None).unwrap();
        store.insert_after(c, RefId(3), Some(root), Some(a)).unwrap();
        store.insert_after(b, RefId(4), Some(root), Some(a)).unwrap();
        assert_eq!(store.children_of(Some(root)), &[a, b, c]);
        assert_chains_well_formed(&store);
    }

    #[test]
    fn test_move_to_head_of_other_parent_changes_exactly_two_chains() {
        let mut store = NodeStore::new();
        let left = NodeId(1);
        let right = NodeId(2);
        store.insert_after(left, RefId(1), None, None).unwrap();
        store.insert_after(right, RefId(2), None, Some(left)).unwrap();

        let l1 = NodeId(10);
        let l2 = NodeId(11);
        let r1 = NodeId(20);
        store.insert_after(l1, RefId(3), Some(left), None).unwrap();
        store.insert_after(l2, RefId(4), Some(left), Some(l1)).unwrap();
        store.insert_after(r1, RefId(5), Some(right), None).unwrap();

        let untouched_roots = store.sibling_chain(None);
        store.move_node(l1, Some(right), None).unwrap();

        // Old chain: l2 became first child. New chain: r1 now follows l1.
        assert_eq!(store.sibling_chain(Some(left)), vec![(l2, None)]);
        assert_eq!(
            store.sibling_chain(Some(right)),
            vec![(l1, None), (r1, Some(l1))]
        );
        // Root chain untouched.
        assert_eq!(store.sibling_chain(None), untouched_roots);
        assert_chains_well_formed(&store);
    }

    #[test]
    fn test_remove_head_and_tail() {
        let mut store = NodeStore::new();
        let root = NodeId(1);
        store.insert_after(root, RefId(1), None, None).unwrap();
        let ids: Vec<NodeId> = (10..14).map(NodeId).collect();
        let mut after = None;
        for &id in &ids {
            store.insert_after(id, RefId(id.as_u32()), Some(root), after).unwrap();
            after = Some(id);
        }

        store.remove_subtree(ids[0]).unwrap();
        assert_chains_well_formed(&store);
        store.remove_subtree(*ids.last().unwrap()).unwrap();
        assert_chains_well_formed(&store);
        assert_eq!(store.children_of(Some(root)), &ids[1..3]);
    }
}

mod graph_consistency {
    use super::*;
    use serde_json::json;

    fn leaf(graph: &mut ContentGraph, content: &str) -> trellis_common::RefId {
        let comp = graph.create_component(ComponentConfig::PlainText {
            content: content.to_string(),
        });
        graph.create_reference(comp, None).unwrap()
    }

    #[test]
    fn test_validate_stays_clean_under_edit_sequence() {
        let mut graph = ContentGraph::new();
        let view = graph.create_component(ComponentConfig::ViewContainer {
            path: "/".to_string(),
            name: "Home".to_string(),
            title: "Home".to_string(),
            browser_title: String::new(),
            description: None,
            is_home: true,
            tag_ids: vec![],
        });
        let view_ref = graph.create_reference(view, None).unwrap();
        let root = graph.create_node(view_ref, None, None).unwrap();
        assert!(graph.validate().is_empty());

        let mut children = Vec::new();
        for i in 0..10 {
            let r = leaf(&mut graph, &format!("block {i}"));
            let n = graph.create_node(r, Some(root), children.last().copied()).unwrap();
            children.push(n);
            assert!(graph.validate().is_empty());
        }

        graph.move_node(children[9], Some(root), None).unwrap();
        graph.remove_node(children[4]).unwrap();
        assert!(graph.validate().is_empty());

        // Shared component across two sites with different overrides.
        let shared = graph.create_component(ComponentConfig::Pdf {
            src: "cv.pdf".to_string(),
            title: Some("CV".to_string()),
        });
        for caption in ["first", "second"] {
            let mut overrides = trellis_common::ConfigMap::new();
            overrides.insert("title".to_string(), json!(caption));
            let r = graph.create_reference(shared, Some(overrides)).unwrap();
            graph.create_node(r, Some(root), None).unwrap();
        }
        assert_eq!(graph.components.get(shared).unwrap().reference_count, 2);
        assert!(graph.validate().is_empty());

        // Tearing the whole view down releases everything.
        graph.remove_node(root).unwrap();
        assert!(graph.references.is_empty());
        assert!(graph.nodes.is_empty());
        assert!(graph.validate().is_empty());
    }
}
