//! Resolution suite: merge semantics, round-trips, idempotence, strict
//! errors on dangling IDs.

use crate::*;
use serde_json::json;
use trellis_common::{CompId, ConfigMap, NodeId};
use trellis_store::{ComponentConfig, ContentGraph};

fn overrides(value: serde_json::Value) -> Option<ConfigMap> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        other => panic!("expected object, got {other}"),
    }
}

/// A view with a style container holding two leaves, plus a loose sibling.
fn demo_graph() -> (ContentGraph, NodeId) {
    let mut graph = ContentGraph::new();

    let view = graph.create_component(ComponentConfig::ViewContainer {
        path: "/about".to_string(),
        name: "About".to_string(),
        title: "About me".to_string(),
        browser_title: "about".to_string(),
        description: None,
        is_home: false,
        tag_ids: vec![],
    });
    let view_ref = graph.create_reference(view, None).unwrap();
    let root = graph.create_node(view_ref, None, None).unwrap();

    let section = graph.create_component(ComponentConfig::Section {
        text: "Hello".to_string(),
        level: "h1".to_string(),
    });
    let section_ref = graph.create_reference(section, None).unwrap();
    graph.create_node(section_ref, Some(root), None).unwrap();

    let style = graph.create_component(ComponentConfig::StyleContainer {
        is_transparent: true,
    });
    let style_ref = graph.create_reference(style, None).unwrap();
    let style_node = {
        let first = graph.nodes.children_of(Some(root))[0];
        graph.create_node(style_ref, Some(root), Some(first)).unwrap()
    };

    let text = graph.create_component(ComponentConfig::PlainText {
        content: "body".to_string(),
    });
    let text_ref = graph.create_reference(text, None).unwrap();
    graph.create_node(text_ref, Some(style_node), None).unwrap();

    let pdf = graph.create_component(ComponentConfig::Pdf {
        src: "cv.pdf".to_string(),
        title: Some("Base title".to_string()),
    });
    let pdf_ref = graph
        .create_reference(pdf, overrides(json!({"title": "Site title"})))
        .unwrap();
    graph
        .create_node(pdf_ref, Some(style_node), Some(graph.nodes.children_of(Some(style_node))[0]))
        .unwrap();

    (graph, root)
}

mod merge_semantics {
    use super::*;

    #[test]
    fn test_override_wins_and_base_falls_through() {
        let mut graph = ContentGraph::new();
        let comp = graph.create_component(ComponentConfig::Alert {
            content: "base".to_string(),
            variant: "info".to_string(),
        });
        let r = graph
            .create_reference(comp, overrides(json!({"variant": "warning"})))
            .unwrap();
        let node = graph.create_node(r, None, None).unwrap();

        let resolved = resolve_node(&graph, node).unwrap();
        assert_eq!(resolved.config["content"], json!("base"));
        assert_eq!(resolved.config["variant"], json!("warning"));
    }

    #[test]
    fn test_missing_overrides_equal_empty_overrides() {
        let mut graph = ContentGraph::new();
        let comp = graph.create_component(ComponentConfig::PlainText {
            content: "x".to_string(),
        });
        let r1 = graph.create_reference(comp, None).unwrap();
        let r2 = graph.create_reference(comp, Some(ConfigMap::new())).unwrap();
        let n1 = graph.create_node(r1, None, None).unwrap();
        let n2 = graph.create_node(r2, None, Some(n1)).unwrap();

        let a = resolve_node(&graph, n1).unwrap();
        let b = resolve_node(&graph, n2).unwrap();
        assert_eq!(a.config, b.config);
    }

    #[test]
    fn test_shared_component_diverges_per_site() {
        let (graph, root) = demo_graph();
        let resolved = resolve_node(&graph, root).unwrap();
        let style = &resolved.children[1];
        let pdf = &style.children[1];
        assert_eq!(pdf.config["title"], json!("Site title"));
        assert_eq!(pdf.config["src"], json!("cv.pdf"));
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_round_trip_preserves_id_triples() {
        let (graph, root) = demo_graph();
        let resolved = resolve_node(&graph, root).unwrap();

        fn walk(graph: &ContentGraph, resolved: &ResolvedNode) {
            let node = graph.nodes.get(resolved.node_id).expect("node exists");
            assert_eq!(node.ref_id, resolved.ref_id);
            let reference = graph.references.get(resolved.ref_id).expect("ref exists");
            assert_eq!(reference.comp_id, resolved.comp_id);
            for child in &resolved.children {
                assert_eq!(
                    graph.nodes.get(child.node_id).unwrap().parent,
                    Some(resolved.node_id)
                );
                walk(graph, child);
            }
        }
        walk(&graph, &resolved);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (graph, root) = demo_graph();
        let first = resolve_node(&graph, root).unwrap();
        let second = resolve_node(&graph, root).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_children_follow_author_order() {
        let (graph, root) = demo_graph();
        let resolved = resolve_node(&graph, root).unwrap();
        let types: Vec<_> = resolved
            .children
            .iter()
            .map(|c| c.component_type.as_str())
            .collect();
        assert_eq!(types, vec!["section", "style-container"]);
    }

    #[test]
    fn test_leaf_children_are_not_rendered() {
        let mut graph = ContentGraph::new();
        let leaf = graph.create_component(ComponentConfig::PlainText {
            content: "leaf".to_string(),
        });
        let leaf_ref = graph.create_reference(leaf, None).unwrap();
        let leaf_node = graph.create_node(leaf_ref, None, None).unwrap();

        // Accidental child under a leaf type.
        let stray = graph.create_component(ComponentConfig::PlainText {
            content: "stray".to_string(),
        });
        let stray_ref = graph.create_reference(stray, None).unwrap();
        graph.create_node(stray_ref, Some(leaf_node), None).unwrap();

        let resolved = resolve_node(&graph, leaf_node).unwrap();
        assert!(resolved.children.is_empty());
    }

    #[test]
    fn test_subtree_resolution_is_reentrant() {
        let (graph, root) = demo_graph();
        let full = resolve_node(&graph, root).unwrap();
        let style_node = full.children[1].node_id;
        let partial = resolve_node(&graph, style_node).unwrap();
        assert_eq!(partial, full.children[1]);
    }
}

mod strictness {
    use super::*;

    #[test]
    fn test_missing_root_node_errors() {
        let graph = ContentGraph::new();
        assert_eq!(
            resolve_node(&graph, NodeId(1)).unwrap_err(),
            ResolveError::NodeNotFound(NodeId(1))
        );
    }

    #[test]
    fn test_dangling_component_carries_both_ids() {
        let mut graph = ContentGraph::new();
        let comp = graph.create_component(ComponentConfig::PlainText {
            content: "x".to_string(),
        });
        let r = graph.create_reference(comp, None).unwrap();
        let node = graph.create_node(r, None, None).unwrap();
        // Corrupt: drop the component behind the reference's back.
        graph.components.remove(comp);

        let err = resolve_node(&graph, node).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ComponentNotFound {
                ref_id: r,
                comp_id: comp
            }
        );
    }

    #[test]
    fn test_dangling_reference_carries_both_ids() {
        let mut graph = ContentGraph::new();
        let comp = graph.create_component(ComponentConfig::PlainText {
            content: "x".to_string(),
        });
        let r = graph.create_reference(comp, None).unwrap();
        let node = graph.create_node(r, None, None).unwrap();
        graph.references.remove(r);

        let err = resolve_node(&graph, node).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ReferenceNotFound {
                node_id: node,
                ref_id: r
            }
        );
    }

    #[test]
    fn test_serialized_shape_matches_renderer_contract() {
        let (graph, root) = demo_graph();
        let resolved = resolve_node(&graph, root).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["type"], json!("view-container"));
        assert!(json["config"].is_object());
        assert!(json["children"].is_array());
        assert_eq!(json["config"]["path"], json!("/about"));
    }
}

#[test]
fn test_resolved_comp_ids_reference_live_components() {
    let (graph, root) = demo_graph();
    let resolved = resolve_node(&graph, root).unwrap();
    fn check(graph: &ContentGraph, node: &ResolvedNode) {
        let _: CompId = node.comp_id;
        assert!(graph.components.get(node.comp_id).is_some());
        node.children.iter().for_each(|c| check(graph, c));
    }
    check(&graph, &resolved);
}
