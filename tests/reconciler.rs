//! Tests for pool slot reconciliation on individual nodes.
mod common;
use common::*;
use exhaustive::config::ReconcilerConfig;
use exhaustive::graph::{Graph, GraphNode, HostGraph, HostNode, LinkId, NodeDefinition, NodeId};
use exhaustive::reconciler::{ReconcileOutcome, SlotReconciler};

fn reconciler() -> SlotReconciler {
    SlotReconciler::new(&ReconcilerConfig::default())
}

#[test]
fn test_fresh_node_shows_only_first_pool() {
    let mut rc = reconciler();
    let mut node = generator_node();
    assert_eq!(node.inputs.len(), 15);

    let outcome = rc.reconcile(&mut node);

    assert_eq!(outcome, ReconcileOutcome::Applied { visible: 1 });
    assert_eq!(input_names(&node), pool_names(1));
    assert_eq!(rc.templates().get(node.id).map(<[_]>::len), Some(15));
}

#[test]
fn test_two_connected_pools_show_three() {
    let mut rc = reconciler();
    let mut node = generator_node();
    link(&mut node, "pool_1", 10);
    link(&mut node, "pool_2", 11);

    rc.reconcile(&mut node);

    assert_eq!(input_names(&node), pool_names(3));
    assert_eq!(node.input("pool_1").and_then(|s| s.link), Some(LinkId(10)));
    assert_eq!(node.input("pool_2").and_then(|s| s.link), Some(LinkId(11)));
    assert_eq!(node.input("pool_3").and_then(|s| s.link), None);
}

#[test]
fn test_fourteen_connected_pools_cap_at_fifteen() {
    let mut rc = reconciler();
    let mut node = generator_node();
    for i in 1..=14 {
        link(&mut node, &format!("pool_{}", i), i);
    }

    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(15));

    link(&mut node, "pool_15", 15);
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(15));
    assert!(node.input("pool_16").is_none());
}

#[test]
fn test_disconnecting_unconnected_slot_keeps_prefix() {
    let mut rc = reconciler();
    let mut node = generator_node();
    rc.reconcile(&mut node);
    link(&mut node, "pool_1", 1);
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(2));

    // pool_2 was never connected; the disconnect event still triggers a rebuild
    unlink(&mut node, "pool_2");
    rc.reconcile(&mut node);

    assert_eq!(input_names(&node), pool_names(2));
    assert_eq!(node.input("pool_1").and_then(|s| s.link), Some(LinkId(1)));
}

#[test]
fn test_disconnecting_highest_shrinks_prefix() {
    let mut rc = reconciler();
    let mut node = generator_node();
    for i in 1..=3 {
        link(&mut node, &format!("pool_{}", i), i);
    }
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(4));

    unlink(&mut node, "pool_3");
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(3));

    unlink(&mut node, "pool_2");
    unlink(&mut node, "pool_1");
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(1));
}

#[test]
fn test_connecting_lower_pool_does_not_shrink() {
    let mut rc = reconciler();
    let mut node = generator_node();
    link(&mut node, "pool_3", 3);
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(4));

    link(&mut node, "pool_1", 1);
    rc.reconcile(&mut node);
    assert_eq!(input_names(&node), pool_names(4));
    assert_eq!(rc.highest_connected_index(&node), 3);
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut rc = reconciler();
    let mut node = generator_node();
    link(&mut node, "pool_1", 1);
    link(&mut node, "pool_4", 4);

    rc.reconcile(&mut node);
    let first = node.inputs.clone();
    rc.reconcile(&mut node);

    assert_eq!(node.inputs, first);
}

#[test]
fn test_non_pool_slots_keep_order_and_come_first() {
    let mut rc = reconciler();
    let mut node = BareNode::new(3, &["template_text", "pool_1", "pool_2", "seed", "pool_3"]);
    link(&mut node, "seed", 99);
    link(&mut node, "pool_1", 1);

    rc.reconcile(&mut node);

    assert_eq!(
        input_names(&node),
        vec!["template_text", "seed", "pool_1", "pool_2"]
    );
    let seed = node.inputs.iter().find(|s| s.name == "seed").unwrap();
    assert_eq!(seed.link, Some(LinkId(99)));
    let indices: Vec<usize> = node.inputs.iter().map(|s| s.slot_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_slot_index_matches_position() {
    let mut rc = reconciler();
    let mut node = BareNode::new(4, &["template_text", "pool_1", "pool_2"]);
    link(&mut node, "pool_1", 1);

    rc.reconcile(&mut node);

    for (position, slot) in node.inputs.iter().enumerate() {
        assert_eq!(slot.slot_index, position, "slot {}", slot.name);
    }
}

#[test]
fn test_node_without_pool_slots_is_skipped() {
    let mut rc = reconciler();
    let mut node = BareNode::new(5, &["template_text"]);

    assert_eq!(rc.reconcile(&mut node), ReconcileOutcome::Skipped);
    assert_eq!(input_names(&node), vec!["template_text"]);

    // the empty template is remembered
    assert!(rc.templates().contains(NodeId(5)));
    assert_eq!(rc.reconcile(&mut node), ReconcileOutcome::Skipped);
}

#[test]
fn test_missing_template_slots_are_synthesized() {
    let mut rc = reconciler();
    let mut node = BareNode::new(6, &["pool_1"]);
    link(&mut node, "pool_1", 1);

    rc.reconcile(&mut node);

    assert_eq!(input_names(&node), pool_names(2));
    assert_eq!(node.inputs[1].slot_type, "STRING");
    assert_eq!(node.inputs[1].link, None);
}

#[test]
fn test_template_is_frozen_after_first_capture() {
    let mut rc = reconciler();
    let mut node = generator_node();
    rc.reconcile(&mut node);
    assert_eq!(node.inputs.len(), 1);

    // the live node now has one pool slot, the template still has fifteen
    link(&mut node, "pool_1", 1);
    rc.reconcile(&mut node);
    assert_eq!(rc.capture_original_pool_slots(&node).len(), 15);
    assert_eq!(node.inputs[1].name, "pool_2");
}

#[test]
fn test_invalidate_recaptures_from_current_slots() {
    let mut rc = reconciler();
    let mut node = generator_node();
    rc.reconcile(&mut node);

    assert!(rc.invalidate(node.id));
    assert!(!rc.invalidate(node.id));
    assert_eq!(rc.capture_original_pool_slots(&node).len(), 1);
}

#[test]
fn test_forget_drops_template() {
    let mut rc = reconciler();
    let mut node = generator_node();
    rc.reconcile(&mut node);
    assert_eq!(rc.templates().len(), 1);

    assert!(rc.forget(node.id));
    assert!(rc.templates().is_empty());
}

#[test]
fn test_is_connected_and_highest_index() {
    let rc = reconciler();
    let mut node = generator_node();
    assert_eq!(rc.highest_connected_index(&node), 0);
    assert_eq!(rc.visible_count(&node), 1);

    link(&mut node, "pool_7", 7);
    assert!(rc.is_connected(&node, "pool_7"));
    assert!(!rc.is_connected(&node, "pool_6"));
    assert!(!rc.is_connected(&node, "pool_99"));
    assert_eq!(rc.highest_connected_index(&node), 7);
    assert_eq!(rc.visible_count(&node), 8);

    let empty = BareNode::new(9, &[]);
    assert!(!rc.is_connected(&empty, "pool_1"));
}

#[test]
fn test_custom_prefix_and_maximum() {
    let config = ReconcilerConfig {
        node_type: "Mixer".to_string(),
        slot_prefix: "input_".to_string(),
        slot_type: "IMAGE".to_string(),
        max_pools: 3,
    };
    let mut rc = SlotReconciler::new(&config);
    let definition = NodeDefinition::prompt_combination_generator("Mixer", "input_", "IMAGE", 3);
    let mut node = GraphNode::new(NodeId(1), &definition);
    link(&mut node, "input_3", 3);

    rc.reconcile(&mut node);

    assert_eq!(input_names(&node), vec!["input_1", "input_2", "input_3"]);
    assert!(node.inputs.iter().all(|s| s.slot_type == "IMAGE"));
}

#[test]
fn test_host_hooks_are_optional() {
    let mut rc = reconciler();
    let mut node = BareNode::new(2, &["pool_1", "pool_2"]);

    assert_eq!(
        rc.reconcile(&mut node),
        ReconcileOutcome::Applied { visible: 1 }
    );
}

#[test]
fn test_attached_node_is_resized_and_redrawn() {
    let mut rc = reconciler();
    let mut graph = Graph::new();
    let definition = NodeDefinition::prompt_combination_generator(GENERATOR, "pool_", "STRING", 15);
    let id = graph.add_node(&definition);

    let node = graph.lookup_mut(id).unwrap();
    rc.reconcile(node);

    let node = graph.node(id).unwrap();
    assert_eq!(node.redraws, 1);
    // one pool slot, three outputs: three rows below the title
    assert_eq!(node.size.height, 30.0 + 20.0 * 3.0);
}
