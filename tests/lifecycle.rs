//! Tests for lifecycle dispatch, deferred scheduling and extension registration.
mod common;
use common::*;
use exhaustive::config::{Config, SchedulerConfig};
use exhaustive::editor::{Editor, Workflow};
use exhaustive::error::{HostError, RegistryError};
use exhaustive::graph::{HostNode, LinkId, NodeDefinition, NodeId};
use exhaustive::lifecycle::{
    ConnectionKind, DYNAMIC_POOLS_EXTENSION, DeferredScheduler, DynamicPoolsExtension,
    ExtensionRegistry, FnListener, LifecycleEvent, POOL_LISTENER_NAME,
};
use exhaustive::signal::QUEUE_SIGNALS_EXTENSION;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{self, Instant};

#[tokio::test(start_paused = true)]
async fn test_reconciliation_waits_for_settle_delay() {
    let mut editor = editor();
    let generator = editor.add_node(GENERATOR).unwrap();
    assert!(editor.scheduler().is_pending(generator));

    assert_eq!(editor.poll(Instant::now()), 0);
    assert_eq!(editor.node(generator).unwrap().inputs.len(), 15);

    time::advance(Duration::from_millis(19)).await;
    assert_eq!(editor.poll(Instant::now()), 0);

    time::advance(Duration::from_millis(1)).await;
    assert_eq!(editor.poll(Instant::now()), 1);
    assert_eq!(editor.node(generator).unwrap().input_names(), vec!["pool_1"]);
    assert_eq!(editor.scheduler().pending_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_requests_coalesce() {
    let mut scheduler = DeferredScheduler::new(Duration::from_millis(20));
    scheduler.request(NodeId(1));
    let first_due = scheduler.next_due().unwrap();

    time::advance(Duration::from_millis(10)).await;
    scheduler.request(NodeId(1));

    assert_eq!(scheduler.pending_len(), 1);
    assert_eq!(
        scheduler.next_due().unwrap(),
        first_due + Duration::from_millis(10)
    );
}

#[tokio::test(start_paused = true)]
async fn test_coalesced_request_reconciles_once() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 2);

    editor.connect(texts[0], 0, generator, "pool_1").unwrap();
    time::advance(Duration::from_millis(10)).await;
    editor.connect(texts[1], 0, generator, "pool_1").unwrap();

    time::advance(Duration::from_millis(10)).await;
    // the second connection pushed the due time back
    assert_eq!(editor.poll(Instant::now()), 0);

    time::advance(Duration::from_millis(10)).await;
    assert_eq!(editor.poll(Instant::now()), 1);
    assert_eq!(editor.poll(Instant::now()), 0);
    assert_eq!(editor.node(generator).unwrap().input_names(), pool_names(2));
}

#[tokio::test(start_paused = true)]
async fn test_run_until_idle_drains_pending() {
    let mut editor = editor();
    let first = editor.add_node(GENERATOR).unwrap();
    let second = editor.add_node(GENERATOR).unwrap();
    let text = editor.add_node(TEXT).unwrap();

    let start = Instant::now();
    assert_eq!(editor.run_until_idle().await, 2);
    assert!(Instant::now() >= start + Duration::from_millis(20));

    assert_eq!(editor.node(first).unwrap().inputs.len(), 1);
    assert_eq!(editor.node(second).unwrap().inputs.len(), 1);
    assert!(!editor.scheduler().is_pending(text));
    assert_eq!(editor.run_until_idle().await, 0);
}

#[test]
fn test_run_until_idle_in_real_time() {
    let mut editor = editor();
    let generator = editor.add_node(GENERATOR).unwrap();

    assert_eq!(tokio_test::block_on(editor.run_until_idle()), 1);
    assert_eq!(editor.node(generator).unwrap().input_names(), vec!["pool_1"]);
}

#[test]
fn test_settle_runs_immediately() {
    let mut editor = editor();
    let generator = editor.add_node(GENERATOR).unwrap();

    assert_eq!(editor.settle(), 1);
    assert_eq!(editor.node(generator).unwrap().inputs.len(), 1);
    assert_eq!(editor.settle(), 0);
}

#[test]
fn test_scheduler_delay_from_config() {
    let scheduler = DeferredScheduler::from_config(&SchedulerConfig {
        settle_delay_ms: 50,
    });
    assert_eq!(scheduler.delay(), Duration::from_millis(50));
    assert_eq!(DeferredScheduler::default().delay(), Duration::from_millis(20));
}

#[test]
fn test_cancel_removes_pending() {
    let mut scheduler = DeferredScheduler::default();
    scheduler.request(NodeId(4));

    assert!(scheduler.cancel(NodeId(4)));
    assert!(!scheduler.cancel(NodeId(4)));
    assert!(scheduler.next_due().is_none());
}

#[test]
fn test_host_listener_runs_before_extension_listener() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);

    let config = Config::default();
    let mut editor = Editor::bare(&config);
    editor
        .register_extension(Box::new(DynamicPoolsExtension::new(GENERATOR)))
        .unwrap();
    let host = FnListener::new("host", move |node: &mut dyn HostNode, event: &LifecycleEvent| {
        log.borrow_mut().push(format!("{} {}", node.id(), event));
    });
    editor
        .register_node_def_with_host(
            NodeDefinition::prompt_combination_generator(GENERATOR, "pool_", "STRING", 15),
            Box::new(host),
        )
        .unwrap();

    let node_type = editor.registry().node_type(GENERATOR).unwrap();
    assert_eq!(node_type.listeners.names(), vec!["host", POOL_LISTENER_NAME]);

    let id = editor.add_node(GENERATOR).unwrap();
    assert_eq!(*seen.borrow(), vec![format!("{} created", id)]);
    assert!(editor.scheduler().is_pending(id));
}

#[test]
fn test_duplicate_extension_is_rejected() {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(DynamicPoolsExtension::new(GENERATOR)))
        .unwrap();

    let err = registry
        .register(Box::new(DynamicPoolsExtension::new("Other")))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateExtension(DYNAMIC_POOLS_EXTENSION.to_string())
    );
    assert_eq!(registry.extension_names(), vec![DYNAMIC_POOLS_EXTENSION]);
}

#[test]
fn test_duplicate_node_type_is_rejected() {
    let mut registry = ExtensionRegistry::new();
    registry.register_node_def(NodeDefinition::text_input()).unwrap();

    let err = registry
        .register_node_def(NodeDefinition::text_input())
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateNodeType("MultiLineTextInput".to_string())
    );
}

#[test]
fn test_pool_listener_attaches_only_to_target_type() {
    let editor = editor();
    let registry = editor.registry();

    assert_eq!(
        registry.extension_names(),
        vec![DYNAMIC_POOLS_EXTENSION, QUEUE_SIGNALS_EXTENSION]
    );
    assert_eq!(
        registry.node_type(GENERATOR).unwrap().listeners.names(),
        vec![POOL_LISTENER_NAME]
    );
    for other in [TEXT, "AutoQueueLoopController", "ExhaustivePromptCombinator"] {
        assert!(registry.node_type(other).unwrap().listeners.is_empty(), "{}", other);
    }
}

#[test]
fn test_extension_must_precede_node_definition() {
    let config = Config::default();
    let mut editor = Editor::bare(&config);
    editor
        .register_node_def(NodeDefinition::prompt_combination_generator(
            GENERATOR, "pool_", "STRING", 15,
        ))
        .unwrap();
    editor
        .register_extension(Box::new(DynamicPoolsExtension::new(GENERATOR)))
        .unwrap();

    let id = editor.add_node(GENERATOR).unwrap();
    assert!(!editor.scheduler().is_pending(id));
    assert_eq!(editor.settle(), 0);
    assert_eq!(editor.node(id).unwrap().inputs.len(), 15);
}

#[test]
fn test_other_node_types_schedule_nothing() {
    let mut editor = editor();
    let text = editor.add_node(TEXT).unwrap();
    let controller = editor.add_node("AutoQueueLoopController").unwrap();

    assert!(!editor.scheduler().is_pending(text));
    assert!(!editor.scheduler().is_pending(controller));
    assert_eq!(editor.settle(), 0);
}

#[test]
fn test_unknown_node_type_is_an_error() {
    let mut editor = editor();
    assert_eq!(
        editor.add_node("Nope"),
        Err(HostError::UnknownNodeType("Nope".to_string()))
    );
}

#[test]
fn test_connect_and_disconnect_end_to_end() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 3);

    editor.connect(texts[0], 0, generator, "pool_1").unwrap();
    editor.settle();
    editor.connect(texts[1], 0, generator, "pool_2").unwrap();
    editor.settle();
    editor.connect(texts[2], 0, generator, "pool_3").unwrap();
    editor.settle();
    assert_eq!(editor.node(generator).unwrap().input_names(), pool_names(4));
    assert_eq!(editor.graph().link_count(), 3);

    editor.disconnect(generator, "pool_3").unwrap();
    editor.settle();
    assert_eq!(editor.node(generator).unwrap().input_names(), pool_names(3));

    // disconnecting a free slot is a no-op
    assert!(editor.disconnect(generator, "pool_3").is_none());
    assert_eq!(editor.graph().link_count(), 2);
}

#[test]
fn test_connect_to_missing_slot_fails() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 1);

    // pool_5 is hidden after the first reconciliation
    assert!(editor.connect(texts[0], 0, generator, "pool_5").is_none());
    assert!(editor.connect(texts[0], 3, generator, "pool_1").is_none());
    assert!(!editor.scheduler().is_pending(generator));
}

#[test]
fn test_replacing_a_link_keeps_one_connection() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 2);

    let first = editor.connect(texts[0], 0, generator, "pool_1").unwrap();
    let second = editor.connect(texts[1], 0, generator, "pool_1").unwrap();
    editor.settle();

    assert_ne!(first, second);
    assert!(editor.graph().link(first).is_none());
    assert_eq!(editor.graph().link_count(), 1);
    let node = editor.node(generator).unwrap();
    assert_eq!(node.input("pool_1").and_then(|s| s.link), Some(second));
    assert_eq!(node.input_names(), pool_names(2));
}

#[test]
fn test_load_graph_restores_links_and_reconciles() {
    let json = r#"{
        "nodes": [
            {
                "id": 7,
                "type": "PromptCombinationGenerator",
                "inputs": [
                    {"name": "pool_1", "type": "STRING", "link": 3},
                    {"name": "pool_2", "type": "STRING", "link": null},
                    {"name": "pool_3", "type": "STRING", "link": 4}
                ],
                "outputs": ["LIST", "INT", "STRING"]
            },
            {"id": 2, "type": "MultiLineTextInput", "outputs": ["STRING"]}
        ]
    }"#;
    let mut editor = editor();
    let ids = editor.load_graph_json(json).unwrap();
    assert_eq!(ids, vec![NodeId(7), NodeId(2)]);
    assert!(editor.scheduler().is_pending(NodeId(7)));
    assert!(!editor.scheduler().is_pending(NodeId(2)));

    assert_eq!(editor.settle(), 1);
    let node = editor.node(NodeId(7)).unwrap();
    assert_eq!(node.input_names(), pool_names(4));
    assert_eq!(node.input("pool_1").and_then(|s| s.link), Some(LinkId(3)));
    assert_eq!(node.input("pool_3").and_then(|s| s.link), Some(LinkId(4)));
    assert_eq!(node.input("pool_2").and_then(|s| s.link), None);
}

#[test]
fn test_load_graph_rejects_malformed_json() {
    let mut editor = editor();
    assert!(editor.load_graph_json("{\"nodes\": 3}").is_err());
    assert!(editor.workflow().nodes.is_empty());
}

#[test]
fn test_workflow_round_trips_through_load() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 1);
    editor.connect(texts[0], 0, generator, "pool_1").unwrap();
    editor.settle();

    let saved = editor.workflow();
    let mut restored = common::editor();
    restored.load_graph(saved.clone());
    restored.settle();

    let node = restored.node(generator).unwrap();
    assert_eq!(node.input_names(), pool_names(2));
    assert_eq!(restored.workflow().nodes.len(), saved.nodes.len());
}

#[test]
fn test_empty_workflow_loads_nothing() {
    let mut editor = editor();
    assert!(editor.load_graph(Workflow::default()).is_empty());
    assert_eq!(editor.settle(), 0);
}

#[test]
fn test_configure_requests_reconciliation() {
    let mut editor = editor();
    let generator = editor.add_node(GENERATOR).unwrap();
    editor.settle();

    editor.configure(generator);
    assert!(editor.scheduler().is_pending(generator));
    assert_eq!(editor.settle(), 1);
}

#[test]
fn test_remove_node_cancels_and_forgets() {
    let mut editor = editor();
    let generator = editor.add_node(GENERATOR).unwrap();
    editor.settle();
    editor.configure(generator);
    assert!(editor.reconciler().templates().contains(generator));

    let removed = editor.remove_node(generator).unwrap();
    assert_eq!(removed.id, generator);
    assert!(!editor.scheduler().is_pending(generator));
    assert!(!editor.reconciler().templates().contains(generator));
    assert_eq!(editor.settle(), 0);
    assert!(editor.remove_node(generator).is_none());
}

#[test]
fn test_removed_source_clears_target_link() {
    let mut editor = editor();
    let (generator, texts) = generator_with_sources(&mut editor, 1);
    editor.connect(texts[0], 0, generator, "pool_1").unwrap();
    editor.settle();

    editor.remove_node(texts[0]);
    editor.configure(generator);
    editor.settle();

    let node = editor.node(generator).unwrap();
    assert_eq!(node.input_names(), pool_names(1));
    assert_eq!(editor.graph().link_count(), 0);
}

#[test]
fn test_lifecycle_event_display() {
    let event = LifecycleEvent::ConnectionsChanged {
        kind: ConnectionKind::Input,
        slot: 2,
        connected: false,
    };
    assert_eq!(event.to_string(), "input 2 disconnected");
    assert_eq!(LifecycleEvent::GraphLoaded.to_string(), "graph loaded");
}
