//! An embeddable editor session.
//!
//! [`Editor`] plays the part of the host: it owns an in-memory [`Graph`], fires the
//! lifecycle events a real editor would fire, and drives the deferred reconciliations
//! and signal handlers installed by the extensions.
use crate::config::Config;
use crate::error::{HostError, RegistryError};
use crate::graph::{Graph, GraphNode, HostGraph, HostNode, LinkId, NodeDefinition, NodeId};
use crate::lifecycle::{
    ConnectionKind, DeferredScheduler, DynamicPoolsExtension, Extension, ExtensionRegistry,
    HookContext, LifecycleEvent, NodeListener, NodeType,
};
use crate::reconciler::SlotReconciler;
use crate::signal::{QueueSignalsExtension, Signal, SignalHost, SignalRouter};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Submits the current workflow to the host's execution queue.
pub type Submitter = Box<dyn FnMut() -> Result<(), HostError>>;

/// A saved workflow: the nodes with their slots and links as last serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub nodes: Vec<GraphNode>,
}

/// The graph plus the host services signal handlers need.
pub struct Workspace {
    graph: Graph,
    submitter: Submitter,
    queued: usize,
    progress: AHashMap<String, (u64, u64)>,
}

impl Workspace {
    fn new() -> Self {
        Self {
            graph: Graph::new(),
            submitter: Box::new(|| Ok(())),
            queued: 0,
            progress: AHashMap::new(),
        }
    }
}

impl HostGraph for Workspace {
    fn lookup_mut(&mut self, id: NodeId) -> Option<&mut dyn HostNode> {
        self.graph.lookup_mut(id)
    }
}

impl SignalHost for Workspace {
    fn queue_prompt(&mut self) -> Result<(), HostError> {
        (self.submitter)()?;
        self.queued += 1;
        Ok(())
    }

    fn report_progress(&mut self, node_id: &str, progress: u64, total: u64) {
        debug!(node_id, progress, total, "progress reported");
        self.progress.insert(node_id.to_string(), (progress, total));
    }
}

pub struct Editor {
    workspace: Workspace,
    registry: ExtensionRegistry,
    scheduler: DeferredScheduler,
    reconciler: SlotReconciler,
    router: SignalRouter,
}

impl Editor {
    /// A session with the dynamic pools and queue signal extensions installed and the
    /// plugin's node types registered.
    pub fn new(config: &Config) -> Result<Self, RegistryError> {
        let mut editor = Self::bare(config);
        editor.register_extension(Box::new(DynamicPoolsExtension::new(
            config.reconciler.node_type.clone(),
        )))?;
        editor.register_extension(Box::new(QueueSignalsExtension))?;

        let rc = &config.reconciler;
        editor.register_node_def(NodeDefinition::prompt_combination_generator(
            &rc.node_type,
            &rc.slot_prefix,
            &rc.slot_type,
            rc.max_pools,
        ))?;
        editor.register_node_def(NodeDefinition::exhaustive_combinator(rc.max_pools))?;
        editor.register_node_def(NodeDefinition::loop_controller())?;
        editor.register_node_def(NodeDefinition::text_input())?;

        editor.setup();
        Ok(editor)
    }

    /// A session with no extensions and no node types.
    pub fn bare(config: &Config) -> Self {
        Self {
            workspace: Workspace::new(),
            registry: ExtensionRegistry::new(),
            scheduler: DeferredScheduler::from_config(&config.scheduler),
            reconciler: SlotReconciler::new(&config.reconciler),
            router: SignalRouter::new(),
        }
    }

    pub fn with_submitter<F>(mut self, submitter: F) -> Self
    where
        F: FnMut() -> Result<(), HostError> + 'static,
    {
        self.workspace.submitter = Box::new(submitter);
        self
    }

    pub fn register_extension(
        &mut self,
        extension: Box<dyn Extension>,
    ) -> Result<(), RegistryError> {
        self.registry.register(extension)
    }

    pub fn register_node_def(&mut self, definition: NodeDefinition) -> Result<(), RegistryError> {
        self.registry.register_node_def(definition).map(|_| ())
    }

    /// Registers a node type whose host behaviour runs before any extension listener.
    pub fn register_node_def_with_host(
        &mut self,
        definition: NodeDefinition,
        host: Box<dyn NodeListener>,
    ) -> Result<(), RegistryError> {
        let mut node_type = NodeType::new(definition);
        node_type.add_listener(host);
        self.registry.register_node_type(node_type).map(|_| ())
    }

    /// Lets every extension install its signal handlers.
    pub fn setup(&mut self) {
        self.registry.setup(&mut self.router);
    }

    pub fn add_node(&mut self, node_type: &str) -> Result<NodeId, HostError> {
        let definition = self
            .registry
            .node_type(node_type)
            .map(|t| t.definition.clone())
            .ok_or_else(|| HostError::UnknownNodeType(node_type.to_string()))?;
        let id = self.workspace.graph.add_node(&definition);
        debug!(node_id = %id, node_type, "node added");
        self.dispatch(id, &LifecycleEvent::Created);
        Ok(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
        let node = self.workspace.graph.remove_node(id)?;
        self.scheduler.cancel(id);
        self.reconciler.forget(id);
        debug!(node_id = %id, "node removed");
        Some(node)
    }

    /// Links `origin`'s output `origin_slot` to `target`'s input named `input`, notifying
    /// both ends (and the origin of a replaced link).
    pub fn connect(
        &mut self,
        origin: NodeId,
        origin_slot: usize,
        target: NodeId,
        input: &str,
    ) -> Option<LinkId> {
        let previous = self.link_feeding(target, input);
        let (link, replaced) = self
            .workspace
            .graph
            .connect(origin, origin_slot, target, input)?;
        let slot = self.input_position(target, input)?;

        if let (Some(_), Some((old_origin, old_slot))) = (replaced, previous) {
            self.notify(old_origin, ConnectionKind::Output, old_slot, false);
        }
        self.notify(origin, ConnectionKind::Output, origin_slot, true);
        self.notify(target, ConnectionKind::Input, slot, true);
        info!(%link, %origin, %target, input, "connected");
        Some(link)
    }

    pub fn disconnect(&mut self, target: NodeId, input: &str) -> Option<LinkId> {
        let origin = self.link_feeding(target, input);
        let slot = self.input_position(target, input)?;
        let link = self.workspace.graph.disconnect_input(target, input)?;

        if let Some((origin, origin_slot)) = origin {
            self.notify(origin, ConnectionKind::Output, origin_slot, false);
        }
        self.notify(target, ConnectionKind::Input, slot, false);
        info!(%link, %target, input, "disconnected");
        Some(link)
    }

    /// Restores a saved workflow: every node is configured, then the graph-loaded hooks
    /// run once all nodes are present.
    pub fn load_graph(&mut self, workflow: Workflow) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(workflow.nodes.len());
        for node in workflow.nodes {
            let id = self.workspace.graph.insert_node(node);
            self.dispatch(id, &LifecycleEvent::Configured);
            ids.push(id);
        }
        for &id in &ids {
            self.dispatch(id, &LifecycleEvent::GraphLoaded);
            if let Some(node) = self.workspace.graph.lookup_mut(id) {
                let mut ctx = HookContext::new(&mut self.scheduler);
                self.registry.graph_loaded(node, &mut ctx);
            }
        }
        info!(nodes = ids.len(), "workflow loaded");
        ids
    }

    pub fn load_graph_json(&mut self, json: &str) -> Result<Vec<NodeId>, serde_json::Error> {
        let workflow: Workflow = serde_json::from_str(json)?;
        Ok(self.load_graph(workflow))
    }

    pub fn workflow(&self) -> Workflow {
        let mut nodes: Vec<GraphNode> = self.workspace.graph.nodes().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        Workflow { nodes }
    }

    /// Re-fires the configure hook, as the host does when a node's state is reapplied.
    pub fn configure(&mut self, id: NodeId) {
        self.dispatch(id, &LifecycleEvent::Configured);
    }

    pub fn poll(&mut self, now: Instant) -> usize {
        self.scheduler
            .poll(now, &mut self.workspace, &mut self.reconciler)
    }

    pub fn settle(&mut self) -> usize {
        self.scheduler.settle(&mut self.workspace, &mut self.reconciler)
    }

    pub async fn run_until_idle(&mut self) -> usize {
        self.scheduler
            .run_until_idle(&mut self.workspace, &mut self.reconciler)
            .await
    }

    pub fn handle_signal(&mut self, signal: &Signal) -> usize {
        self.router.dispatch(signal, &mut self.workspace)
    }

    pub fn handle_signal_json(&mut self, message: &str) -> usize {
        self.router.dispatch_json(message, &mut self.workspace)
    }

    pub fn drain_signals(&mut self, rx: &mut UnboundedReceiver<Signal>) -> usize {
        self.router.drain(rx, &mut self.workspace)
    }

    pub fn graph(&self) -> &Graph {
        &self.workspace.graph
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.workspace.graph.node(id)
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &DeferredScheduler {
        &self.scheduler
    }

    pub fn reconciler(&self) -> &SlotReconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut SlotReconciler {
        &mut self.reconciler
    }

    /// How many times the queue was successfully submitted.
    pub fn queued(&self) -> usize {
        self.workspace.queued
    }

    pub fn progress(&self, node_id: &str) -> Option<(u64, u64)> {
        self.workspace.progress.get(node_id).copied()
    }

    fn dispatch(&mut self, id: NodeId, event: &LifecycleEvent) {
        let Some(node) = self.workspace.graph.lookup_mut(id) else {
            warn!(node_id = %id, %event, "event for a node that is not in the graph");
            return;
        };
        let mut ctx = HookContext::new(&mut self.scheduler);
        self.registry.dispatch(node, event, &mut ctx);
    }

    fn notify(&mut self, id: NodeId, kind: ConnectionKind, slot: usize, connected: bool) {
        let event = LifecycleEvent::ConnectionsChanged {
            kind,
            slot,
            connected,
        };
        self.dispatch(id, &event);
    }

    fn input_position(&self, target: NodeId, input: &str) -> Option<usize> {
        self.workspace
            .graph
            .node(target)?
            .inputs
            .iter()
            .position(|s| s.name == input)
    }

    fn link_feeding(&self, target: NodeId, input: &str) -> Option<(NodeId, usize)> {
        let graph = &self.workspace.graph;
        let link = graph.node(target)?.input(input)?.link?;
        graph.link(link).map(|l| (l.origin, l.origin_slot))
    }
}
