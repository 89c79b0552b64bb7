use super::event::LifecycleEvent;
use super::listener::{HookContext, ListenerChain, NodeListener};
use crate::error::RegistryError;
use crate::graph::{HostNode, NodeDefinition};
use crate::signal::SignalRouter;
use ahash::AHashMap;
use tracing::{debug, info};

/// A registered node type: its definition plus the listeners attached to it.
#[derive(Debug)]
pub struct NodeType {
    pub definition: NodeDefinition,
    pub listeners: ListenerChain,
}

impl NodeType {
    pub fn new(definition: NodeDefinition) -> Self {
        Self {
            definition,
            listeners: ListenerChain::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn add_listener(&mut self, listener: Box<dyn NodeListener>) {
        self.listeners.push(listener);
    }
}

/// A UI extension, registered once per editor session.
///
/// Every hook has an empty default; an extension only overrides the ones it needs.
pub trait Extension {
    fn name(&self) -> &str;

    /// Called once for every node type as it is registered, before any instance exists.
    fn before_register_node_def(&mut self, _node_type: &mut NodeType) {}

    /// Called for every node of a workflow after the whole graph has been loaded.
    fn loaded_graph_node(&mut self, _node: &mut dyn HostNode, _ctx: &mut HookContext<'_>) {}

    /// Called once after all extensions are registered.
    fn setup(&mut self, _router: &mut SignalRouter) {}
}

/// Dispatches editor lifecycle hooks to extensions and node-type listeners.
///
/// Extensions must be registered before the node definitions they want to observe; a
/// node type only receives listeners from extensions present at its registration.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Box<dyn Extension>>,
    node_types: AHashMap<String, NodeType>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<(), RegistryError> {
        if self.extensions.iter().any(|e| e.name() == extension.name()) {
            return Err(RegistryError::DuplicateExtension(
                extension.name().to_string(),
            ));
        }
        info!(extension = extension.name(), "extension registered");
        self.extensions.push(extension);
        Ok(())
    }

    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn register_node_def(
        &mut self,
        definition: NodeDefinition,
    ) -> Result<&NodeType, RegistryError> {
        self.register_node_type(NodeType::new(definition))
    }

    /// Registers a node type that may already carry the host's own listeners; extension
    /// listeners are appended after them.
    pub fn register_node_type(
        &mut self,
        mut node_type: NodeType,
    ) -> Result<&NodeType, RegistryError> {
        if self.node_types.contains_key(node_type.name()) {
            return Err(RegistryError::DuplicateNodeType(
                node_type.name().to_string(),
            ));
        }
        for extension in &mut self.extensions {
            extension.before_register_node_def(&mut node_type);
        }
        debug!(
            node_type = node_type.name(),
            listeners = node_type.listeners.len(),
            "node type registered"
        );
        let name = node_type.name().to_string();
        Ok(self.node_types.entry(name).or_insert(node_type))
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.node_types.get(name)
    }

    pub fn node_type_mut(&mut self, name: &str) -> Option<&mut NodeType> {
        self.node_types.get_mut(name)
    }

    /// Runs `event` through the listener chain of `node`'s type.
    pub fn dispatch(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        ctx: &mut HookContext<'_>,
    ) {
        match self.node_types.get_mut(node.node_type()) {
            Some(node_type) => node_type.listeners.dispatch(node, event, ctx),
            None => debug!(
                node_id = %node.id(),
                node_type = node.node_type(),
                %event,
                "event for unregistered node type ignored"
            ),
        }
    }

    pub fn node_created(&mut self, node: &mut dyn HostNode, ctx: &mut HookContext<'_>) {
        self.dispatch(node, &LifecycleEvent::Created, ctx);
    }

    pub fn configured(&mut self, node: &mut dyn HostNode, ctx: &mut HookContext<'_>) {
        self.dispatch(node, &LifecycleEvent::Configured, ctx);
    }

    pub fn connections_changed(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        ctx: &mut HookContext<'_>,
    ) {
        self.dispatch(node, event, ctx);
    }

    /// Offers a freshly loaded node to every extension.
    pub fn graph_loaded(&mut self, node: &mut dyn HostNode, ctx: &mut HookContext<'_>) {
        for extension in &mut self.extensions {
            extension.loaded_graph_node(node, ctx);
        }
    }

    pub fn setup(&mut self, router: &mut SignalRouter) {
        for extension in &mut self.extensions {
            extension.setup(router);
        }
    }
}
