use super::event::LifecycleEvent;
use super::listener::{HookContext, NodeListener};
use super::registry::{Extension, NodeType};
use crate::graph::HostNode;
use tracing::debug;

pub const POOL_LISTENER_NAME: &str = "dynamic-pools";
pub const DYNAMIC_POOLS_EXTENSION: &str = "SuperSuger.DynamicPools";

/// Requests a deferred reconciliation for every lifecycle event of its node type.
///
/// Disconnections matter as much as connections: removing the highest connected pool
/// must shrink the visible prefix, so no event kind is filtered out.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoolSlotListener;

impl NodeListener for PoolSlotListener {
    fn name(&self) -> &str {
        POOL_LISTENER_NAME
    }

    fn on_event(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        ctx: &mut HookContext<'_>,
    ) {
        debug!(node_id = %node.id(), %event, "pool slots need reconciliation");
        ctx.request_reconcile(node.id());
    }
}

/// Installs [`PoolSlotListener`] on one designated node type.
#[derive(Debug, Clone)]
pub struct DynamicPoolsExtension {
    node_type: String,
}

impl DynamicPoolsExtension {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.node_type
    }
}

impl Extension for DynamicPoolsExtension {
    fn name(&self) -> &str {
        DYNAMIC_POOLS_EXTENSION
    }

    fn before_register_node_def(&mut self, node_type: &mut NodeType) {
        if node_type.name() == self.node_type {
            node_type.add_listener(Box::new(PoolSlotListener));
            debug!(node_type = node_type.name(), "dynamic pool slots enabled");
        }
    }

    fn loaded_graph_node(&mut self, node: &mut dyn HostNode, ctx: &mut HookContext<'_>) {
        if node.node_type() == self.node_type {
            ctx.request_reconcile(node.id());
        }
    }
}
