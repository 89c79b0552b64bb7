use super::event::LifecycleEvent;
use super::scheduler::DeferredScheduler;
use crate::graph::{HostNode, NodeId};

/// Capabilities handed to listeners while an event is being dispatched.
pub struct HookContext<'a> {
    scheduler: &'a mut DeferredScheduler,
}

impl<'a> HookContext<'a> {
    pub fn new(scheduler: &'a mut DeferredScheduler) -> Self {
        Self { scheduler }
    }

    /// Asks for `node` to be reconciled once the host has finished the current mutation.
    pub fn request_reconcile(&mut self, node: NodeId) {
        self.scheduler.request(node);
    }
}

/// A participant in a node type's lifecycle.
///
/// Listeners are invoked in registration order; none of them can stop the chain or
/// observe another listener's failures.
pub trait NodeListener {
    fn name(&self) -> &str;

    fn on_event(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        ctx: &mut HookContext<'_>,
    );
}

/// Adapts a closure into a listener, typically the host's own callback for a node type.
pub struct FnListener<F> {
    name: String,
    callback: F,
}

impl<F> FnListener<F>
where
    F: FnMut(&mut dyn HostNode, &LifecycleEvent),
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> NodeListener for FnListener<F>
where
    F: FnMut(&mut dyn HostNode, &LifecycleEvent),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        _ctx: &mut HookContext<'_>,
    ) {
        (self.callback)(node, event);
    }
}

/// Ordered list of listeners attached to one node type.
#[derive(Default)]
pub struct ListenerChain {
    listeners: Vec<Box<dyn NodeListener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listener: Box<dyn NodeListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn dispatch(
        &mut self,
        node: &mut dyn HostNode,
        event: &LifecycleEvent,
        ctx: &mut HookContext<'_>,
    ) {
        for listener in &mut self.listeners {
            listener.on_event(node, event, ctx);
        }
    }
}

impl std::fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
