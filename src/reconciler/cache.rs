use crate::graph::{NodeId, Slot};
use ahash::AHashMap;

/// Side-table of the pool slots each node had when the reconciler first saw it.
///
/// An entry is written once and then returned unchanged for the node's lifetime, even if
/// the host later redefines the node's slots. Only [`TemplateCache::forget`] removes it.
#[derive(Debug, Default, Clone)]
pub struct TemplateCache {
    entries: AHashMap<NodeId, Vec<Slot>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached template for `node`, running `capture` only on first access.
    pub fn get_or_capture<F>(&mut self, node: NodeId, capture: F) -> &[Slot]
    where
        F: FnOnce() -> Vec<Slot>,
    {
        self.entries.entry(node).or_insert_with(capture)
    }

    pub fn get(&self, node: NodeId) -> Option<&[Slot]> {
        self.entries.get(&node).map(Vec::as_slice)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn forget(&mut self, node: NodeId) -> bool {
        self.entries.remove(&node).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
