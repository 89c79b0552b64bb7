use crate::config::ReconcilerConfig;
use crate::graph::{HostNode, NodeId, Slot, SlotPattern};
use tracing::{debug, warn};

mod cache;
mod snapshot;

pub use cache::TemplateCache;
pub use snapshot::ConnectionSnapshot;

/// What a call to [`SlotReconciler::reconcile`] did to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The slot list was rebuilt with `visible` pool slots.
    Applied { visible: usize },
    /// Nothing was changed because the node never had any pool slots.
    Skipped,
}

/// Keeps a node's numbered pool slots a contiguous prefix that ends one past the
/// highest connected slot.
///
/// The reconciler owns the per-node template side-table; host nodes are never
/// written to except through [`HostNode::set_inputs`] and the redraw hooks.
#[derive(Debug, Clone)]
pub struct SlotReconciler {
    pattern: SlotPattern,
    slot_type: String,
    templates: TemplateCache,
}

impl SlotReconciler {
    pub fn new(config: &ReconcilerConfig) -> Self {
        Self {
            pattern: SlotPattern::new(config.slot_prefix.clone(), config.max_pools),
            slot_type: config.slot_type.clone(),
            templates: TemplateCache::new(),
        }
    }

    pub fn pattern(&self) -> &SlotPattern {
        &self.pattern
    }

    pub fn max_pools(&self) -> usize {
        self.pattern.max()
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    pub fn is_connected<N: HostNode + ?Sized>(&self, node: &N, slot_name: &str) -> bool {
        node.inputs()
            .iter()
            .find(|slot| slot.name == slot_name)
            .is_some_and(Slot::is_connected)
    }

    /// Greatest `i` in `1..=max_pools` whose `pool_i` is connected, or 0.
    pub fn highest_connected_index<N: HostNode + ?Sized>(&self, node: &N) -> usize {
        let mut highest = 0;
        for index in 1..=self.pattern.max() {
            if self.is_connected(node, &self.pattern.name_for(index)) {
                highest = index;
            }
        }
        highest
    }

    /// Number of pool slots that should be visible given `node`'s connections.
    pub fn visible_count<N: HostNode + ?Sized>(&self, node: &N) -> usize {
        self.visible_for_highest(self.highest_connected_index(node))
    }

    fn visible_for_highest(&self, highest: usize) -> usize {
        if highest == 0 {
            1
        } else {
            (highest + 1).min(self.pattern.max())
        }
    }

    /// Template pool slots for `node`, captured on first use and frozen afterwards.
    pub fn capture_original_pool_slots<N: HostNode + ?Sized>(&mut self, node: &N) -> &[Slot] {
        let pattern = &self.pattern;
        self.templates.get_or_capture(node.id(), || {
            let mut pools: Vec<(usize, Slot)> = node
                .inputs()
                .iter()
                .filter_map(|slot| pattern.index_of(&slot.name).map(|i| (i, slot.clone())))
                .collect();
            pools.sort_by_key(|(index, _)| *index);
            pools.dedup_by_key(|(index, _)| *index);
            debug!(node_id = %node.id(), captured = pools.len(), "captured pool slot template");
            pools.into_iter().map(|(_, slot)| slot).collect()
        })
    }

    /// Drops the frozen template of a node the host has removed.
    pub fn forget(&mut self, node: NodeId) -> bool {
        self.templates.forget(node)
    }

    /// Discards `node`'s template so the next reconciliation captures a fresh one.
    ///
    /// Call this when the host hot-reloads the node definition; the cache is otherwise
    /// never refreshed.
    pub fn invalidate(&mut self, node: NodeId) -> bool {
        let existed = self.templates.forget(node);
        if existed {
            debug!(node_id = %node, "pool slot template invalidated");
        }
        existed
    }

    /// Rebuilds `node`'s inputs: non-pool slots first in their original order, then
    /// `pool_1..pool_k` from the template with their live links restored. Every slot's
    /// `slot_index` is its position in the rebuilt list.
    pub fn reconcile<N: HostNode + ?Sized>(&mut self, node: &mut N) -> ReconcileOutcome {
        let node_id = node.id();
        let template = self.capture_original_pool_slots(&*node).to_vec();
        let Some(shape) = template.first() else {
            warn!(%node_id, "no pool slot template; skipping reconciliation");
            return ReconcileOutcome::Skipped;
        };
        let fallback_type = if shape.slot_type.is_empty() {
            self.slot_type.clone()
        } else {
            shape.slot_type.clone()
        };

        let highest = self.highest_connected_index(&*node);
        let visible = self.visible_for_highest(highest);
        let snapshot = ConnectionSnapshot::capture(node.inputs(), &self.pattern);

        let mut rebuilt: Vec<Slot> = node
            .inputs()
            .iter()
            .filter(|slot| !self.pattern.contains(&slot.name))
            .enumerate()
            .map(|(position, slot)| Slot {
                slot_index: position,
                ..slot.clone()
            })
            .collect();

        for index in 1..=visible {
            let name = self.pattern.name_for(index);
            let mut slot = template
                .iter()
                .find(|slot| slot.name == name)
                .cloned()
                .unwrap_or_else(|| Slot::new(name.clone(), fallback_type.clone()));
            slot.link = snapshot.link_for(&name);
            slot.slot_index = rebuilt.len();
            rebuilt.push(slot);
        }

        debug!(
            %node_id,
            highest,
            visible,
            restored_links = snapshot.len(),
            "reconciled pool slots"
        );
        node.set_inputs(rebuilt);

        match node.compute_size() {
            Some(size) => node.set_size(size),
            None => debug!(%node_id, "host cannot compute node size"),
        }
        if !node.set_dirty_canvas(true, true) {
            debug!(%node_id, "node is not attached to a canvas; redraw skipped");
        }

        ReconcileOutcome::Applied { visible }
    }
}
