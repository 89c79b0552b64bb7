use crate::config::SchedulerConfig;
use crate::graph::{HostGraph, NodeId};
use crate::reconciler::{ReconcileOutcome, SlotReconciler};
use ahash::AHashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Defers reconciliations until the host has finished mutating its own slot state.
///
/// The host fires lifecycle events *before* its slot and link arrays reflect the change,
/// so a reconciliation is only allowed to run once `settle_delay` has elapsed since the
/// latest request for that node. A newer request for the same node replaces the older one
/// and pushes its due time back; since reconciliation is idempotent for a fixed connection
/// state, coalescing never changes the final slot list.
///
/// The delay is an assumption about host timing, not a guarantee the host makes. Hosts
/// that can tell when they are done should call [`DeferredScheduler::settle`] instead of
/// waiting.
#[derive(Debug, Clone)]
pub struct DeferredScheduler {
    delay: Duration,
    pending: AHashMap<NodeId, Instant>,
}

impl DeferredScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: AHashMap::new(),
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.settle_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn request(&mut self, node: NodeId) {
        let due = Instant::now() + self.delay;
        if self.pending.insert(node, due).is_some() {
            trace!(node_id = %node, "coalesced pending reconciliation");
        } else {
            trace!(
                node_id = %node,
                delay_ms = self.delay.as_millis() as u64,
                "reconciliation scheduled"
            );
        }
    }

    pub fn cancel(&mut self, node: NodeId) -> bool {
        self.pending.remove(&node).is_some()
    }

    pub fn is_pending(&self, node: NodeId) -> bool {
        self.pending.contains_key(&node)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Runs every request due at or before `now`, oldest first.
    ///
    /// Returns how many nodes had their slots rebuilt.
    pub fn poll<G>(
        &mut self,
        now: Instant,
        graph: &mut G,
        reconciler: &mut SlotReconciler,
    ) -> usize
    where
        G: HostGraph + ?Sized,
    {
        let mut due: Vec<(Instant, NodeId)> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(node, at)| (*at, *node))
            .collect();
        due.sort();
        for (_, node) in &due {
            self.pending.remove(node);
        }
        run_all(due.into_iter().map(|(_, node)| node), graph, reconciler)
    }

    /// Runs every pending request immediately, for hosts that signal when they are done.
    pub fn settle<G>(&mut self, graph: &mut G, reconciler: &mut SlotReconciler) -> usize
    where
        G: HostGraph + ?Sized,
    {
        let mut due: Vec<(Instant, NodeId)> =
            self.pending.drain().map(|(node, at)| (at, node)).collect();
        due.sort();
        run_all(due.into_iter().map(|(_, node)| node), graph, reconciler)
    }

    /// Sleeps until each pending request is due and runs it, until nothing is pending.
    pub async fn run_until_idle<G>(
        &mut self,
        graph: &mut G,
        reconciler: &mut SlotReconciler,
    ) -> usize
    where
        G: HostGraph + ?Sized,
    {
        let mut ran = 0;
        while let Some(due) = self.next_due() {
            tokio::time::sleep_until(due).await;
            ran += self.poll(Instant::now(), graph, reconciler);
        }
        ran
    }
}

impl Default for DeferredScheduler {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

fn run_all<G>(
    nodes: impl Iterator<Item = NodeId>,
    graph: &mut G,
    reconciler: &mut SlotReconciler,
) -> usize
where
    G: HostGraph + ?Sized,
{
    let mut ran = 0;
    for node_id in nodes {
        match graph.lookup_mut(node_id) {
            Some(node) => {
                if let ReconcileOutcome::Applied { .. } = reconciler.reconcile(node) {
                    ran += 1;
                }
            }
            None => debug!(%node_id, "node vanished before its reconciliation ran"),
        }
    }
    ran
}
