use super::ChangeToken;
use crate::signal::{Signal, SignalSink};
use crate::state::StateManager;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Widget that mirrors the next index back into the editor.
pub const START_INDEX_WIDGET: &str = "start_index";

/// Result of one [`AutoQueue::process_queue`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStep {
    /// The walk was already over; nothing was produced.
    pub completed: bool,
    pub next_index: u64,
    pub log: String,
}

/// Sends the queue and feedback signals on behalf of one node type.
#[derive(Clone)]
pub struct AutoQueue {
    node_name: String,
    sink: Arc<dyn SignalSink>,
}

impl AutoQueue {
    pub fn new(node_name: impl Into<String>, sink: Arc<dyn SignalSink>) -> Self {
        Self {
            node_name: node_name.into(),
            sink,
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Delivers `signal`. A failing sink is logged and otherwise ignored.
    pub fn send_signal(&self, signal: &Signal) {
        if let Some(node_id) = signal.node_id() {
            debug!(node = %self.node_name, event = signal.event_name(), node_id, "sending signal");
        }
        if let Err(e) = self.sink.send(signal) {
            error!(
                node = %self.node_name,
                event = signal.event_name(),
                error = %e,
                "failed to send signal"
            );
        }
    }

    /// Shows `value` in `widget_name` on the editor node. Does nothing without a node id.
    pub fn update_widget(&self, node_id: Option<&str>, widget_name: &str, value: Value) {
        let Some(node_id) = node_id.filter(|id| !id.is_empty()) else {
            return;
        };
        self.send_signal(&Signal::widget(node_id, widget_name, value));
    }

    pub fn report_progress(&self, node_id: &str, progress: u64, total: u64) {
        self.send_signal(&Signal::progress(node_id, progress, total));
    }

    /// Asks the editor to queue the workflow again and shows the index it will run with.
    pub fn add_to_queue(&self, node_id: Option<&str>, next_index: u64, widget_name: &str) {
        debug!(node = %self.node_name, next_index, "requesting the next queue item");
        self.send_signal(&Signal::add_queue(node_id));
        self.update_widget(node_id, widget_name, Value::from(next_index));
    }

    pub fn check_change(&self, auto_queue: bool) -> ChangeToken {
        if auto_queue {
            ChangeToken::Always
        } else {
            ChangeToken::Unchanged
        }
    }

    /// Advances the walk stored in `state` past `current_index` and saves it.
    ///
    /// When the walk is already over (index past `total_items` or completed) the state
    /// is rewound and the step reports `completed`. Processing the last item also
    /// rewinds, but the item itself counts as produced. The next item is queued only
    /// when `auto_queue` is set and more items remain.
    pub fn process_queue(
        &self,
        current_index: u64,
        total_items: u64,
        auto_queue: bool,
        node_id: Option<&str>,
        state: &mut StateManager,
        widget_name: &str,
    ) -> QueueStep {
        if current_index >= total_items || state.state().is_completed {
            let log = format!(
                "[{}] processing finished or reached the limit of {}, stopping the loop",
                self.node_name, total_items
            );
            state.update(|s| s.complete());
            state.save_or_log();
            info!(node = %self.node_name, total_items, "loop finished");
            return QueueStep {
                completed: true,
                next_index: 0,
                log,
            };
        }

        let is_last_item = current_index + 1 >= total_items;
        let next_index = if is_last_item {
            state.update(|s| s.complete());
            debug!(node = %self.node_name, "last item, index reset to 0");
            0
        } else {
            let next = current_index + 1;
            state.update(|s| s.advance_to(next));
            debug!(node = %self.node_name, from = current_index, to = next, "index advanced");
            next
        };
        state.save_or_log();

        if auto_queue && !is_last_item {
            self.add_to_queue(node_id, next_index, widget_name);
        } else {
            debug!(node = %self.node_name, "auto queue stopped");
        }

        QueueStep {
            completed: false,
            next_index,
            log: String::new(),
        }
    }
}
