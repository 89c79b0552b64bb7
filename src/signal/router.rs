use super::types::{ADD_QUEUE_EVENT, Feedback, NODE_FEEDBACK_EVENT, Signal};
use crate::error::HostError;
use crate::graph::{HostGraph, NodeId};
use crate::lifecycle::Extension;
use ahash::AHashMap;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

pub const QUEUE_SIGNALS_EXTENSION: &str = "SuperSuger.AutoQueue";

/// What the UI side needs from its host to act on backend signals.
pub trait SignalHost: HostGraph {
    /// Submits the current workflow to the host's execution queue.
    fn queue_prompt(&mut self) -> Result<(), HostError>;

    fn report_progress(&mut self, _node_id: &str, _progress: u64, _total: u64) {}
}

type Handler = Box<dyn FnMut(&Signal, &mut dyn SignalHost)>;

/// Maps signal event names to the handlers interested in them.
#[derive(Default)]
pub struct SignalRouter {
    handlers: AHashMap<String, Vec<Handler>>,
}

impl SignalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: &str, handler: F)
    where
        F: FnMut(&Signal, &mut dyn SignalHost) + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.get(event).is_some_and(|h| !h.is_empty())
    }

    /// Runs every handler registered for the signal's event; returns how many ran.
    pub fn dispatch(&mut self, signal: &Signal, host: &mut dyn SignalHost) -> usize {
        let event = signal.event_name();
        let Some(handlers) = self.handlers.get_mut(event) else {
            debug!(event, "no handler for signal");
            return 0;
        };
        for handler in handlers.iter_mut() {
            handler(signal, &mut *host);
        }
        handlers.len()
    }

    /// Parses and dispatches one raw `{"event", "data"}` message. Malformed messages are
    /// logged and dropped.
    pub fn dispatch_json(&mut self, message: &str, host: &mut dyn SignalHost) -> usize {
        match serde_json::from_str::<Signal>(message) {
            Ok(signal) => self.dispatch(&signal, host),
            Err(e) => {
                warn!(error = %e, "dropping malformed signal");
                0
            }
        }
    }

    /// Dispatches everything currently buffered in `rx` without waiting.
    pub fn drain(
        &mut self,
        rx: &mut UnboundedReceiver<Signal>,
        host: &mut dyn SignalHost,
    ) -> usize {
        let mut received = 0;
        while let Ok(signal) = rx.try_recv() {
            received += 1;
            self.dispatch(&signal, &mut *host);
        }
        received
    }
}

/// Reacts to the auto queue signals: re-queues work and mirrors feedback onto nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueSignalsExtension;

impl Extension for QueueSignalsExtension {
    fn name(&self) -> &str {
        QUEUE_SIGNALS_EXTENSION
    }

    fn setup(&mut self, router: &mut SignalRouter) {
        router.on(ADD_QUEUE_EVENT, handle_add_queue);
        router.on(NODE_FEEDBACK_EVENT, handle_feedback);
    }
}

fn handle_add_queue(signal: &Signal, host: &mut dyn SignalHost) {
    let node_id = signal.node_id().unwrap_or("unknown");
    match host.queue_prompt() {
        Ok(()) => info!(node_id, "next item queued"),
        // No retry; the next backend signal or the user has to trigger it again.
        Err(e) => error!(node_id, error = %e, "failed to queue next item"),
    }
}

fn handle_feedback(signal: &Signal, host: &mut dyn SignalHost) {
    let Signal::NodeFeedback(feedback) = signal else {
        return;
    };
    match &feedback.feedback {
        Feedback::Widget {
            widget_name, value, ..
        } => {
            let Ok(node_id) = feedback.node_id.parse::<NodeId>() else {
                warn!(node_id = %feedback.node_id, "feedback for a non-numeric node id");
                return;
            };
            let Some(node) = host.lookup_mut(node_id) else {
                warn!(%node_id, "feedback for a node that is not in the graph");
                return;
            };
            if node.set_widget_value(widget_name, value) {
                debug!(%node_id, widget = %widget_name, %value, "widget updated");
            } else {
                warn!(%node_id, widget = %widget_name, "node has no such widget");
            }
        }
        Feedback::Progress { progress, total } => {
            host.report_progress(&feedback.node_id, *progress, *total);
        }
    }
}
