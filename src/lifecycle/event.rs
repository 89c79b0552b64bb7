use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a node a connection change happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Input,
    Output,
}

/// Notifications the host emits over a node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Created,
    ConnectionsChanged {
        kind: ConnectionKind,
        slot: usize,
        connected: bool,
    },
    /// The node was deserialized from saved workflow state.
    Configured,
    GraphLoaded,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Created => write!(f, "created"),
            LifecycleEvent::ConnectionsChanged {
                kind,
                slot,
                connected,
            } => {
                let side = match kind {
                    ConnectionKind::Input => "input",
                    ConnectionKind::Output => "output",
                };
                let action = if *connected { "connected" } else { "disconnected" };
                write!(f, "{} {} {}", side, slot, action)
            }
            LifecycleEvent::Configured => write!(f, "configured"),
            LifecycleEvent::GraphLoaded => write!(f, "graph loaded"),
        }
    }
}
