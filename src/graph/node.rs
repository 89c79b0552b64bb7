use super::slot::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier the host assigns to each node instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

/// Width and height of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// The surface of a host-owned node that the extensions are allowed to touch.
///
/// Only `id`, `node_type`, `inputs` and `set_inputs` are required. The remaining hooks
/// are optional on the host side; their default implementations do nothing, and callers
/// treat a missing hook as a silent no-op.
pub trait HostNode {
    fn id(&self) -> NodeId;

    fn node_type(&self) -> &str;

    fn inputs(&self) -> &[Slot];

    fn set_inputs(&mut self, inputs: Vec<Slot>);

    /// Size the node would need to fit its current slots, if the host can compute it.
    fn compute_size(&self) -> Option<Size> {
        None
    }

    fn set_size(&mut self, _size: Size) {}

    /// Marks the canvas for redraw. Returns `false` when the node is not attached to a
    /// canvas.
    fn set_dirty_canvas(&mut self, _foreground: bool, _background: bool) -> bool {
        false
    }

    /// Sets a widget's displayed value. Returns `false` when no such widget exists.
    fn set_widget_value(&mut self, _widget: &str, _value: &serde_json::Value) -> bool {
        false
    }
}

/// Lookup of nodes by id, as needed by deferred work that only remembers ids.
pub trait HostGraph {
    fn lookup_mut(&mut self, id: NodeId) -> Option<&mut dyn HostNode>;
}
