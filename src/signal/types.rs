use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

pub const ADD_QUEUE_EVENT: &str = "exhaustive-add-queue";
pub const NODE_FEEDBACK_EVENT: &str = "exhaustive-node-feedback";

/// An event pushed from the backend to the editor UI.
///
/// On the wire this is `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Signal {
    /// Ask the UI to queue the workflow again.
    #[serde(rename = "exhaustive-add-queue")]
    AddQueue(AddQueue),
    /// Update something displayed on a node.
    #[serde(rename = "exhaustive-node-feedback")]
    NodeFeedback(NodeFeedback),
}

impl Signal {
    pub fn add_queue(node_id: Option<&str>) -> Self {
        Signal::AddQueue(AddQueue {
            node_id: node_id.map(str::to_string),
        })
    }

    pub fn widget(node_id: &str, widget_name: &str, value: Value) -> Self {
        Signal::NodeFeedback(NodeFeedback {
            node_id: node_id.to_string(),
            feedback: Feedback::Widget {
                widget_name: widget_name.to_string(),
                value_type: value_type_name(&value).to_string(),
                value,
            },
        })
    }

    pub fn progress(node_id: &str, progress: u64, total: u64) -> Self {
        Signal::NodeFeedback(NodeFeedback {
            node_id: node_id.to_string(),
            feedback: Feedback::Progress { progress, total },
        })
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Signal::AddQueue(_) => ADD_QUEUE_EVENT,
            Signal::NodeFeedback(_) => NODE_FEEDBACK_EVENT,
        }
    }

    /// The node the signal is addressed to, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Signal::AddQueue(data) => data.node_id.as_deref(),
            Signal::NodeFeedback(data) => Some(&data.node_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddQueue {
    #[serde(default, deserialize_with = "optional_node_id_from_wire")]
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFeedback {
    #[serde(deserialize_with = "node_id_from_wire")]
    pub node_id: String,
    #[serde(flatten)]
    pub feedback: Feedback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feedback {
    Widget {
        widget_name: String,
        #[serde(rename = "type")]
        value_type: String,
        value: Value,
    },
    Progress {
        progress: u64,
        total: u64,
    },
}

/// A node id as senders put it on the wire. Workflow ids arrive as numbers, so both
/// forms are read and kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNodeId {
    Text(String),
    Number(Number),
}

impl From<WireNodeId> for String {
    fn from(id: WireNodeId) -> Self {
        match id {
            WireNodeId::Text(text) => text,
            WireNodeId::Number(number) => number.to_string(),
        }
    }
}

fn node_id_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireNodeId::deserialize(deserializer).map(String::from)
}

fn optional_node_id_from_wire<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireNodeId>::deserialize(deserializer).map(|id| id.map(String::from))
}

/// Python-style type name carried next to widget values (`int`, `float`, `str`, ...).
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
