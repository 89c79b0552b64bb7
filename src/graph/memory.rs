use super::definition::NodeDefinition;
use super::node::{HostGraph, HostNode, NodeId, Size};
use super::slot::{LinkId, Slot};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

const NODE_WIDTH: f32 = 320.0;
const TITLE_HEIGHT: f32 = 30.0;
const SLOT_HEIGHT: f32 = 20.0;

/// An in-memory node, standing in for the editor's own node object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub inputs: Vec<Slot>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub widgets: AHashMap<String, serde_json::Value>,
    #[serde(default)]
    pub size: Size,
    /// Number of redraw requests received since creation.
    #[serde(skip)]
    pub redraws: usize,
    #[serde(skip)]
    attached: bool,
}

impl GraphNode {
    pub fn new(id: NodeId, definition: &NodeDefinition) -> Self {
        let mut node = Self {
            id,
            node_type: definition.name.clone(),
            inputs: definition.initial_slots(),
            outputs: definition.outputs.clone(),
            widgets: definition
                .widgets
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            size: Size::default(),
            redraws: 0,
            attached: false,
        };
        if let Some(size) = node.compute_size() {
            node.size = size;
        }
        node
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Names of the current input slots, in order.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn input(&self, name: &str) -> Option<&Slot> {
        self.inputs.iter().find(|s| s.name == name)
    }
}

impl HostNode for GraphNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn inputs(&self) -> &[Slot] {
        &self.inputs
    }

    fn set_inputs(&mut self, inputs: Vec<Slot>) {
        self.inputs = inputs;
    }

    fn compute_size(&self) -> Option<Size> {
        let rows = self.inputs.len().max(self.outputs.len()).max(1);
        Some(Size {
            width: NODE_WIDTH,
            height: TITLE_HEIGHT + SLOT_HEIGHT * rows as f32,
        })
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn set_dirty_canvas(&mut self, foreground: bool, background: bool) -> bool {
        if !self.attached {
            return false;
        }
        if foreground || background {
            self.redraws += 1;
        }
        true
    }

    fn set_widget_value(&mut self, widget: &str, value: &serde_json::Value) -> bool {
        match self.widgets.get_mut(widget) {
            Some(slot) => {
                *slot = value.clone();
                true
            }
            None => false,
        }
    }
}

/// A connection from an output of one node to a named input of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub origin: NodeId,
    pub origin_slot: usize,
    pub target: NodeId,
    pub target_input: String,
}

/// Minimal host graph: owns nodes and links and keeps slot `link` fields in sync.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: AHashMap<NodeId, GraphNode>,
    links: AHashMap<LinkId, Link>,
    next_node_id: u64,
    next_link_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, definition: &NodeDefinition) -> NodeId {
        self.next_node_id += 1;
        let id = NodeId(self.next_node_id);
        let mut node = GraphNode::new(id, definition);
        node.attached = true;
        self.nodes.insert(id, node);
        id
    }

    /// Inserts a previously serialized node as-is, keeping its id and slot links.
    pub fn insert_node(&mut self, mut node: GraphNode) -> NodeId {
        let id = node.id;
        node.attached = true;
        self.next_node_id = self.next_node_id.max(id.0);
        for slot in &node.inputs {
            if let Some(link) = slot.link {
                self.next_link_id = self.next_link_id.max(link.0);
            }
        }
        self.nodes.insert(id, node);
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
        let mut node = self.nodes.remove(&id)?;
        let dangling: Vec<LinkId> = self
            .links
            .values()
            .filter(|l| l.origin == id || l.target == id)
            .map(|l| l.id)
            .collect();
        for link_id in dangling {
            if let Some(link) = self.links.remove(&link_id) {
                if let Some(target) = self.nodes.get_mut(&link.target) {
                    clear_link(target, link_id);
                }
            }
        }
        node.attached = false;
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Connects `origin`'s output `origin_slot` to the input named `target_input`.
    ///
    /// Returns the new link and, if the input was already connected, the link it replaced.
    /// Returns `None` when either end does not exist.
    pub fn connect(
        &mut self,
        origin: NodeId,
        origin_slot: usize,
        target: NodeId,
        target_input: &str,
    ) -> Option<(LinkId, Option<LinkId>)> {
        let origin_ok = self
            .nodes
            .get(&origin)
            .is_some_and(|n| origin_slot < n.outputs.len());
        if !origin_ok {
            return None;
        }
        let target_node = self.nodes.get_mut(&target)?;
        let slot = target_node
            .inputs
            .iter_mut()
            .find(|s| s.name == target_input)?;

        self.next_link_id += 1;
        let id = LinkId(self.next_link_id);
        let replaced = slot.link.replace(id);
        if let Some(old) = replaced {
            self.links.remove(&old);
        }
        self.links.insert(
            id,
            Link {
                id,
                origin,
                origin_slot,
                target,
                target_input: target_input.to_string(),
            },
        );
        Some((id, replaced))
    }

    /// Removes whatever link feeds `target_input` on `target`.
    ///
    /// Slots restored through [`Graph::insert_node`] may carry links the graph has no
    /// record of; those are cleared all the same.
    pub fn disconnect_input(&mut self, target: NodeId, target_input: &str) -> Option<LinkId> {
        let node = self.nodes.get_mut(&target)?;
        let slot = node.inputs.iter_mut().find(|s| s.name == target_input)?;
        let id = slot.link.take()?;
        self.links.remove(&id);
        Some(id)
    }
}

impl HostGraph for Graph {
    fn lookup_mut(&mut self, id: NodeId) -> Option<&mut dyn HostNode> {
        self.nodes.get_mut(&id).map(|n| n as &mut dyn HostNode)
    }
}

fn clear_link(node: &mut GraphNode, link: LinkId) {
    for slot in node.inputs.iter_mut().filter(|s| s.link == Some(link)) {
        slot.link = None;
    }
}
