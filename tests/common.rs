//! Common test utilities: editors, pool nodes and stub hosts.
use exhaustive::combinator::PoolInputs;
use exhaustive::config::Config;
use exhaustive::editor::Editor;
use exhaustive::graph::{GraphNode, HostNode, LinkId, NodeDefinition, NodeId, Slot};

#[allow(dead_code)]
pub const GENERATOR: &str = "PromptCombinationGenerator";
#[allow(dead_code)]
pub const TEXT: &str = "MultiLineTextInput";

/// An editor session with the stock extensions and node types.
#[allow(dead_code)]
pub fn editor() -> Editor {
    Editor::new(&Config::default()).expect("Failed to create editor")
}

/// Adds a generator plus `sources` text nodes and lets the creation reconciliations run.
#[allow(dead_code)]
pub fn generator_with_sources(editor: &mut Editor, sources: usize) -> (NodeId, Vec<NodeId>) {
    let generator = editor.add_node(GENERATOR).expect("generator type is registered");
    let texts = (0..sources)
        .map(|_| editor.add_node(TEXT).expect("text type is registered"))
        .collect();
    editor.settle();
    (generator, texts)
}

/// A detached generator node with all fifteen pool slots, as first created.
#[allow(dead_code)]
pub fn generator_node() -> GraphNode {
    let definition =
        NodeDefinition::prompt_combination_generator(GENERATOR, "pool_", "STRING", 15);
    GraphNode::new(NodeId(1), &definition)
}

/// Connects the named slot by giving it a link id directly.
#[allow(dead_code)]
pub fn link(node: &mut dyn HostNode, slot: &str, id: u64) {
    set_link(node, slot, Some(LinkId(id)));
}

#[allow(dead_code)]
pub fn unlink(node: &mut dyn HostNode, slot: &str) {
    set_link(node, slot, None);
}

fn set_link(node: &mut dyn HostNode, slot: &str, link: Option<LinkId>) {
    let mut inputs = node.inputs().to_vec();
    let target = inputs
        .iter_mut()
        .find(|s| s.name == slot)
        .unwrap_or_else(|| panic!("node has no slot named {}", slot));
    target.link = link;
    node.set_inputs(inputs);
}

#[allow(dead_code)]
pub fn input_names(node: &dyn HostNode) -> Vec<String> {
    node.inputs().iter().map(|s| s.name.clone()).collect()
}

/// `pool_1..pool_n`.
#[allow(dead_code)]
pub fn pool_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("pool_{}", i)).collect()
}

#[allow(dead_code)]
pub fn pools(entries: &[(u32, &str)]) -> PoolInputs {
    entries
        .iter()
        .map(|(number, text)| (*number, text.to_string()))
        .collect()
}

/// A host node that implements only the required hooks.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct BareNode {
    pub id: NodeId,
    pub node_type: String,
    pub inputs: Vec<Slot>,
}

#[allow(dead_code)]
impl BareNode {
    pub fn new(id: u64, names: &[&str]) -> Self {
        let inputs = names
            .iter()
            .enumerate()
            .map(|(i, name)| Slot {
                slot_index: i,
                ..Slot::new(*name, "STRING")
            })
            .collect();
        Self {
            id: NodeId(id),
            node_type: GENERATOR.to_string(),
            inputs,
        }
    }
}

impl HostNode for BareNode {
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
}
