use super::slot::Slot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One declared input of a node definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default)]
    pub optional: bool,
}

/// Static description of a node type, as the backend advertises it to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub inputs: Vec<InputDefinition>,
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Widgets and their default values.
    #[serde(default)]
    pub widgets: BTreeMap<String, Value>,
}

impl NodeDefinition {
    /// The combination generator: a required template widget plus `max_pools` optional
    /// string pools, producing the combination list, its length and a config hash.
    pub fn prompt_combination_generator(
        node_type: &str,
        slot_prefix: &str,
        slot_type: &str,
        max_pools: usize,
    ) -> Self {
        let inputs = (1..=max_pools)
            .map(|i| InputDefinition {
                name: format!("{}{}", slot_prefix, i),
                input_type: slot_type.to_string(),
                optional: true,
            })
            .collect();
        Self {
            name: node_type.to_string(),
            display_name: Some("Prompt Combination Generator".to_string()),
            category: "SuperSuger/Efficiency".to_string(),
            inputs,
            outputs: vec!["LIST".to_string(), "INT".to_string(), "STRING".to_string()],
            widgets: BTreeMap::from([(
                "template_text".to_string(),
                Value::from("A photo of [1] with [2] style"),
            )]),
        }
    }

    /// The stateful combinator: one combination per execution over `pool_<i>_text` inputs.
    pub fn exhaustive_combinator(max_pools: usize) -> Self {
        let inputs = (1..=max_pools)
            .map(|i| InputDefinition {
                name: format!("pool_{}_text", i),
                input_type: "STRING".to_string(),
                optional: true,
            })
            .collect();
        Self {
            name: "ExhaustivePromptCombinator".to_string(),
            display_name: Some("Exhaustive Prompt Combinator".to_string()),
            category: "SuperSuger/Prompt".to_string(),
            inputs,
            outputs: vec!["STRING".to_string(), "STRING".to_string()],
            widgets: BTreeMap::from([
                ("template_text".to_string(), Value::from("a photo of [1] with [2]")),
                ("start_index".to_string(), Value::from(0)),
                ("max_combinations".to_string(), Value::from(0)),
                ("auto_queue".to_string(), Value::from(true)),
            ]),
        }
    }

    pub fn loop_controller() -> Self {
        let input = |name: &str, input_type: &str| InputDefinition {
            name: name.to_string(),
            input_type: input_type.to_string(),
            optional: false,
        };
        Self {
            name: "AutoQueueLoopController".to_string(),
            display_name: Some("Auto Queue Loop Controller".to_string()),
            category: "SuperSuger/Controller".to_string(),
            inputs: vec![
                input("COMBO_LIST", "LIST"),
                input("TOTAL_COUNT", "INT"),
                input("CONFIG_HASH", "STRING"),
            ],
            outputs: vec!["STRING".to_string(), "STRING".to_string()],
            widgets: BTreeMap::from([
                ("INDEX_MODE".to_string(), Value::from("Auto")),
                ("START_INDEX".to_string(), Value::from(0)),
                ("MAX_ITERATION_LIMIT".to_string(), Value::from(100)),
            ]),
        }
    }

    /// A plain multi-line text source with a single string output.
    pub fn text_input() -> Self {
        Self {
            name: "MultiLineTextInput".to_string(),
            display_name: Some("Multi-line Text".to_string()),
            category: "SuperSuger/Prompt".to_string(),
            inputs: Vec::new(),
            outputs: vec!["STRING".to_string()],
            widgets: BTreeMap::from([("text".to_string(), Value::from(""))]),
        }
    }

    /// Input slots a freshly created node of this type starts with.
    pub fn initial_slots(&self) -> Vec<Slot> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(index, input)| Slot {
                slot_index: index,
                ..Slot::new(input.name.clone(), input.input_type.clone())
            })
            .collect()
    }
}
