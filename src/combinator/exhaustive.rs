use super::cartesian::mixed_radix_indices;
use super::template::{PoolInputs, TemplateProcessor};
use crate::queue::{AutoQueue, ChangeToken, START_INDEX_WIDGET};
use crate::signal::SignalSink;
use crate::state::StateManager;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const COMBINATOR_NAME: &str = "ExhaustivePromptCombinator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinatorInputs {
    pub template_text: String,
    /// Index to (re)start from; 0 means "keep going".
    pub start_index: u64,
    /// Caps the number of combinations; 0 means no cap.
    pub max_combinations: u64,
    pub auto_queue: bool,
    pub pools: PoolInputs,
    /// Editor node to send queue and widget signals to.
    pub node_id: Option<String>,
}

impl CombinatorInputs {
    pub fn new(template_text: impl Into<String>) -> Self {
        Self {
            template_text: template_text.into(),
            start_index: 0,
            max_combinations: 0,
            auto_queue: true,
            pools: PoolInputs::new(),
            node_id: None,
        }
    }

    pub fn with_pool(mut self, number: u32, text: impl Into<String>) -> Self {
        self.pools.insert(number, text.into());
        self
    }

    /// Inputs as the named values the state hash is computed over.
    pub fn as_named(&self, max_pools: u32) -> BTreeMap<String, String> {
        let mut named = BTreeMap::new();
        named.insert("template_text".to_string(), self.template_text.clone());
        named.insert("max_combinations".to_string(), self.max_combinations.to_string());
        named.insert("start_index".to_string(), self.start_index.to_string());
        named.insert("auto_queue".to_string(), self.auto_queue.to_string());
        for i in 1..=max_pools {
            let text = self.pools.get(&i).cloned().unwrap_or_default();
            named.insert(format!("pool_{}_text", i), text);
        }
        named
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinatorOutput {
    pub prompt: String,
    pub log: String,
}

/// Produces one combination per execution, remembering its position on disk.
pub struct ExhaustivePromptCombinator {
    processor: TemplateProcessor,
    state: StateManager,
    queue: AutoQueue,
    max_pools: u32,
}

impl ExhaustivePromptCombinator {
    pub fn new(
        state_path: impl Into<PathBuf>,
        sink: Arc<dyn SignalSink>,
        max_pools: u32,
    ) -> Self {
        Self {
            processor: TemplateProcessor::new(COMBINATOR_NAME),
            state: StateManager::open(state_path),
            queue: AutoQueue::new(COMBINATOR_NAME, sink),
            max_pools,
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn is_changed(&self, auto_queue: bool) -> ChangeToken {
        self.queue.check_change(auto_queue)
    }

    pub fn execute(&mut self, inputs: &CombinatorInputs) -> CombinatorOutput {
        let current_hash = self
            .state
            .calculate_input_hash(&inputs.as_named(self.max_pools), None);
        let start_index = inputs.start_index;

        let saved = self.state.state();
        debug!(
            index = saved.global_index,
            start_index,
            hash = %current_hash,
            last_hash = %saved.last_input_hash,
            "execution starting"
        );

        if current_hash != saved.last_input_hash {
            info!(index = start_index, "inputs changed, hard reset");
            self.state.update(|s| {
                s.advance_to(start_index);
                s.last_input_hash = current_hash;
            });
        } else if start_index != saved.global_index && start_index != 0 {
            info!(index = start_index, "start index changed, soft reset");
            self.state.update(|s| s.advance_to(start_index));
        }

        let current_index = self.state.state().global_index;
        let is_completed = self.state.state().is_completed;

        let validated = match self
            .processor
            .parse_and_validate(&inputs.template_text, &inputs.pools)
        {
            Ok(validated) => validated,
            Err(e) => {
                error!(error = %e, "template validation failed");
                return CombinatorOutput {
                    prompt: inputs.template_text.clone(),
                    log: e.to_string(),
                };
            }
        };

        let mut total = validated.total();
        if inputs.max_combinations > 0 && total > inputs.max_combinations {
            total = inputs.max_combinations;
        }
        debug!(sizes = ?validated.pool_sizes(), total, "combination space");

        if current_index >= total || is_completed {
            let log = format!(
                "[INFO] exhaustive combination finished or reached the limit of {}, stopping the loop",
                total
            );
            self.state.update(|s| s.complete());
            self.state.save_or_log();
            info!(total, "walk finished");
            return CombinatorOutput {
                prompt: inputs.template_text.clone(),
                log,
            };
        }

        let local_indices = mixed_radix_indices(current_index, &validated.pool_sizes());
        debug!(current_index, ?local_indices, "global index decomposed");
        let (prompt, details) = self.processor.replace_placeholders(
            &inputs.template_text,
            &validated,
            &local_indices,
        );

        let log = progress_log(current_index, total, is_completed, &details);

        self.queue.process_queue(
            current_index,
            total,
            inputs.auto_queue,
            inputs.node_id.as_deref(),
            &mut self.state,
            START_INDEX_WIDGET,
        );

        CombinatorOutput { prompt, log }
    }
}

fn progress_log(
    current_index: u64,
    total: u64,
    is_completed: bool,
    details: &[String],
) -> String {
    let percent = (current_index + 1) as f64 / total as f64 * 100.0;
    format!(
        "[Progress]: {} / {} ({:.2}%)\n\
         Current index: {}\n\
         Total combinations: {}\n\
         Completed: {}\n\
         [Combination details]:\n{}",
        current_index + 1,
        total,
        percent,
        current_index,
        total,
        is_completed,
        details.join("\n")
    )
}
