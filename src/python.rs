use crate::combinator::{
    CombinatorInputs, ExhaustivePromptCombinator, GeneratedCombinations, PoolInputs,
    PromptCombinationGenerator, mixed_radix_indices, total_combinations,
};
use crate::queue::ChangeToken;
use crate::signal::LogSink;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

impl<'py> IntoPyObject<'py> for GeneratedCombinations {
    type Target = PyDict;
    type Output = Bound<'py, Self::Target>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> Result<Self::Output, Self::Error> {
        let dict = PyDict::new(py);
        dict.set_item("combo_list", self.combinations)?;
        dict.set_item("total_count", self.total)?;
        dict.set_item("config_hash", self.config_hash)?;
        Ok(dict)
    }
}

/// Expands a template into every combination of its pools.
///
/// Templates reference pools through `[n]` anchors; `[1]` takes entries from pool 1.
/// Each pool is a multi-line string with one entry per non-blank line.
#[pyclass(name = "PromptCombinationGenerator")]
struct PromptCombinationGeneratorPy {
    generator: PromptCombinationGenerator,
}

#[pymethods]
impl PromptCombinationGeneratorPy {
    #[new]
    #[pyo3(signature = (max_pools = 15))]
    fn new(max_pools: usize) -> Self {
        Self {
            generator: PromptCombinationGenerator::new(max_pools),
        }
    }

    /// Generates the full cartesian product.
    ///
    /// Args:
    ///     template_text (str): Template containing `[n]` anchors.
    ///     pools (dict[int, str]): Pool texts keyed by pool number.
    ///
    /// Returns:
    ///     dict: `combo_list` (list[str]), `total_count` (int) and `config_hash` (str).
    ///
    /// Raises:
    ///     ValueError: If an anchor refers to a missing or empty pool.
    fn execute(&self, template_text: &str, pools: PoolInputs) -> PyResult<GeneratedCombinations> {
        self.generator
            .execute(template_text, &pools)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

/// Walks the combinations of a template one per call, persisting its position.
#[pyclass(name = "ExhaustivePromptCombinator", unsendable)]
struct ExhaustivePromptCombinatorPy {
    combinator: ExhaustivePromptCombinator,
}

#[pymethods]
impl ExhaustivePromptCombinatorPy {
    #[new]
    #[pyo3(signature = (state_path, max_pools = 15))]
    fn new(state_path: &str, max_pools: u32) -> Self {
        Self {
            combinator: ExhaustivePromptCombinator::new(
                state_path,
                Arc::new(LogSink),
                max_pools,
            ),
        }
    }

    /// Produces the combination at the stored index and advances it.
    ///
    /// Returns:
    ///     tuple[str, str]: The prompt and a progress log.
    #[pyo3(signature = (template_text, pools, start_index = 0, max_combinations = 0, auto_queue = true, node_id = None))]
    fn execute(
        &mut self,
        template_text: &str,
        pools: PoolInputs,
        start_index: u64,
        max_combinations: u64,
        auto_queue: bool,
        node_id: Option<String>,
    ) -> (String, String) {
        let inputs = CombinatorInputs {
            template_text: template_text.to_string(),
            start_index,
            max_combinations,
            auto_queue,
            pools,
            node_id,
        };
        let output = self.combinator.execute(&inputs);
        (output.prompt, output.log)
    }

    /// `float("nan")` when the host must always re-run the node, else `0.0`.
    fn is_changed(&self, auto_queue: bool) -> f64 {
        match self.combinator.is_changed(auto_queue) {
            ChangeToken::Always => f64::NAN,
            _ => 0.0,
        }
    }
}

#[pyfunction(name = "total_combinations")]
fn total_combinations_py(pool_sizes: Vec<usize>) -> u64 {
    total_combinations(&pool_sizes)
}

#[pyfunction(name = "mixed_radix_indices")]
fn mixed_radix_indices_py(global_index: u64, pool_sizes: Vec<usize>) -> Vec<usize> {
    mixed_radix_indices(global_index, &pool_sizes)
}

/// Prompt combination backends for node-graph workflows.
#[pymodule]
fn exhaustive(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PromptCombinationGeneratorPy>()?;
    m.add_class::<ExhaustivePromptCombinatorPy>()?;
    m.add_function(wrap_pyfunction!(total_combinations_py, m)?)?;
    m.add_function(wrap_pyfunction!(mixed_radix_indices_py, m)?)?;
    Ok(())
}
