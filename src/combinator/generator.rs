use super::template::{PoolInputs, find_placeholders, parse_pool_text};
use crate::error::TemplateError;
use itertools::Itertools;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Output of one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCombinations {
    pub combinations: Vec<String>,
    pub total: u64,
    /// Digest of the template and every non-empty pool, for change detection downstream.
    pub config_hash: String,
}

/// Stateless generator of every prompt a template and its pools can produce.
#[derive(Debug, Clone)]
pub struct PromptCombinationGenerator {
    max_pools: u32,
}

impl PromptCombinationGenerator {
    pub fn new(max_pools: usize) -> Self {
        Self {
            max_pools: u32::try_from(max_pools).unwrap_or(u32::MAX),
        }
    }

    pub fn execute(
        &self,
        template: &str,
        pools: &PoolInputs,
    ) -> Result<GeneratedCombinations, TemplateError> {
        let parsed = self.parse_pools(pools);
        validate_placeholders(template, &parsed)?;
        let config_hash = config_hash(template, &parsed);
        let combinations = generate(template, &parsed);
        let total = combinations.len() as u64;

        info!(
            pools = parsed.iter().filter(|p| !p.is_empty()).count(),
            total,
            config_hash = %config_hash,
            "combinations generated"
        );
        Ok(GeneratedCombinations {
            combinations,
            total,
            config_hash,
        })
    }

    /// Pools `1..=N` in order, where `N` is the last pool with any entries.
    ///
    /// Pools that were not supplied keep their place as empty pools so that `[n]` always
    /// refers to `pool_n`.
    pub fn parse_pools(&self, pools: &PoolInputs) -> Vec<Vec<String>> {
        let mut parsed: Vec<Vec<String>> = (1..=self.max_pools)
            .map(|i| pools.get(&i).map(|text| parse_pool_text(text)).unwrap_or_default())
            .collect();
        while parsed.last().is_some_and(Vec::is_empty) {
            parsed.pop();
        }
        debug!(pools = parsed.len(), "pool inputs parsed");
        parsed
    }
}

impl Default for PromptCombinationGenerator {
    fn default() -> Self {
        Self::new(15)
    }
}

fn validate_placeholders(template: &str, parsed: &[Vec<String>]) -> Result<(), TemplateError> {
    for anchor in find_placeholders(template) {
        let index = (anchor - 1) as usize;
        match parsed.get(index) {
            None => {
                return Err(TemplateError::MissingPool {
                    anchor,
                    supplied: parsed.len(),
                });
            }
            Some(pool) if pool.is_empty() => return Err(TemplateError::EmptyPool { anchor }),
            Some(_) => {}
        }
    }
    Ok(())
}

/// SHA-256 over `template` followed by `|POOL_<n>:<entries joined by ','>` for every
/// non-empty pool.
pub fn config_hash(template: &str, parsed: &[Vec<String>]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    for (i, pool) in parsed.iter().enumerate() {
        if !pool.is_empty() {
            hasher.update(format!("|POOL_{}:{}", i + 1, pool.join(",")).as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// Cartesian product of the non-empty pools, with every occurrence of each placeholder
/// replaced. The last pool varies fastest.
fn generate(template: &str, parsed: &[Vec<String>]) -> Vec<String> {
    let active: Vec<(u32, &Vec<String>)> = parsed
        .iter()
        .enumerate()
        .filter(|(_, pool)| !pool.is_empty())
        .map(|(i, pool)| (i as u32 + 1, pool))
        .collect();

    if active.is_empty() {
        warn!("no non-empty pools; returning the template unchanged");
        return vec![template.to_string()];
    }

    active
        .iter()
        .map(|(_, pool)| pool.iter())
        .multi_cartesian_product()
        .map(|combo| {
            active
                .iter()
                .zip(combo)
                .fold(template.to_string(), |text, ((anchor, _), entry)| {
                    text.replace(&format!("[{}]", anchor), entry)
                })
        })
        .collect()
}
