use super::cartesian::total_combinations;
use crate::error::TemplateError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("anchor pattern is a valid regex"));

/// Raw pool texts keyed by pool number (`1` for `pool_1`, ...).
pub type PoolInputs = BTreeMap<u32, String>;

/// Every `[n]` placeholder in `template`, in order of appearance, duplicates included.
///
/// `[0]` and numbers too large for `u32` are not placeholders.
pub fn find_placeholders(template: &str) -> Vec<u32> {
    ANCHOR
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .collect()
}

/// Distinct anchor numbers used by `template`, ascending.
pub fn extract_anchors(template: &str) -> Vec<u32> {
    find_placeholders(template)
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Splits pool text into entries: one per line, trimmed, blank lines dropped.
pub fn parse_pool_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The pools a template actually draws from, aligned with its anchors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedTemplate {
    /// `pools[i]` feeds anchor `anchors[i]`.
    pub pools: Vec<Vec<String>>,
    pub anchors: Vec<u32>,
}

impl ValidatedTemplate {
    pub fn pool_sizes(&self) -> Vec<usize> {
        self.pools.iter().map(Vec::len).collect()
    }

    pub fn total(&self) -> u64 {
        total_combinations(&self.pool_sizes())
    }
}

/// Validates templates against pools and substitutes the chosen entries.
#[derive(Debug, Clone)]
pub struct TemplateProcessor {
    node_name: String,
}

impl TemplateProcessor {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Collects the pool behind every anchor of `template`.
    ///
    /// Pools without an anchor are ignored. An anchored pool that is missing or has no
    /// entries is an error. A template without anchors yields no pools.
    pub fn parse_and_validate(
        &self,
        template: &str,
        pools: &PoolInputs,
    ) -> Result<ValidatedTemplate, TemplateError> {
        let anchors = extract_anchors(template);
        debug!(node = %self.node_name, ?anchors, "anchors found in template");

        let mut validated = ValidatedTemplate::default();
        for &anchor in &anchors {
            let entries = pools
                .get(&anchor)
                .map(|text| parse_pool_text(text))
                .unwrap_or_default();
            if entries.is_empty() {
                return Err(TemplateError::EmptyPool { anchor });
            }
            validated.pools.push(entries);
            validated.anchors.push(anchor);
        }

        debug!(
            node = %self.node_name,
            anchors = ?validated.anchors,
            sizes = ?validated.pool_sizes(),
            "template validated"
        );
        Ok(validated)
    }

    /// Replaces the first occurrence of each anchor with the entry picked by
    /// `local_indices`, returning the text and one detail line per anchor.
    pub fn replace_placeholders(
        &self,
        template: &str,
        validated: &ValidatedTemplate,
        local_indices: &[usize],
    ) -> (String, Vec<String>) {
        let mut text = template.to_string();
        let mut details = Vec::with_capacity(local_indices.len());

        for ((&local, pool), &anchor) in local_indices
            .iter()
            .zip(&validated.pools)
            .zip(&validated.anchors)
        {
            let Some(part) = pool.get(local) else {
                continue;
            };
            text = text.replacen(&format!("[{}]", anchor), part, 1);
            details.push(format!(
                "  - anchor [{}]: index {}/{} -> \"{}\"",
                anchor,
                local,
                pool.len(),
                part
            ));
        }

        (text, details)
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new("TemplateProcessor")
    }
}
