use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Inputs that never invalidate a running walk.
pub const VOLATILE_INPUTS: [&str; 3] = ["start_index", "auto_queue", "extra_pnginfo"];

/// Digest of node inputs used to detect a changed configuration.
///
/// With `include_keys` only those keys take part (a missing key counts as `""`).
/// Without it every key except [`VOLATILE_INPUTS`] does. Entries are rendered as
/// `key:value`, sorted by key and joined with `|` before hashing.
pub fn calculate_input_hash(
    inputs: &BTreeMap<String, String>,
    include_keys: Option<&[&str]>,
) -> String {
    let selected: BTreeMap<&str, &str> = match include_keys {
        Some(keys) if !keys.is_empty() => keys
            .iter()
            .map(|&key| (key, inputs.get(key).map_or("", String::as_str)))
            .collect(),
        _ => inputs
            .iter()
            .filter(|(key, _)| !VOLATILE_INPUTS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect(),
    };

    let data = selected
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join("|");

    hex::encode(Sha256::digest(data.as_bytes()))
}

