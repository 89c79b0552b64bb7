use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a connection owned by the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// A single input connection point on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(rename = "type")]
    pub slot_type: String,
    #[serde(default)]
    pub link: Option<LinkId>,
    #[serde(default)]
    pub slot_index: usize,
}

impl Slot {
    pub fn new(name: impl Into<String>, slot_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot_type: slot_type.into(),
            link: None,
            slot_index: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}

/// Naming scheme of a homogeneous, numbered slot series such as `pool_1..pool_15`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPattern {
    prefix: String,
    max: usize,
}

impl SlotPattern {
    pub fn new(prefix: impl Into<String>, max: usize) -> Self {
        Self {
            prefix: prefix.into(),
            max,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns `i` when `name` is exactly `<prefix><i>` with `1 <= i <= max`.
    ///
    /// Names outside the range (for example `pool_0`, `pool_16` with a maximum of 15,
    /// or zero-padded `pool_01`) are not part of the series.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let digits = name.strip_prefix(self.prefix.as_str())?;
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let index: usize = digits.parse().ok()?;
        (1..=self.max).contains(&index).then_some(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn name_for(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index)
    }
}
