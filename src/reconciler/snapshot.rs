use crate::graph::{LinkId, Slot, SlotPattern};
use ahash::AHashMap;

/// Links held by the pool slots just before a rebuild, keyed by slot name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    links: AHashMap<String, LinkId>,
}

impl ConnectionSnapshot {
    pub fn capture(inputs: &[Slot], pattern: &SlotPattern) -> Self {
        let links = inputs
            .iter()
            .filter(|slot| pattern.contains(&slot.name))
            .filter_map(|slot| slot.link.map(|link| (slot.name.clone(), link)))
            .collect();
        Self { links }
    }

    pub fn link_for(&self, name: &str) -> Option<LinkId> {
        self.links.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
