use std::collections::HashMap;

use parasol_hlfhe::Value;
use petgraph::stable_graph::NodeIndex;

use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
/// Maps each lowered graph node to the backend value it produced.
///
/// # Remarks
/// Entries are write-once. A registry belongs to a single lowering and must not be shared
/// between programs.
pub struct ValueRegistry {
    values: HashMap<NodeIndex, Value>,
}

impl ValueRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` lowered to `value`. Fails if `node` was already recorded.
    pub fn insert(&mut self, node: NodeIndex, value: Value) -> Result<()> {
        match self.values.entry(node) {
            std::collections::hash_map::Entry::Occupied(_) => Err(Error::AlreadyLowered(node)),
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    /// The value `node` lowered to.
    pub fn get(&self, node: NodeIndex) -> Result<Value> {
        self.values
            .get(&node)
            .copied()
            .ok_or(Error::MissingOperand(node))
    }

    /// Whether `node` has been lowered.
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.values.contains_key(&node)
    }

    /// The number of lowered nodes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been lowered yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
