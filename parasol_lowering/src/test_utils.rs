//! Helpers for exercising converters outside of a full graph.

use parasol_hlfhe::{HlfheFunction, Value};
use petgraph::stable_graph::NodeIndex;

use crate::{
    DataType, IntermediateNode, LoweringCtx, LoweringOptions, Result, ValueDescriptor,
    ValueRegistry, lower_node, program::argument_type,
};

/// `EncryptedScalar<uint{w}>`
pub fn encrypted_uint(w: u32) -> ValueDescriptor {
    ValueDescriptor::encrypted_scalar(DataType::unsigned(w))
}

/// `EncryptedScalar<int{w}>`
pub fn encrypted_int(w: u32) -> ValueDescriptor {
    ValueDescriptor::encrypted_scalar(DataType::signed(w))
}

/// `ClearScalar<uint{w}>`
pub fn clear_uint(w: u32) -> ValueDescriptor {
    ValueDescriptor::clear_scalar(DataType::unsigned(w))
}

/// `ClearScalar<int{w}>`
pub fn clear_int(w: u32) -> ValueDescriptor {
    ValueDescriptor::clear_scalar(DataType::signed(w))
}

/// `EncryptedTensor<uint{w}, shape=[len]>`
pub fn encrypted_uint_vector(w: u32, len: usize) -> ValueDescriptor {
    ValueDescriptor::encrypted_tensor(DataType::unsigned(w), &[len])
}

/// `ClearTensor<uint{w}, shape=[len]>`
pub fn clear_uint_vector(w: u32, len: usize) -> ValueDescriptor {
    ValueDescriptor::clear_tensor(DataType::unsigned(w), &[len])
}

/// Lowers individual nodes into a single function, handing out fresh node indices.
pub struct Harness {
    /// The function being emitted into.
    pub func: HlfheFunction,

    /// The values lowered so far.
    pub registry: ValueRegistry,

    /// The options passed to converters.
    pub options: LoweringOptions,

    next: usize,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(LoweringOptions::default())
    }
}

impl Harness {
    /// Create a harness with an empty function.
    pub fn new(options: LoweringOptions) -> Self {
        Self {
            func: HlfheFunction::new(options.function_name.clone()),
            registry: ValueRegistry::new(),
            options,
            next: 0,
        }
    }

    fn fresh(&mut self) -> NodeIndex {
        let idx = NodeIndex::new(self.next);
        self.next += 1;
        idx
    }

    /// Add a function argument described by `desc` and register it under a fresh node.
    pub fn argument(&mut self, desc: &ValueDescriptor) -> Result<NodeIndex> {
        let ty = argument_type("arg", desc)?;
        let value = self.func.add_argument(ty)?;
        let idx = self.fresh();

        self.registry.insert(idx, value)?;

        Ok(idx)
    }

    /// Lower `node` with predecessors `preds`, registering its value under a fresh node.
    pub fn lower(
        &mut self,
        node: &IntermediateNode,
        preds: &[NodeIndex],
    ) -> Result<(NodeIndex, Value)> {
        let mut ctx = LoweringCtx {
            func: &mut self.func,
            options: &self.options,
        };

        let value = lower_node(node, preds, &self.registry, &mut ctx)?;
        let idx = self.fresh();

        self.registry.insert(idx, value)?;

        Ok((idx, value))
    }

    /// The number of instructions emitted, excluding arguments.
    pub fn instruction_count(&self) -> usize {
        self.func.operations().count() - self.func.arguments().len()
    }
}
