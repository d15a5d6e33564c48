use std::fmt;

use petgraph::{Direction, stable_graph::NodeIndex, stable_graph::StableGraph, visit::EdgeRef};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ValueDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The literal payload of a constant node.
///
/// # Remarks
/// Tensor payloads are flattened in row-major order; the node's output descriptor carries the
/// shape.
pub enum ConstantData {
    /// A scalar literal.
    Scalar(i128),

    /// A flattened tensor literal.
    Tensor(Vec<i128>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The precomputed outputs of a univariate function over every possible input.
///
/// # Remarks
/// Entry `i` is the function's output for input `i`, so a table for an `N`-bit input has
/// `2^N` entries. The front end establishes this when it builds the table.
pub struct LookupTable {
    table: Vec<u64>,
}

impl LookupTable {
    /// Wrap an already computed table.
    pub fn new(table: Vec<u64>) -> Self {
        Self { table }
    }

    /// Build a table by evaluating `f` on every `bit_width`-bit input.
    ///
    /// # Panics
    /// If `bit_width >= 64`.
    pub fn from_fn<F: Fn(u64) -> u64>(bit_width: u32, f: F) -> Self {
        Self {
            table: (0..1u64 << bit_width).map(f).collect(),
        }
    }

    /// The table entries.
    pub fn entries(&self) -> &[u64] {
        &self.table
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The operation a node performs, along with its payload.
pub enum NodeKind {
    /// The `index`th input of the program.
    Input {
        /// The input's name.
        name: String,

        /// The input's position in the program signature.
        index: usize,
    },

    /// `lhs + rhs`
    Add,

    /// `lhs - rhs`
    Sub,

    /// `lhs * rhs`
    Mul,

    /// The dot product of two vectors.
    Dot,

    /// A literal.
    Constant(ConstantData),

    /// An arbitrary single-input function, given as a lookup table.
    UnivariateFunction(LookupTable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The variant of a [`NodeKind`] without its payload.
pub enum NodeTag {
    /// [`NodeKind::Input`]
    Input,

    /// [`NodeKind::Add`]
    Add,

    /// [`NodeKind::Sub`]
    Sub,

    /// [`NodeKind::Mul`]
    Mul,

    /// [`NodeKind::Dot`]
    Dot,

    /// [`NodeKind::Constant`]
    Constant,

    /// [`NodeKind::UnivariateFunction`]
    UnivariateFunction,
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Add => "addition",
            Self::Sub => "subtraction",
            Self::Mul => "multiplication",
            Self::Dot => "dot",
            Self::Constant => "constant",
            Self::UnivariateFunction => "LUT",
        };

        write!(f, "{s}")
    }
}

impl NodeKind {
    /// This kind's variant.
    pub fn tag(&self) -> NodeTag {
        match self {
            Self::Input { .. } => NodeTag::Input,
            Self::Add => NodeTag::Add,
            Self::Sub => NodeTag::Sub,
            Self::Mul => NodeTag::Mul,
            Self::Dot => NodeTag::Dot,
            Self::Constant(_) => NodeTag::Constant,
            Self::UnivariateFunction(_) => NodeTag::UnivariateFunction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A node in an [`OpGraph`].
pub struct IntermediateNode {
    /// What the node computes.
    pub kind: NodeKind,

    /// The descriptors of the node's operands, in operand order.
    pub inputs: Vec<ValueDescriptor>,

    /// The descriptors of the node's results.
    pub outputs: Vec<ValueDescriptor>,
}

impl IntermediateNode {
    /// A program input.
    pub fn input(name: impl Into<String>, index: usize, value: ValueDescriptor) -> Self {
        Self {
            kind: NodeKind::Input {
                name: name.into(),
                index,
            },
            inputs: vec![],
            outputs: vec![value],
        }
    }

    /// A constant producing `value`.
    pub fn constant(data: ConstantData, value: ValueDescriptor) -> Self {
        Self {
            kind: NodeKind::Constant(data),
            inputs: vec![],
            outputs: vec![value],
        }
    }

    /// A two-operand node, e.g. [`NodeKind::Add`].
    pub fn binary(
        kind: NodeKind,
        lhs: ValueDescriptor,
        rhs: ValueDescriptor,
        output: ValueDescriptor,
    ) -> Self {
        Self {
            kind,
            inputs: vec![lhs, rhs],
            outputs: vec![output],
        }
    }

    /// A lookup table applied to `input`.
    pub fn univariate_function(
        table: LookupTable,
        input: ValueDescriptor,
        output: ValueDescriptor,
    ) -> Self {
        Self {
            kind: NodeKind::UnivariateFunction(table),
            inputs: vec![input],
            outputs: vec![output],
        }
    }

    /// This node's variant.
    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Connects a node to the operand at the contained position of its consumer.
pub struct OperandIndex(pub usize);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// A DAG of arithmetic operations over a mix of encrypted and clear values, as produced by a
/// front end.
///
/// # Remarks
/// Well-formed graphs are acyclic, and every non-input node's `inputs` are the first outputs
/// of its predecessors in [`OperandIndex`] order.
pub struct OpGraph {
    /// The DAG.
    pub graph: StableGraph<IntermediateNode, OperandIndex>,

    /// The [`NodeKind::Input`] nodes in program signature order.
    pub inputs: Vec<NodeIndex>,

    /// The nodes whose values the program returns, in order.
    pub outputs: Vec<NodeIndex>,
}

impl OpGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input to the program's signature.
    pub fn add_input(&mut self, name: impl Into<String>, value: ValueDescriptor) -> NodeIndex {
        let node = IntermediateNode::input(name, self.inputs.len(), value);
        let idx = self.graph.add_node(node);
        self.inputs.push(idx);

        idx
    }

    /// Add a constant node.
    pub fn add_constant(&mut self, data: ConstantData, value: ValueDescriptor) -> NodeIndex {
        self.graph
            .add_node(IntermediateNode::constant(data, value))
    }

    /// Add a node of the given `kind` consuming the first outputs of `operands`.
    pub fn add_operation(
        &mut self,
        kind: NodeKind,
        operands: &[NodeIndex],
        output: ValueDescriptor,
    ) -> Result<NodeIndex> {
        let inputs = operands
            .iter()
            .map(|n| {
                self.graph
                    .node_weight(*n)
                    .and_then(|x| x.outputs.first().cloned())
                    .ok_or(Error::UnknownNode(*n))
            })
            .collect::<Result<Vec<_>>>()?;

        let idx = self.graph.add_node(IntermediateNode {
            kind,
            inputs,
            outputs: vec![output],
        });

        for (i, operand) in operands.iter().enumerate() {
            self.graph.add_edge(*operand, idx, OperandIndex(i));
        }

        Ok(idx)
    }

    /// Add a lookup table applied to `operand`.
    pub fn add_univariate_function(
        &mut self,
        table: LookupTable,
        operand: NodeIndex,
        output: ValueDescriptor,
    ) -> Result<NodeIndex> {
        self.add_operation(NodeKind::UnivariateFunction(table), &[operand], output)
    }

    /// Return `node`'s value from the program.
    pub fn mark_output(&mut self, node: NodeIndex) -> Result<()> {
        if !self.graph.contains_node(node) {
            return Err(Error::UnknownNode(node));
        }

        self.outputs.push(node);

        Ok(())
    }

    /// The node at `idx`.
    pub fn node(&self, idx: NodeIndex) -> Result<&IntermediateNode> {
        self.graph.node_weight(idx).ok_or(Error::UnknownNode(idx))
    }

    /// The predecessors of `node` ordered by operand position.
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (*e.weight(), e.source()))
            .collect::<Vec<_>>();

        edges.sort();
        edges.into_iter().map(|(_, n)| n).collect()
    }

    /// Deserialize a graph handed over by a front end.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this graph.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
