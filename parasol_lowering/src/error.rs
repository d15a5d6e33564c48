use std::fmt;

use petgraph::stable_graph::NodeIndex;
use thiserror::Error;

use crate::NodeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which list of a node an arity check failed on.
pub enum Slot {
    /// The node's input descriptors.
    Inputs,

    /// The node's output descriptors.
    Outputs,

    /// The predecessor list passed alongside the node.
    Predecessors,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inputs => "inputs",
            Self::Outputs => "outputs",
            Self::Predecessors => "predecessors",
        };

        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
/// Errors that can occur while lowering a graph.
pub enum Error {
    /// A node has the wrong number of inputs, outputs or predecessors. This indicates the
    /// front end produced a malformed node.
    #[error("Internal error: {op} should have {expected} {slot}, found {found}")]
    Arity {
        /// The offending node's variant.
        op: NodeTag,

        /// Which list had the wrong length.
        slot: Slot,

        /// The required length.
        expected: usize,

        /// The actual length.
        found: usize,
    },

    /// No lowering rule exists for the given operand kinds.
    #[error("Don't support {op} between {lhs} and {rhs}")]
    UnsupportedOperands {
        /// The offending node's variant.
        op: NodeTag,

        /// The first operand's descriptor.
        lhs: String,

        /// The second operand's descriptor.
        rhs: String,
    },

    /// An operand is a signed encrypted integer.
    #[error("Don't support {op} between {lhs} and {rhs}: signed encrypted integers are unsupported")]
    SignedOperands {
        /// The offending node's variant.
        op: NodeTag,

        /// The first operand's descriptor.
        lhs: String,

        /// The second operand's descriptor.
        rhs: String,
    },

    /// A binary operation's result isn't an encrypted unsigned scalar.
    #[error("Don't support {op} producing {descriptor}: only encrypted unsigned integer results are supported")]
    UnsupportedOutput {
        /// The offending node's variant.
        op: NodeTag,

        /// The result's descriptor.
        descriptor: String,
    },

    /// A scalar constant is signed.
    #[error("Don't support signed constant integer {0}")]
    SignedConstant(String),

    /// A tensor constant is signed.
    #[error("Don't support signed constant integer tensor {0}")]
    SignedConstantTensor(String),

    /// A constant is neither a clear scalar nor a clear tensor of integers.
    #[error("Don't support {0} constants")]
    UnsupportedConstant(String),

    /// A lookup table's input isn't an encrypted unsigned scalar.
    #[error("Only support LUT with encrypted unsigned integers inputs, found {0}")]
    UnsupportedLutInput(String),

    /// A lookup table's output isn't an encrypted unsigned scalar.
    #[error("Only support LUT with encrypted unsigned integers outputs, found {0}")]
    UnsupportedLutOutput(String),

    /// A program input can't become a function argument.
    #[error("Don't support program input {name} of type {descriptor}")]
    UnsupportedInput {
        /// The input's name.
        name: String,

        /// The input's descriptor.
        descriptor: String,
    },

    /// A constant's payload disagrees with its descriptor.
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// A lookup table doesn't cover its input's domain.
    #[error("A lookup table for a {bit_width}-bit input needs 2^{bit_width} entries, found {len}")]
    TableDomain {
        /// The input's bit width.
        bit_width: u32,

        /// The table's length.
        len: usize,
    },

    /// A predecessor hasn't been lowered yet. This indicates the traversal didn't visit nodes
    /// in dependency order.
    #[error("Internal error: no lowered value registered for node {0:?}")]
    MissingOperand(NodeIndex),

    /// A node was registered twice.
    #[error("Internal error: node {0:?} was already lowered")]
    AlreadyLowered(NodeIndex),

    /// A node index doesn't refer to a node in the graph.
    #[error("Node {0:?} isn't in the graph")]
    UnknownNode(NodeIndex),

    /// No converter is registered for the given node variant.
    #[error("No conversion registered for {0:?} nodes")]
    NoConversion(NodeTag),

    /// Some nodes were never reached because they sit on a cycle.
    #[error("The graph contains a cycle")]
    Cyclic,

    /// The backend rejected an instruction.
    #[error("{0}")]
    Hlfhe(#[from] parasol_hlfhe::Error),

    /// (De)serialization failed.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
