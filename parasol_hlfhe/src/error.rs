use thiserror::Error;

use crate::Type;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Errors that can occur when building HLFHE types, attributes and instructions.
pub enum Error {
    /// An integer type was requested with zero bits.
    #[error("Integer types must have a non-zero width")]
    ZeroWidth,

    /// A literal doesn't fit in the width of its declared type.
    #[error("Value {value} doesn't fit in {width} bits")]
    ValueOutOfRange {
        /// The offending literal.
        value: u64,

        /// The width of the declared type.
        width: u32,
    },

    /// The native dense builder was asked for an element width it can't express.
    #[error("Dense elements of width {0} can't be built natively (supported widths: 1, 8, 16, 32, 64)")]
    UnsupportedDenseWidth(u32),

    /// A literal's payload disagrees with its declared type or shape.
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// The textual form of a type or attribute couldn't be parsed.
    #[error("Parse error at offset {offset}: {message}")]
    Parse {
        /// The byte offset at which parsing failed.
        offset: usize,

        /// What the parser expected.
        message: String,
    },

    /// An operand has the wrong type for the instruction consuming it.
    #[error("{op}: operand {position} must be {expected}, found {found}")]
    OperandType {
        /// The instruction name.
        op: &'static str,

        /// The operand position.
        position: usize,

        /// A description of the accepted types.
        expected: &'static str,

        /// The operand's actual type.
        found: Type,
    },

    /// The requested result type can't be produced by the instruction.
    #[error("{op}: result must be {expected}, found {found}")]
    ResultType {
        /// The instruction name.
        op: &'static str,

        /// A description of the accepted types.
        expected: &'static str,

        /// The requested type.
        found: Type,
    },

    /// Tensor operands of an instruction have incompatible shapes.
    #[error("{op}: incompatible operand shapes {lhs:?} and {rhs:?}")]
    ShapeMismatch {
        /// The instruction name.
        op: &'static str,

        /// The shape of the first tensor operand.
        lhs: Vec<usize>,

        /// The shape of the second tensor operand.
        rhs: Vec<usize>,
    },

    /// A value handle doesn't belong to this function.
    #[error("Value %{0} isn't defined in this function")]
    UnknownValue(usize),

    /// An instruction was emitted after the function already returned.
    #[error("Function {0} already has a return")]
    AlreadyTerminated(String),
}

/// Results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
