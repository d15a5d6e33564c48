use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The element type of a value flowing through an [`OpGraph`](crate::OpGraph).
pub enum DataType {
    /// An integer with the given width and signedness.
    Integer {
        /// The number of bits. Always non-zero.
        bit_width: u32,

        /// Whether the integer is two's complement.
        is_signed: bool,
    },

    /// A floating point number. No lowering rule accepts these.
    Float {
        /// The number of bits.
        bit_width: u32,
    },
}

impl DataType {
    /// An unsigned integer of `bit_width` bits.
    pub fn unsigned(bit_width: u32) -> Self {
        Self::Integer {
            bit_width,
            is_signed: false,
        }
    }

    /// A signed integer of `bit_width` bits.
    pub fn signed(bit_width: u32) -> Self {
        Self::Integer {
            bit_width,
            is_signed: true,
        }
    }

    /// The number of bits.
    pub fn bit_width(&self) -> u32 {
        match self {
            Self::Integer { bit_width, .. } | Self::Float { bit_width } => *bit_width,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer {
                bit_width,
                is_signed: true,
            } => write!(f, "int{bit_width}"),
            Self::Integer {
                bit_width,
                is_signed: false,
            } => write!(f, "uint{bit_width}"),
            Self::Float { bit_width } => write!(f, "float{bit_width}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Describes a value consumed or produced by a node.
pub struct ValueDescriptor {
    /// Whether the value is a ciphertext.
    pub is_encrypted: bool,

    /// The tensor shape. Empty for scalars.
    pub shape: Vec<usize>,

    /// The element type.
    pub dtype: DataType,
}

impl ValueDescriptor {
    /// An encrypted scalar.
    pub fn encrypted_scalar(dtype: DataType) -> Self {
        Self {
            is_encrypted: true,
            shape: vec![],
            dtype,
        }
    }

    /// A clear scalar.
    pub fn clear_scalar(dtype: DataType) -> Self {
        Self {
            is_encrypted: false,
            shape: vec![],
            dtype,
        }
    }

    /// An encrypted tensor with the given shape.
    pub fn encrypted_tensor(dtype: DataType, shape: &[usize]) -> Self {
        Self {
            is_encrypted: true,
            shape: shape.to_owned(),
            dtype,
        }
    }

    /// A clear tensor with the given shape.
    pub fn clear_tensor(dtype: DataType, shape: &[usize]) -> Self {
        Self {
            is_encrypted: false,
            shape: shape.to_owned(),
            dtype,
        }
    }

    /// Whether the value is a scalar.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Whether the value is a signed integer.
    pub fn is_signed(&self) -> bool {
        matches!(
            self.dtype,
            DataType::Integer {
                is_signed: true,
                ..
            }
        )
    }

    /// The element bit width.
    pub fn bit_width(&self) -> u32 {
        self.dtype.bit_width()
    }

    /// Classify this value for overload selection.
    pub fn kind(&self) -> ValueKind {
        ValueKind::classify(self)
    }

    /// Whether this is a plaintext integer scalar of either signedness.
    pub fn is_clear_scalar_integer(&self) -> bool {
        self.kind() == ValueKind::ClearScalarInteger
    }

    /// Whether this is a plaintext integer tensor of either signedness.
    pub fn is_clear_tensor_integer(&self) -> bool {
        self.kind() == ValueKind::ClearTensorInteger
    }

    /// Whether this is an encrypted unsigned integer scalar.
    pub fn is_encrypted_scalar_unsigned_integer(&self) -> bool {
        self.kind() == ValueKind::EncryptedScalarUnsignedInteger
    }

    /// Whether this is an encrypted integer tensor of either signedness.
    pub fn is_encrypted_tensor_integer(&self) -> bool {
        self.kind() == ValueKind::EncryptedTensorInteger
    }
}

impl fmt::Display for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encryption = if self.is_encrypted {
            "Encrypted"
        } else {
            "Clear"
        };

        if self.is_scalar() {
            write!(f, "{encryption}Scalar<{}>", self.dtype)
        } else {
            write!(
                f,
                "{encryption}Tensor<{}, shape={:?}>",
                self.dtype, self.shape
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The overload-relevant kind of a [`ValueDescriptor`]. Every descriptor has exactly one kind.
pub enum ValueKind {
    /// A plaintext integer scalar.
    ClearScalarInteger,

    /// A plaintext integer tensor.
    ClearTensorInteger,

    /// An encrypted unsigned integer scalar.
    EncryptedScalarUnsignedInteger,

    /// An encrypted signed integer scalar.
    EncryptedScalarSignedInteger,

    /// An encrypted integer tensor.
    EncryptedTensorInteger,

    /// Anything that isn't an integer.
    NonInteger,
}

impl ValueKind {
    /// Classify `value`.
    pub fn classify(value: &ValueDescriptor) -> Self {
        let DataType::Integer { is_signed, .. } = value.dtype else {
            return Self::NonInteger;
        };

        match (value.is_encrypted, value.is_scalar(), is_signed) {
            (false, true, _) => Self::ClearScalarInteger,
            (false, false, _) => Self::ClearTensorInteger,
            (true, true, false) => Self::EncryptedScalarUnsignedInteger,
            (true, true, true) => Self::EncryptedScalarSignedInteger,
            (true, false, _) => Self::EncryptedTensorInteger,
        }
    }
}
