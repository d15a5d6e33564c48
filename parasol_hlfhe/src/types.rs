use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, parse::Cursor};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The type of a value produced by an HLFHE instruction.
pub enum Type {
    /// A signless plaintext integer with the contained bit width (`iN`).
    Integer(u32),

    /// An encrypted unsigned integer with the contained bit width (`!HLFHE.eint<N>`).
    EncryptedInteger(u32),

    /// A tensor with a static shape (`tensor<AxBxE>`).
    RankedTensor {
        /// The extent of each dimension. Empty for rank-0 tensors.
        shape: Vec<usize>,

        /// The type of each element.
        element: Box<Type>,
    },
}

impl Type {
    /// Create a tensor type with the given shape and element type.
    pub fn ranked_tensor(shape: &[usize], element: Type) -> Self {
        Self::RankedTensor {
            shape: shape.to_owned(),
            element: Box::new(element),
        }
    }

    /// Whether this is a plaintext integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Whether this is an encrypted integer.
    pub fn is_encrypted_integer(&self) -> bool {
        matches!(self, Self::EncryptedInteger(_))
    }

    /// The bit width of a scalar, or of a tensor's elements.
    pub fn bit_width(&self) -> u32 {
        match self {
            Self::Integer(w) | Self::EncryptedInteger(w) => *w,
            Self::RankedTensor { element, .. } => element.bit_width(),
        }
    }

    /// The shape of a tensor, or `None` for scalars.
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Self::RankedTensor { shape, .. } => Some(shape),
            _ => None,
        }
    }

    /// The element type of a tensor, or `None` for scalars.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Self::RankedTensor { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Whether this is a one-dimensional tensor whose elements satisfy `f`.
    pub fn is_vector_of<F: Fn(&Type) -> bool>(&self, f: F) -> bool {
        match self {
            Self::RankedTensor { shape, element } => shape.len() == 1 && f(element),
            _ => false,
        }
    }
}

/// The number of elements in a tensor with the given shape. Fails if the count doesn't fit in
/// a `usize`.
pub fn num_elements(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
        .ok_or_else(|| Error::MalformedLiteral(format!("shape {shape:?} has too many elements")))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(w) => write!(f, "i{w}"),
            Self::EncryptedInteger(w) => write!(f, "!HLFHE.eint<{w}>"),
            Self::RankedTensor { shape, element } => {
                write!(f, "tensor<")?;

                for dim in shape {
                    write!(f, "{dim}x")?;
                }

                write!(f, "{element}>")
            }
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s);
        let ty = cursor.parse_type()?;
        cursor.finish()?;

        Ok(ty)
    }
}
