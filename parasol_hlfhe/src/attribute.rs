use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Type, num_elements, parse::Cursor};

/// The element widths the native dense builder can express.
///
/// # Remarks
/// Tensors of any other element width (e.g. `i3`) must go through [`Attribute::parse`].
pub const NATIVE_DENSE_WIDTHS: [u32; 5] = [1, 8, 16, 32, 64];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A compile-time literal attached to a constant instruction.
pub enum Attribute {
    /// A scalar integer literal.
    Integer {
        /// An [`Type::Integer`].
        ty: Type,

        /// The literal value.
        value: u64,
    },

    /// A tensor literal whose values are stored flattened in row-major order.
    DenseElements {
        /// A [`Type::RankedTensor`] of [`Type::Integer`] elements.
        ty: Type,

        /// The flattened values.
        values: Vec<u64>,
    },
}

fn fits(value: u64, width: u32) -> bool {
    width >= u64::BITS || value >> width == 0
}

fn check_fits(value: u64, width: u32) -> Result<()> {
    if fits(value, width) {
        Ok(())
    } else {
        Err(Error::ValueOutOfRange { value, width })
    }
}

impl Attribute {
    /// Build a scalar integer literal of type `ty` using the native builder.
    pub fn integer(ty: Type, value: u64) -> Result<Self> {
        match ty {
            Type::Integer(0) => Err(Error::ZeroWidth),
            Type::Integer(width) => {
                check_fits(value, width)?;

                Ok(Self::Integer { ty, value })
            }
            _ => Err(Error::MalformedLiteral(format!(
                "integer literals must have an integer type, found {ty}"
            ))),
        }
    }

    /// Build a tensor literal using the native dense builder.
    ///
    /// # Remarks
    /// The native builder only supports [`NATIVE_DENSE_WIDTHS`]; any other element width
    /// fails with [`Error::UnsupportedDenseWidth`].
    pub fn dense_elements(shape: &[usize], element_width: u32, values: &[u64]) -> Result<Self> {
        if element_width == 0 {
            return Err(Error::ZeroWidth);
        }

        if !NATIVE_DENSE_WIDTHS.contains(&element_width) {
            return Err(Error::UnsupportedDenseWidth(element_width));
        }

        Self::checked_dense(
            Type::ranked_tensor(shape, Type::Integer(element_width)),
            values.to_owned(),
        )
    }

    fn checked_dense(ty: Type, values: Vec<u64>) -> Result<Self> {
        let (shape, width) = match &ty {
            Type::RankedTensor { shape, element } if element.is_integer() => {
                (shape, element.bit_width())
            }
            _ => {
                return Err(Error::MalformedLiteral(format!(
                    "dense literals must have an integer tensor type, found {ty}"
                )));
            }
        };

        if num_elements(shape)? != values.len() {
            return Err(Error::MalformedLiteral(format!(
                "{} values don't fill {ty}",
                values.len()
            )));
        }

        values.iter().try_for_each(|v| check_fits(*v, width))?;

        Ok(Self::DenseElements { ty, values })
    }

    /// Parse the textual form of an attribute, e.g. `dense<[1, 2, 3]> : tensor<3xi3>` or
    /// `5 : i3`.
    ///
    /// # Remarks
    /// Unlike [`Attribute::dense_elements`], this accepts any element width.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cursor = Cursor::new(text);

        let attr = if cursor.eat("dense<") {
            let nested = cursor.parse_nested()?;
            cursor.expect(">")?;
            cursor.expect(":")?;
            let ty = cursor.parse_type()?;

            let shape = ty.shape().ok_or_else(|| {
                Error::MalformedLiteral(format!("dense literals need a tensor type, found {ty}"))
            })?;

            let mut values = vec![];
            nested.flatten_into(shape, &mut values)?;

            Self::checked_dense(ty, values)?
        } else {
            let value = cursor.unsigned()?;
            cursor.expect(":")?;
            let ty = cursor.parse_type()?;

            Self::integer(ty, value)?
        };

        cursor.finish()?;

        Ok(attr)
    }

    /// The type of this literal.
    pub fn ty(&self) -> &Type {
        match self {
            Self::Integer { ty, .. } | Self::DenseElements { ty, .. } => ty,
        }
    }
}

/// Format flattened `values` as a nested list literal with the given `shape`, e.g.
/// `[[1, 2], [3, 4]]` for shape `[2, 2]`.
pub fn nested_literal(shape: &[usize], values: &[u64]) -> Result<String> {
    if num_elements(shape)? != values.len() {
        return Err(Error::MalformedLiteral(format!(
            "{} values don't fill shape {shape:?}",
            values.len()
        )));
    }

    Ok(write_nested(shape, values))
}

fn write_nested(shape: &[usize], values: &[u64]) -> String {
    match shape.split_first() {
        None => values.iter().join(""),
        Some((dim, rest)) => {
            let stride = rest.iter().product::<usize>();

            let items = (0..*dim)
                .map(|i| write_nested(rest, &values[i * stride..(i + 1) * stride]))
                .join(", ");

            format!("[{items}]")
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { ty, value } => write!(f, "{value} : {ty}"),
            Self::DenseElements { ty, values } => {
                let shape = ty.shape().unwrap_or_default();
                write!(f, "dense<{}> : {ty}", write_nested(shape, values))
            }
        }
    }
}
