use log::debug;
use parasol_hlfhe::{Attribute, NATIVE_DENSE_WIDTHS, Type, nested_literal};

use crate::{Error, Result};

/// Builds tensor literals of a given element width.
pub trait TensorLiteralBuilder {
    /// Whether this builder can express tensors with `element_width`-bit elements.
    fn supports(&self, element_width: u32) -> bool;

    /// Build a literal of the given shape from row-major `values`.
    fn build(&self, shape: &[usize], element_width: u32, values: &[u64]) -> Result<Attribute>;
}

/// Uses the backend's native dense builder. Only supports [`NATIVE_DENSE_WIDTHS`].
pub struct NativeDenseBuilder;

impl TensorLiteralBuilder for NativeDenseBuilder {
    fn supports(&self, element_width: u32) -> bool {
        NATIVE_DENSE_WIDTHS.contains(&element_width)
    }

    fn build(&self, shape: &[usize], element_width: u32, values: &[u64]) -> Result<Attribute> {
        Ok(Attribute::dense_elements(shape, element_width, values)?)
    }
}

/// Serializes the literal to its textual form and hands it to the backend's generic attribute
/// parser, which accepts arbitrary widths (e.g. `tensor<4xi3>`).
pub struct StructuralDenseBuilder;

impl TensorLiteralBuilder for StructuralDenseBuilder {
    fn supports(&self, _element_width: u32) -> bool {
        true
    }

    fn build(&self, shape: &[usize], element_width: u32, values: &[u64]) -> Result<Attribute> {
        let ty = Type::ranked_tensor(shape, Type::Integer(element_width));
        let text = format!("dense<{}> : {ty}", nested_literal(shape, values)?);

        debug!("Building {ty} literal through the attribute parser");

        Ok(Attribute::parse(&text)?)
    }
}

/// The builder used for tensors with `element_width`-bit elements: the native builder when
/// it can express the width, the structural fallback otherwise.
pub fn tensor_literal_builder(element_width: u32) -> &'static dyn TensorLiteralBuilder {
    if NativeDenseBuilder.supports(element_width) {
        &NativeDenseBuilder
    } else {
        &StructuralDenseBuilder
    }
}

fn to_unsigned(value: i128) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        Error::MalformedLiteral(format!("{value} isn't representable as an unsigned literal"))
    })
}

/// A scalar literal of type `i{bit_width}`.
pub fn scalar_literal(value: i128, bit_width: u32) -> Result<Attribute> {
    Ok(Attribute::integer(
        Type::Integer(bit_width),
        to_unsigned(value)?,
    )?)
}

/// A tensor literal of type `tensor<{shape}xi{bit_width}>` from row-major `values`.
pub fn tensor_literal(values: &[i128], shape: &[usize], bit_width: u32) -> Result<Attribute> {
    let values = values
        .iter()
        .map(|v| to_unsigned(*v))
        .collect::<Result<Vec<_>>>()?;

    tensor_literal_builder(bit_width).build(shape, bit_width, &values)
}
