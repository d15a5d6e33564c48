//! Selects and emits the backend instruction for each graph node.

use std::{collections::HashMap, sync::LazyLock};

use log::{debug, trace};
use parasol_hlfhe::{HlfheFunction, HlfheOp, Type, Value};
use petgraph::stable_graph::NodeIndex;

use crate::{
    ConstantData, Error, IntermediateNode, LoweringOptions, NodeKind, NodeTag, Result, Slot,
    ValueDescriptor, ValueKind, ValueRegistry,
    constant::{scalar_literal, tensor_literal},
    table::{check_table_domain, encode_table},
};

/// The function being emitted into and the options in effect.
pub struct LoweringCtx<'a> {
    /// Receives the emitted instructions.
    pub func: &'a mut HlfheFunction,

    /// The options in effect.
    pub options: &'a LoweringOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How to order a binary node's predecessors before emission.
pub enum OperandOrder {
    /// Keep the node's operand order.
    Preserve,

    /// Swap the operands so the encrypted one comes first.
    Swap,
}

impl OperandOrder {
    /// Apply this ordering to `operands`.
    pub fn apply<T>(self, operands: [T; 2]) -> [T; 2] {
        let [lhs, rhs] = operands;

        match self {
            Self::Preserve => [lhs, rhs],
            Self::Swap => [rhs, lhs],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The backend instruction a binary node lowers to.
pub enum BinaryRule {
    /// `HLFHE.add_eint_int`
    AddEintInt,

    /// `HLFHE.add_eint`
    AddEint,

    /// `HLFHE.sub_int_eint`
    SubIntEint,

    /// `HLFHE.mul_eint_int`
    MulEintInt,

    /// `HLFHE.dot_eint_int`
    DotEintInt,
}

impl BinaryRule {
    fn emit(
        self,
        func: &mut HlfheFunction,
        result: Type,
        lhs: Value,
        rhs: Value,
    ) -> parasol_hlfhe::Result<Value> {
        match self {
            Self::AddEintInt => func.add_eint_int(result, lhs, rhs),
            Self::AddEint => func.add_eint(result, lhs, rhs),
            Self::SubIntEint => func.sub_int_eint(result, lhs, rhs),
            Self::MulEintInt => func.mul_eint_int(result, lhs, rhs),
            Self::DotEintInt => func.dot_eint_int(result, lhs, rhs),
        }
    }
}

/// Select the instruction for a binary node of variant `op` whose operands have kinds `lhs`
/// and `rhs`, along with the operand order that instruction expects. Returns `None` when no
/// rule applies.
///
/// # Remarks
/// Subtraction only supports a clear minuend and an encrypted subtrahend; the reversed order
/// has no instruction.
pub fn select_binary_rule(
    op: NodeTag,
    lhs: ValueKind,
    rhs: ValueKind,
) -> Option<(BinaryRule, OperandOrder)> {
    use OperandOrder::*;
    use ValueKind::*;

    let selection = match (op, lhs, rhs) {
        (NodeTag::Add, EncryptedScalarUnsignedInteger, ClearScalarInteger) => {
            (BinaryRule::AddEintInt, Preserve)
        }
        (NodeTag::Add, ClearScalarInteger, EncryptedScalarUnsignedInteger) => {
            (BinaryRule::AddEintInt, Swap)
        }
        (NodeTag::Add, EncryptedScalarUnsignedInteger, EncryptedScalarUnsignedInteger) => {
            (BinaryRule::AddEint, Preserve)
        }
        (NodeTag::Sub, ClearScalarInteger, EncryptedScalarUnsignedInteger) => {
            (BinaryRule::SubIntEint, Preserve)
        }
        (NodeTag::Mul, EncryptedScalarUnsignedInteger, ClearScalarInteger) => {
            (BinaryRule::MulEintInt, Preserve)
        }
        (NodeTag::Mul, ClearScalarInteger, EncryptedScalarUnsignedInteger) => {
            (BinaryRule::MulEintInt, Swap)
        }
        (NodeTag::Dot, EncryptedTensorInteger, ClearTensorInteger) => {
            (BinaryRule::DotEintInt, Preserve)
        }
        (NodeTag::Dot, ClearTensorInteger, EncryptedTensorInteger) => {
            (BinaryRule::DotEintInt, Swap)
        }
        _ => return None,
    };

    Some(selection)
}

fn check_arity(node: &IntermediateNode, preds: &[NodeIndex], inputs: usize) -> Result<()> {
    let checks = [
        (Slot::Inputs, inputs, node.inputs.len()),
        (Slot::Outputs, 1, node.outputs.len()),
        (Slot::Predecessors, inputs, preds.len()),
    ];

    for (slot, expected, found) in checks {
        if expected != found {
            return Err(Error::Arity {
                op: node.tag(),
                slot,
                expected,
                found,
            });
        }
    }

    Ok(())
}

fn encrypted_result(value: &ValueDescriptor) -> Type {
    Type::EncryptedInteger(value.bit_width())
}

fn lower_binary(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    check_arity(node, preds, 2)?;

    let op = node.tag();
    let (lhs, rhs) = (&node.inputs[0], &node.inputs[1]);

    if [lhs, rhs].iter().any(|x| x.is_encrypted && x.is_signed()) {
        return Err(Error::SignedOperands {
            op,
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        });
    }

    let output = &node.outputs[0];

    if !output.is_encrypted_scalar_unsigned_integer() {
        return Err(Error::UnsupportedOutput {
            op,
            descriptor: output.to_string(),
        });
    }

    let (rule, order) =
        select_binary_rule(op, lhs.kind(), rhs.kind()).ok_or_else(|| {
            Error::UnsupportedOperands {
                op,
                lhs: lhs.to_string(),
                rhs: rhs.to_string(),
            }
        })?;

    if order == OperandOrder::Swap {
        debug!("{op}: moving encrypted operand {rhs} first");
    }

    let [lhs, rhs] = order.apply([preds[0], preds[1]]);
    let (lhs, rhs) = (registry.get(lhs)?, registry.get(rhs)?);

    Ok(rule.emit(ctx.func, encrypted_result(output), lhs, rhs)?)
}

fn add(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    lower_binary(node, preds, registry, ctx)
}

fn sub(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    lower_binary(node, preds, registry, ctx)
}

fn mul(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    lower_binary(node, preds, registry, ctx)
}

fn dot(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    lower_binary(node, preds, registry, ctx)
}

fn constant(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    _registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    check_arity(node, preds, 0)?;

    let NodeKind::Constant(data) = &node.kind else {
        return Err(Error::NoConversion(node.tag()));
    };

    let value = &node.outputs[0];

    let attr = match (value.kind(), data) {
        (ValueKind::ClearScalarInteger, _) if value.is_signed() => {
            return Err(Error::SignedConstant(value.to_string()));
        }
        (ValueKind::ClearTensorInteger, _) if value.is_signed() => {
            return Err(Error::SignedConstantTensor(value.to_string()));
        }
        (ValueKind::ClearScalarInteger, ConstantData::Scalar(x)) => {
            scalar_literal(*x, value.bit_width())?
        }
        (ValueKind::ClearTensorInteger, ConstantData::Tensor(x)) => {
            tensor_literal(x, &value.shape, value.bit_width())?
        }
        (ValueKind::ClearScalarInteger | ValueKind::ClearTensorInteger, _) => {
            return Err(Error::MalformedLiteral(format!(
                "payload {data:?} doesn't match {value}"
            )));
        }
        _ => return Err(Error::UnsupportedConstant(value.to_string())),
    };

    Ok(ctx.func.constant(attr)?)
}

fn apply_lut(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    check_arity(node, preds, 1)?;

    let NodeKind::UnivariateFunction(table) = &node.kind else {
        return Err(Error::NoConversion(node.tag()));
    };

    let (input, output) = (&node.inputs[0], &node.outputs[0]);

    if !input.is_encrypted_scalar_unsigned_integer() {
        return Err(Error::UnsupportedLutInput(input.to_string()));
    }

    if !output.is_encrypted_scalar_unsigned_integer() {
        return Err(Error::UnsupportedLutOutput(output.to_string()));
    }

    if ctx.options.check_table_domain {
        check_table_domain(table, input.bit_width())?;
    }

    let x = registry.get(preds[0])?;
    let x_ty = ctx.func.value_type(x)?;

    if !x_ty.is_encrypted_integer() {
        return Err(parasol_hlfhe::Error::OperandType {
            op: HlfheOp::ApplyLookupTableEint.name(),
            position: 0,
            expected: "an encrypted integer",
            found: x_ty.clone(),
        }
        .into());
    }

    let attr = encode_table(table)?;

    // The table is only emitted once its index is known to be accepted.
    let lut = ctx.func.constant(attr)?;

    Ok(ctx
        .func
        .apply_lookup_table(encrypted_result(output), x, lut)?)
}

/// Lowers one node, given its ordered predecessors, the registry holding their values, and
/// the function to emit into.
pub type Converter = fn(
    &IntermediateNode,
    &[NodeIndex],
    &ValueRegistry,
    &mut LoweringCtx<'_>,
) -> Result<Value>;

/// Maps node variants to the converters that lower them.
pub struct ConversionTable {
    converters: HashMap<NodeTag, Converter>,
}

impl ConversionTable {
    /// The converters for the V0 operation set: [`NodeTag::Add`], [`NodeTag::Sub`],
    /// [`NodeTag::Mul`], [`NodeTag::Dot`], [`NodeTag::Constant`] and
    /// [`NodeTag::UnivariateFunction`].
    pub fn v0() -> Self {
        let converters = HashMap::from([
            (NodeTag::Add, add as Converter),
            (NodeTag::Sub, sub as Converter),
            (NodeTag::Mul, mul as Converter),
            (NodeTag::Dot, dot as Converter),
            (NodeTag::Constant, constant as Converter),
            (NodeTag::UnivariateFunction, apply_lut as Converter),
        ]);

        Self { converters }
    }

    /// Whether a converter is registered for `tag`.
    pub fn supports(&self, tag: NodeTag) -> bool {
        self.converters.contains_key(&tag)
    }

    /// Lower `node` and return the value it produced. The caller registers the result.
    ///
    /// # Remarks
    /// All of `preds` must already be in `registry`. On failure nothing is emitted.
    pub fn convert(
        &self,
        node: &IntermediateNode,
        preds: &[NodeIndex],
        registry: &ValueRegistry,
        ctx: &mut LoweringCtx,
    ) -> Result<Value> {
        let tag = node.tag();
        let converter = self.converters.get(&tag).ok_or(Error::NoConversion(tag))?;

        trace!("Lowering {tag:?} with predecessors {preds:?}");

        converter(node, preds, registry, ctx)
    }
}

/// The V0 operation set, built on first use.
pub static V0_OPSET: LazyLock<ConversionTable> = LazyLock::new(ConversionTable::v0);

/// Lower `node` using [`V0_OPSET`].
pub fn lower_node(
    node: &IntermediateNode,
    preds: &[NodeIndex],
    registry: &ValueRegistry,
    ctx: &mut LoweringCtx,
) -> Result<Value> {
    V0_OPSET.convert(node, preds, registry, ctx)
}
