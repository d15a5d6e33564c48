use log::{debug, info};
use parasol_hlfhe::{HlfheFunction, Type};

use crate::{
    Error, LoweringCtx, LoweringOptions, NodeKind, OpGraph, Result, Slot, ValueDescriptor,
    ValueKind, ValueRegistry, forward_traverse, lower_node,
};

/// The backend type of a program input described by `value`.
///
/// # Remarks
/// Encrypted values must be unsigned integers. Clear values may be signed, since the backend's
/// plaintext integers are signless.
pub fn argument_type(name: &str, value: &ValueDescriptor) -> Result<Type> {
    let unsupported = || Error::UnsupportedInput {
        name: name.to_owned(),
        descriptor: value.to_string(),
    };

    if value.is_encrypted && value.is_signed() {
        return Err(unsupported());
    }

    let width = value.bit_width();

    let ty = match value.kind() {
        ValueKind::EncryptedScalarUnsignedInteger => Type::EncryptedInteger(width),
        ValueKind::ClearScalarInteger => Type::Integer(width),
        ValueKind::EncryptedTensorInteger => {
            Type::ranked_tensor(&value.shape, Type::EncryptedInteger(width))
        }
        ValueKind::ClearTensorInteger => Type::ranked_tensor(&value.shape, Type::Integer(width)),
        ValueKind::EncryptedScalarSignedInteger | ValueKind::NonInteger => {
            return Err(unsupported());
        }
    };

    Ok(ty)
}

/// Lower `program` into a new [`HlfheFunction`].
///
/// # Remarks
/// Each program input becomes a function argument in signature order. The remaining nodes are
/// lowered in dependency order and the program's outputs are returned. Fails on the first node
/// that can't be lowered.
pub fn lower_program(program: &OpGraph, options: &LoweringOptions) -> Result<HlfheFunction> {
    let mut func = HlfheFunction::new(options.function_name.clone());
    let mut registry = ValueRegistry::new();

    for idx in &program.inputs {
        let node = program.node(*idx)?;

        let NodeKind::Input { name, .. } = &node.kind else {
            return Err(Error::NoConversion(node.tag()));
        };

        let desc = node.outputs.first().ok_or(Error::Arity {
            op: node.tag(),
            slot: Slot::Outputs,
            expected: 1,
            found: 0,
        })?;

        let value = func.add_argument(argument_type(name, desc)?)?;
        registry.insert(*idx, value)?;
    }

    forward_traverse(&program.graph, |idx| {
        if registry.contains(idx) {
            return Ok(());
        }

        let node = program.node(idx)?;
        let preds = program.predecessors(idx);

        let mut ctx = LoweringCtx {
            func: &mut func,
            options,
        };

        let value = lower_node(node, &preds, &registry, &mut ctx)?;

        registry.insert(idx, value)
    })?;

    if registry.len() != program.graph.node_count() {
        return Err(Error::Cyclic);
    }

    let results = program
        .outputs
        .iter()
        .map(|x| registry.get(*x))
        .collect::<Result<Vec<_>>>()?;

    func.ret(&results)?;

    debug!("Lowered program:\n{func}");
    info!(
        "Lowered {} nodes into {} ({} arguments, {} results)",
        registry.len(),
        func.name(),
        func.arguments().len(),
        results.len()
    );

    Ok(func)
}
