use parasol_hlfhe::{Attribute, HlfheOp, Type};
use parasol_lowering::{
    ConstantData, DataType, Error, LoweringOptions, NodeKind, OpGraph, ValueDescriptor,
    lower_program, test_utils::*,
};

use crate::{init_logger, lower};

fn constant_of(func: &parasol_hlfhe::HlfheFunction, ty: &Type) -> Attribute {
    func.operations()
        .find_map(|(_, inst)| match &inst.op {
            HlfheOp::Constant(attr) if attr.ty() == ty => Some(attr.clone()),
            _ => None,
        })
        .unwrap()
}

#[test]
fn odd_width_tensor_constant() {
    let mut program = OpGraph::new();
    let c = program.add_constant(
        ConstantData::Tensor(vec![1, 2, 3, 4]),
        ValueDescriptor::clear_tensor(DataType::unsigned(3), &[4]),
    );
    program.mark_output(c).unwrap();

    let func = lower(&program);
    let ty = Type::ranked_tensor(&[4], Type::Integer(3));
    let attr = constant_of(&func, &ty);

    assert_eq!(attr.to_string(), "dense<[1, 2, 3, 4]> : tensor<4xi3>");
    assert_eq!(func.value_type(func.results()[0]).unwrap(), &ty);
}

#[test]
fn native_width_tensor_constant() {
    let mut program = OpGraph::new();
    let c = program.add_constant(
        ConstantData::Tensor(vec![10, 20, 30, 40, 50, 60]),
        ValueDescriptor::clear_tensor(DataType::unsigned(16), &[2, 3]),
    );
    program.mark_output(c).unwrap();

    let func = lower(&program);
    let attr = constant_of(&func, &Type::ranked_tensor(&[2, 3], Type::Integer(16)));

    assert_eq!(
        attr.to_string(),
        "dense<[[10, 20, 30], [40, 50, 60]]> : tensor<2x3xi16>"
    );
}

#[test]
fn signed_constants_are_rejected() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(4));
    let c = program.add_constant(ConstantData::Scalar(-1), clear_int(4));
    let y = program
        .add_operation(NodeKind::Add, &[x, c], encrypted_uint(4))
        .unwrap();
    program.mark_output(y).unwrap();

    let err = lower_program(&program, &LoweringOptions::default()).unwrap_err();

    assert!(matches!(err, Error::SignedConstant(_)));
    assert!(err.to_string().contains("ClearScalar<int4>"));
}

#[test]
fn signed_constant_tensors_are_rejected() {
    init_logger();

    let mut program = OpGraph::new();
    let c = program.add_constant(
        ConstantData::Tensor(vec![0, 1]),
        ValueDescriptor::clear_tensor(DataType::signed(8), &[2]),
    );
    program.mark_output(c).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::SignedConstantTensor(_))
    ));
}

#[test]
fn float_constants_are_unsupported() {
    init_logger();

    let mut program = OpGraph::new();
    let c = program.add_constant(
        ConstantData::Scalar(1),
        ValueDescriptor::clear_scalar(DataType::Float { bit_width: 32 }),
    );
    program.mark_output(c).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedConstant(_))
    ));
}

#[test]
fn out_of_range_constant_fails() {
    init_logger();

    let mut program = OpGraph::new();
    let c = program.add_constant(ConstantData::Scalar(8), clear_uint(3));
    program.mark_output(c).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::Hlfhe(parasol_hlfhe::Error::ValueOutOfRange {
            value: 8,
            width: 3
        }))
    ));
}
