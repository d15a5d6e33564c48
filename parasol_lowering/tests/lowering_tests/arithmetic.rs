use parasol_hlfhe::{HlfheOp, Type};
use parasol_lowering::{
    ConstantData, Error, LoweringOptions, NodeKind, NodeTag, OpGraph, lower_program,
    test_utils::*,
};
use proptest::prelude::*;

use crate::{body_len, init_logger, lower};

fn scalar_with_constant(op: NodeKind, constant: u8, clear_first: bool) -> OpGraph {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(8));
    let c = program.add_constant(ConstantData::Scalar(constant.into()), clear_uint(8));

    let operands = if clear_first { [c, x] } else { [x, c] };

    let y = program
        .add_operation(op, &operands, encrypted_uint(8))
        .unwrap();
    program.mark_output(y).unwrap();

    program
}

proptest! {
    #[test]
    fn commutative_ops_ignore_operand_order(constant: u8, mul: bool) {
        let op = if mul { NodeKind::Mul } else { NodeKind::Add };

        let a = lower(&scalar_with_constant(op.clone(), constant, false));
        let b = lower(&scalar_with_constant(op, constant, true));

        prop_assert_eq!(a.to_string(), b.to_string());

        let y = a.results()[0];
        let operands = a.operands(y);

        prop_assert_eq!(operands[0], a.arguments()[0]);
        prop_assert_eq!(a.value_type(operands[1]).unwrap(), &Type::Integer(8));
    }
}

#[test]
fn encrypted_sum_keeps_output_width() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(7));
    let y = program.add_input("y", encrypted_uint(7));
    let z = program
        .add_operation(NodeKind::Add, &[x, y], encrypted_uint(7))
        .unwrap();
    program.mark_output(z).unwrap();

    let func = lower(&program);
    let z = func.results()[0];

    assert_eq!(func.op(z).unwrap(), &HlfheOp::AddEint);
    assert_eq!(func.value_type(z).unwrap(), &Type::EncryptedInteger(7));
    assert_eq!(func.operands(z), func.arguments());
}

#[test]
fn subtraction_from_constant() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(5));
    let c = program.add_constant(ConstantData::Scalar(20), clear_uint(5));
    let y = program
        .add_operation(NodeKind::Sub, &[c, x], encrypted_uint(5))
        .unwrap();
    program.mark_output(y).unwrap();

    let func = lower(&program);
    let y = func.results()[0];

    assert_eq!(func.op(y).unwrap(), &HlfheOp::SubIntEint);
    assert_eq!(func.operands(y)[1], func.arguments()[0]);
    assert_eq!(body_len(&func), 2);
}

#[test]
fn subtracting_constant_is_unsupported() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(5));
    let c = program.add_constant(ConstantData::Scalar(2), clear_uint(5));
    let y = program
        .add_operation(NodeKind::Sub, &[x, c], encrypted_uint(5))
        .unwrap();
    program.mark_output(y).unwrap();

    let err = lower_program(&program, &LoweringOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedOperands {
            op: NodeTag::Sub,
            ..
        }
    ));
}

#[test]
fn multiplying_ciphertexts_is_unsupported() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(4));
    let y = program.add_input("y", encrypted_uint(4));
    let z = program
        .add_operation(NodeKind::Mul, &[x, y], encrypted_uint(4))
        .unwrap();
    program.mark_output(z).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedOperands {
            op: NodeTag::Mul,
            ..
        })
    ));
}

#[test]
fn signed_clear_operand_is_allowed() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(6));
    let k = program.add_input("k", clear_int(6));
    let y = program
        .add_operation(NodeKind::Mul, &[k, x], encrypted_uint(6))
        .unwrap();
    program.mark_output(y).unwrap();

    let func = lower(&program);
    let y = func.results()[0];

    assert_eq!(func.op(y).unwrap(), &HlfheOp::MulEintInt);
    assert_eq!(func.operands(y), vec![func.arguments()[0], func.arguments()[1]]);
}

#[test]
fn chains_lower_in_dependency_order() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(8));
    let mut acc = x;

    for i in 1..=4 {
        let c = program.add_constant(ConstantData::Scalar(i), clear_uint(8));
        let op = if i % 2 == 0 { NodeKind::Mul } else { NodeKind::Add };

        acc = program
            .add_operation(op, &[c, acc], encrypted_uint(8))
            .unwrap();
    }

    program.mark_output(acc).unwrap();

    let func = lower(&program);

    assert_eq!(body_len(&func), 8);
    assert_eq!(func.op(func.results()[0]).unwrap(), &HlfheOp::MulEintInt);
}
