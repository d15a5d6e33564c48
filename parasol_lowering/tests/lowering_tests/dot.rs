use parasol_hlfhe::{HlfheOp, Type};
use parasol_lowering::{
    ConstantData, Error, LoweringOptions, NodeKind, NodeTag, OpGraph, lower_program,
    test_utils::*,
};

use crate::{init_logger, lower};

fn dot_program(clear_first: bool, encrypted_weights: bool) -> OpGraph {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint_vector(5, 4));

    let w = if encrypted_weights {
        program.add_input("w", encrypted_uint_vector(5, 4))
    } else {
        program.add_constant(ConstantData::Tensor(vec![1, 0, 2, 3]), clear_uint_vector(5, 4))
    };

    let operands = if clear_first { [w, x] } else { [x, w] };

    let y = program
        .add_operation(NodeKind::Dot, &operands, encrypted_uint(5))
        .unwrap();
    program.mark_output(y).unwrap();

    program
}

#[test]
fn dot_in_either_order() {
    let a = lower(&dot_program(false, false));
    let b = lower(&dot_program(true, false));

    assert_eq!(a.to_string(), b.to_string());

    let y = a.results()[0];

    assert_eq!(a.op(y).unwrap(), &HlfheOp::DotEintInt);
    assert_eq!(a.value_type(y).unwrap(), &Type::EncryptedInteger(5));
    assert_eq!(a.operands(y)[0], a.arguments()[0]);
}

#[test]
fn encrypted_dot_is_unsupported() {
    init_logger();

    assert!(matches!(
        lower_program(&dot_program(false, true), &LoweringOptions::default()),
        Err(Error::UnsupportedOperands { .. })
    ));
}

#[test]
fn scalar_dot_is_unsupported() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(5));
    let c = program.add_constant(ConstantData::Scalar(3), clear_uint(5));
    let y = program
        .add_operation(NodeKind::Dot, &[x, c], encrypted_uint(5))
        .unwrap();
    program.mark_output(y).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedOperands { .. })
    ));
}

#[test]
fn clear_dot_is_unsupported() {
    init_logger();

    let mut program = OpGraph::new();
    let a = program.add_input("a", clear_uint_vector(4, 3));
    let b = program.add_constant(ConstantData::Tensor(vec![1, 2, 3]), clear_uint_vector(4, 3));
    let y = program
        .add_operation(NodeKind::Dot, &[a, b], encrypted_uint(4))
        .unwrap();
    program.mark_output(y).unwrap();

    let err = lower_program(&program, &LoweringOptions::default()).unwrap_err();

    match &err {
        Error::UnsupportedOperands { op, lhs, rhs } => {
            assert_eq!(*op, NodeTag::Dot);
            assert_eq!(lhs, "ClearTensor<uint4, shape=[3]>");
            assert_eq!(rhs, "ClearTensor<uint4, shape=[3]>");
        }
        _ => panic!("unexpected error {err:?}"),
    }
}
