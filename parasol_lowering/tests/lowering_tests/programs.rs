use parasol_hlfhe::{HlfheOp, Type};
use parasol_lowering::{
    ConstantData, Error, LookupTable, LoweringOptions, NodeKind, OpGraph, lower_program,
    test_utils::*,
};

use crate::{body_len, init_logger, lower};

fn add_five(clear_first: bool) -> OpGraph {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(8));
    let five = program.add_constant(ConstantData::Scalar(5), clear_uint(8));

    let operands = if clear_first { [five, x] } else { [x, five] };

    let y = program
        .add_operation(NodeKind::Add, &operands, encrypted_uint(8))
        .unwrap();
    program.mark_output(y).unwrap();

    program
}

#[test]
fn can_lower_add_constant() {
    for clear_first in [false, true] {
        let func = lower(&add_five(clear_first));

        assert_eq!(body_len(&func), 2);
        assert_eq!(func.arguments().len(), 1);

        let y = func.results()[0];
        let operands = func.operands(y);

        assert_eq!(func.op(y).unwrap(), &HlfheOp::AddEintInt);
        assert_eq!(operands[0], func.arguments()[0]);

        match func.op(operands[1]).unwrap() {
            HlfheOp::Constant(attr) => assert_eq!(attr.to_string(), "5 : i8"),
            op => panic!("expected a constant, found {op:?}"),
        }

        assert_eq!(
            func.to_string(),
            "func @main(%arg0: !HLFHE.eint<8>) -> (!HLFHE.eint<8>) {\n  \
             %1 = \"std.constant\"() {value = 5 : i8} : () -> i8\n  \
             %2 = \"HLFHE.add_eint_int\"(%arg0, %1) : (!HLFHE.eint<8>, i8) -> !HLFHE.eint<8>\n  \
             \"return\"(%2) : (!HLFHE.eint<8>) -> ()\n\
             }"
        );
    }
}

#[test]
fn lowering_is_deterministic() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(3));
    let y = program.add_input("y", encrypted_uint(3));
    let s = program
        .add_operation(NodeKind::Add, &[x, y], encrypted_uint(3))
        .unwrap();
    let t = program
        .add_univariate_function(LookupTable::from_fn(3, |v| 7 - v), s, encrypted_uint(3))
        .unwrap();
    program.mark_output(s).unwrap();
    program.mark_output(t).unwrap();

    assert_eq!(lower(&program).to_string(), lower(&program).to_string());
}

#[test]
fn graphs_survive_serialization() {
    let program = add_five(true);
    let json = program.to_json().unwrap();
    let restored = OpGraph::from_json(&json).unwrap();

    assert_eq!(lower(&program).to_string(), lower(&restored).to_string());
}

#[test]
fn function_name_comes_from_options() {
    init_logger();

    let options = LoweringOptions::from_json(r#"{ "function_name": "add_five" }"#).unwrap();
    let func = lower_program(&add_five(false), &options).unwrap();

    assert_eq!(func.name(), "add_five");
    assert!(func.to_string().starts_with("func @add_five("));
}

#[test]
fn clear_inputs_become_integer_arguments() {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(4));
    let k = program.add_input("k", clear_uint(4));
    program.add_input("w", clear_uint_vector(4, 2));
    let y = program
        .add_operation(NodeKind::Sub, &[k, x], encrypted_uint(4))
        .unwrap();
    program.mark_output(y).unwrap();

    let func = lower(&program);
    let types = func
        .arguments()
        .iter()
        .map(|a| func.value_type(*a).unwrap().clone())
        .collect::<Vec<_>>();

    assert_eq!(
        types,
        vec![
            Type::EncryptedInteger(4),
            Type::Integer(4),
            Type::ranked_tensor(&[2], Type::Integer(4)),
        ]
    );
}

#[test]
fn signed_encrypted_inputs_are_rejected() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_int(4));
    program.mark_output(x).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedInput { name, .. }) if name == "x"
    ));
}

#[test]
fn lowering_stops_at_first_failure() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(4));
    let y = program.add_input("y", encrypted_uint(4));
    let z = program
        .add_operation(NodeKind::Mul, &[x, y], encrypted_uint(4))
        .unwrap();
    let c = program.add_constant(ConstantData::Scalar(2), clear_uint(4));
    let w = program
        .add_operation(NodeKind::Add, &[z, c], encrypted_uint(4))
        .unwrap();
    program.mark_output(w).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedOperands {
            op: parasol_lowering::NodeTag::Mul,
            ..
        })
    ));
}
