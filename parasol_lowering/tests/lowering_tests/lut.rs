use parasol_hlfhe::{HlfheOp, Type};
use parasol_lowering::{
    Error, LookupTable, LoweringOptions, OpGraph, lower_program, test_utils::*,
};

use crate::{body_len, init_logger, lower};

fn lut_program(table: LookupTable, in_width: u32, out_width: u32) -> OpGraph {
    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(in_width));
    let y = program
        .add_univariate_function(table, x, encrypted_uint(out_width))
        .unwrap();
    program.mark_output(y).unwrap();

    program
}

#[test]
fn lut_lowers_to_table_and_application() {
    let func = lower(&lut_program(LookupTable::new(vec![9, 2, 4, 11]), 2, 4));

    assert_eq!(body_len(&func), 2);

    let y = func.results()[0];
    let operands = func.operands(y);

    assert_eq!(func.op(y).unwrap(), &HlfheOp::ApplyLookupTableEint);
    assert_eq!(func.value_type(y).unwrap(), &Type::EncryptedInteger(4));
    assert_eq!(operands[0], func.arguments()[0]);

    match func.op(operands[1]).unwrap() {
        HlfheOp::Constant(attr) => {
            assert_eq!(attr.to_string(), "dense<[9, 2, 4, 11]> : tensor<4xi64>")
        }
        op => panic!("expected a constant table, found {op:?}"),
    }
}

#[test]
fn lut_from_fn() {
    let table = LookupTable::from_fn(3, |x| (x * x) % 8);
    let func = lower(&lut_program(table, 3, 3));

    let text = func.to_string();

    assert!(text.contains("dense<[0, 1, 4, 1, 0, 1, 4, 1]> : tensor<8xi64>"));
    assert!(text.contains("\"HLFHE.apply_lookup_table\""));
}

#[test]
fn domain_check_rejects_short_tables() {
    init_logger();

    let program = lut_program(LookupTable::new(vec![0, 1]), 2, 2);
    let options = LoweringOptions {
        check_table_domain: true,
        ..Default::default()
    };

    assert!(matches!(
        lower_program(&program, &options),
        Err(Error::TableDomain {
            bit_width: 2,
            len: 2
        })
    ));

    assert!(lower_program(&program, &LoweringOptions::default()).is_ok());
}

#[test]
fn clear_lut_input_is_rejected() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", clear_uint(2));
    let y = program
        .add_univariate_function(LookupTable::new(vec![0, 1, 2, 3]), x, encrypted_uint(2))
        .unwrap();
    program.mark_output(y).unwrap();

    assert!(matches!(
        lower_program(&program, &LoweringOptions::default()),
        Err(Error::UnsupportedLutInput(_))
    ));
}

#[test]
fn signed_lut_input_is_rejected() {
    init_logger();

    let mut program = OpGraph::new();
    let x = program.add_input("x", encrypted_uint(2));
    let y = program
        .add_univariate_function(LookupTable::new(vec![0, 1, 2, 3]), x, encrypted_uint(2))
        .unwrap();
    program.mark_output(y).unwrap();

    // Only the LUT sees the operand as signed; the argument itself stays unsigned.
    program.graph[y].inputs[0] = encrypted_int(2);

    let err = lower_program(&program, &LoweringOptions::default()).unwrap_err();

    assert!(matches!(err, Error::UnsupportedLutInput(_)));
    assert!(err.to_string().contains("EncryptedScalar<int2>"));
}
