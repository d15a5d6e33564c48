#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! This crate lowers arithmetic graphs over a mix of encrypted and plaintext integers onto the
//! HLFHE instruction set modeled by [`parasol_hlfhe`].
//!
//! A front end describes a program as an [`OpGraph`] whose nodes carry [`ValueDescriptor`]s
//! for their operands and results. [`lower_program`] walks the graph in dependency order and,
//! for each node, asks the [`V0_OPSET`] [`ConversionTable`] to emit the matching backend
//! instruction. Operand order is normalized for commutative operations, so `5 + x` and `x + 5`
//! lower to the same `HLFHE.add_eint_int`.
//!
//! # Example
//!
//! ```rust
//! use parasol_lowering::{
//!     ConstantData, DataType, LoweringOptions, NodeKind, OpGraph, ValueDescriptor,
//!     lower_program,
//! };
//!
//! let mut program = OpGraph::new();
//!
//! let x = program.add_input("x", ValueDescriptor::encrypted_scalar(DataType::unsigned(8)));
//! let five = program.add_constant(
//!     ConstantData::Scalar(5),
//!     ValueDescriptor::clear_scalar(DataType::unsigned(8)),
//! );
//! let sum = program
//!     .add_operation(
//!         NodeKind::Add,
//!         &[five, x],
//!         ValueDescriptor::encrypted_scalar(DataType::unsigned(8)),
//!     )
//!     .unwrap();
//! program.mark_output(sum).unwrap();
//!
//! let func = lower_program(&program, &LoweringOptions::default()).unwrap();
//!
//! println!("{func}");
//! ```

mod config;

/// Materializes integer literals as backend constants.
pub mod constant;
mod dispatch;
mod error;
mod graph;
mod graph_ops;
mod program;
mod registry;

/// Encodes lookup tables as backend tensor literals.
pub mod table;

#[doc(hidden)]
pub mod test_utils;
mod values;

pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use graph::*;
pub use graph_ops::*;
pub use program::*;
pub use registry::*;
pub use values::*;
