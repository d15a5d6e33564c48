#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! This crate models the HLFHE instruction set: the small, asymmetric set of integer operations
//! over a mix of encrypted and plaintext values that arithmetic graphs get lowered onto.
//!
//! An [`HlfheFunction`] records instructions in SSA form. Each emission primitive (e.g.
//! [`HlfheFunction::add_eint_int`]) verifies its operand and result types before inserting
//! anything, so a failed emission never leaves a partial instruction behind.
//!
//! # Example
//! ```rust
//! use parasol_hlfhe::{Attribute, HlfheFunction, Type};
//!
//! let mut func = HlfheFunction::new("main");
//! let x = func.add_argument(Type::EncryptedInteger(8)).unwrap();
//! let five = func
//!     .constant(Attribute::integer(Type::Integer(8), 5).unwrap())
//!     .unwrap();
//! let sum = func.add_eint_int(Type::EncryptedInteger(8), x, five).unwrap();
//! func.ret(&[sum]).unwrap();
//!
//! println!("{func}");
//! ```

mod attribute;
mod error;
mod function;
mod parse;
mod types;

pub use attribute::*;
pub use error::*;
pub use function::*;
pub use types::*;
