use std::fmt;

use itertools::Itertools;
use log::trace;
use petgraph::{Direction, stable_graph::NodeIndex, stable_graph::StableGraph, visit::EdgeRef};

use crate::{Attribute, Error, Result, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A handle to the SSA value produced by an instruction in an [`HlfheFunction`].
pub struct Value(NodeIndex);

impl Value {
    /// The position of the producing instruction in emission order.
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An operation in an [`HlfheFunction`].
pub enum HlfheOp {
    /// The `i`th argument of the function, where `i` is the contained member.
    Argument(usize),

    /// A compile-time literal.
    Constant(Attribute),

    /// Add a clear integer to an encrypted integer. Operands are (encrypted, clear).
    AddEintInt,

    /// Add two encrypted integers.
    AddEint,

    /// Subtract an encrypted integer from a clear integer. Operands are (clear, encrypted).
    SubIntEint,

    /// Multiply an encrypted integer by a clear integer. Operands are (encrypted, clear).
    MulEintInt,

    /// Evaluate a lookup table on an encrypted integer. Operands are (encrypted, table).
    ApplyLookupTableEint,

    /// The dot product of an encrypted and a clear vector. Operands are (encrypted, clear).
    DotEintInt,

    /// Return the operands from the function.
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandClass {
    EncryptedInteger,
    ClearInteger,
    EncryptedVector,
    ClearVector,
}

impl OperandClass {
    fn accepts(&self, ty: &Type) -> bool {
        match self {
            Self::EncryptedInteger => ty.is_encrypted_integer(),
            Self::ClearInteger => ty.is_integer(),
            Self::EncryptedVector => ty.is_vector_of(Type::is_encrypted_integer),
            Self::ClearVector => ty.is_vector_of(Type::is_integer),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::EncryptedInteger => "an encrypted integer",
            Self::ClearInteger => "a clear integer",
            Self::EncryptedVector => "a 1-D tensor of encrypted integers",
            Self::ClearVector => "a 1-D tensor of clear integers",
        }
    }
}

impl HlfheOp {
    /// The textual name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::Constant(_) => "std.constant",
            Self::AddEintInt => "HLFHE.add_eint_int",
            Self::AddEint => "HLFHE.add_eint",
            Self::SubIntEint => "HLFHE.sub_int_eint",
            Self::MulEintInt => "HLFHE.mul_eint_int",
            Self::ApplyLookupTableEint => "HLFHE.apply_lookup_table",
            Self::DotEintInt => "HLFHE.dot_eint_int",
            Self::Return => "return",
        }
    }

    fn signature(&self) -> &'static [OperandClass] {
        use OperandClass::*;

        match self {
            Self::AddEintInt | Self::MulEintInt => &[EncryptedInteger, ClearInteger],
            Self::AddEint => &[EncryptedInteger, EncryptedInteger],
            Self::SubIntEint => &[ClearInteger, EncryptedInteger],
            Self::ApplyLookupTableEint => &[EncryptedInteger, ClearVector],
            Self::DotEintInt => &[EncryptedVector, ClearVector],
            Self::Argument(_) | Self::Constant(_) | Self::Return => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A node in an [`HlfheFunction`]'s body.
pub struct Instruction {
    /// The operation.
    pub op: HlfheOp,

    /// The type of the produced value. [`HlfheOp::Return`] produces nothing.
    pub result: Option<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Connects a value to the operand at the contained position of its consumer.
pub struct OperandEdge(pub usize);

#[derive(Debug, Clone)]
/// A function body of HLFHE instructions in SSA form.
///
/// # Remarks
/// Instructions are verified as they're emitted; a failed emission leaves the function
/// unchanged. Instructions appear in the underlying graph in emission order.
pub struct HlfheFunction {
    name: String,
    graph: StableGraph<Instruction, OperandEdge>,
    arguments: Vec<Value>,
    results: Option<Vec<Value>>,
}

impl HlfheFunction {
    /// Create an empty function with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: StableGraph::new(),
            arguments: vec![],
            results: None,
        }
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The DAG of instructions.
    pub fn graph(&self) -> &StableGraph<Instruction, OperandEdge> {
        &self.graph
    }

    /// The function's arguments in order.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// The returned values, or an empty slice if the function hasn't returned yet.
    pub fn results(&self) -> &[Value] {
        self.results.as_deref().unwrap_or_default()
    }

    /// The operations in emission order.
    pub fn operations(&self) -> impl Iterator<Item = (Value, &Instruction)> {
        self.graph
            .node_indices()
            .map(|n| (Value(n), &self.graph[n]))
    }

    /// The operation that produced `value`.
    pub fn op(&self, value: Value) -> Result<&HlfheOp> {
        self.graph
            .node_weight(value.0)
            .map(|i| &i.op)
            .ok_or(Error::UnknownValue(value.index()))
    }

    /// The type of `value`.
    pub fn value_type(&self, value: Value) -> Result<&Type> {
        self.graph
            .node_weight(value.0)
            .and_then(|i| i.result.as_ref())
            .ok_or(Error::UnknownValue(value.index()))
    }

    /// The operands of the instruction that produced `value`, in position order.
    pub fn operands(&self, value: Value) -> Vec<Value> {
        self.graph
            .edges_directed(value.0, Direction::Incoming)
            .map(|e| (*e.weight(), Value(e.source())))
            .sorted()
            .map(|(_, v)| v)
            .collect()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.results.is_some() {
            Err(Error::AlreadyTerminated(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, op: HlfheOp, result: Option<Type>, operands: &[Value]) -> NodeIndex {
        trace!(
            "{}: emitting {} ({})",
            self.name,
            op.name(),
            operands.iter().map(|v| v.index()).join(", ")
        );

        let node = self.graph.add_node(Instruction { op, result });

        for (i, operand) in operands.iter().enumerate() {
            self.graph.add_edge(operand.0, node, OperandEdge(i));
        }

        node
    }

    /// Append an argument of type `ty` to the function's signature.
    pub fn add_argument(&mut self, ty: Type) -> Result<Value> {
        self.ensure_open()?;

        let position = self.arguments.len();
        let value = Value(self.insert(HlfheOp::Argument(position), Some(ty), &[]));
        self.arguments.push(value);

        Ok(value)
    }

    /// Emit a constant holding `attr`.
    pub fn constant(&mut self, attr: Attribute) -> Result<Value> {
        self.ensure_open()?;

        let ty = attr.ty().clone();

        Ok(Value(self.insert(HlfheOp::Constant(attr), Some(ty), &[])))
    }

    fn emit_encrypted(&mut self, op: HlfheOp, result: Type, operands: &[Value]) -> Result<Value> {
        self.ensure_open()?;

        let name = op.name();
        let signature = op.signature();

        let types = operands
            .iter()
            .map(|v| self.value_type(*v).cloned())
            .collect::<Result<Vec<_>>>()?;

        debug_assert_eq!(signature.len(), types.len());

        for (position, (class, ty)) in signature.iter().zip(types.iter()).enumerate() {
            if !class.accepts(ty) {
                return Err(Error::OperandType {
                    op: name,
                    position,
                    expected: class.describe(),
                    found: ty.clone(),
                });
            }
        }

        if !result.is_encrypted_integer() {
            return Err(Error::ResultType {
                op: name,
                expected: "an encrypted integer",
                found: result,
            });
        }

        Ok(Value(self.insert(op, Some(result), operands)))
    }

    /// Emit `HLFHE.add_eint_int`.
    pub fn add_eint_int(&mut self, result: Type, lhs: Value, rhs: Value) -> Result<Value> {
        self.emit_encrypted(HlfheOp::AddEintInt, result, &[lhs, rhs])
    }

    /// Emit `HLFHE.add_eint`.
    pub fn add_eint(&mut self, result: Type, lhs: Value, rhs: Value) -> Result<Value> {
        self.emit_encrypted(HlfheOp::AddEint, result, &[lhs, rhs])
    }

    /// Emit `HLFHE.sub_int_eint`.
    pub fn sub_int_eint(&mut self, result: Type, lhs: Value, rhs: Value) -> Result<Value> {
        self.emit_encrypted(HlfheOp::SubIntEint, result, &[lhs, rhs])
    }

    /// Emit `HLFHE.mul_eint_int`.
    pub fn mul_eint_int(&mut self, result: Type, lhs: Value, rhs: Value) -> Result<Value> {
        self.emit_encrypted(HlfheOp::MulEintInt, result, &[lhs, rhs])
    }

    /// Emit `HLFHE.apply_lookup_table`, indexing `table` with the encrypted `input`.
    pub fn apply_lookup_table(
        &mut self,
        result: Type,
        input: Value,
        table: Value,
    ) -> Result<Value> {
        self.emit_encrypted(HlfheOp::ApplyLookupTableEint, result, &[input, table])
    }

    /// Emit `HLFHE.dot_eint_int`.
    ///
    /// # Remarks
    /// Both operands must be 1-D tensors of the same length.
    pub fn dot_eint_int(&mut self, result: Type, lhs: Value, rhs: Value) -> Result<Value> {
        let lhs_shape = self.value_type(lhs)?.shape().map(|s| s.to_owned());
        let rhs_shape = self.value_type(rhs)?.shape().map(|s| s.to_owned());

        if let (Some(l), Some(r)) = (&lhs_shape, &rhs_shape) {
            if l != r {
                return Err(Error::ShapeMismatch {
                    op: HlfheOp::DotEintInt.name(),
                    lhs: l.clone(),
                    rhs: r.clone(),
                });
            }
        }

        self.emit_encrypted(HlfheOp::DotEintInt, result, &[lhs, rhs])
    }

    /// Terminate the function, returning `values`.
    pub fn ret(&mut self, values: &[Value]) -> Result<()> {
        self.ensure_open()?;

        for v in values {
            self.value_type(*v)?;
        }

        self.insert(HlfheOp::Return, None, values);
        self.results = Some(values.to_owned());

        Ok(())
    }

    fn value_name(&self, value: Value) -> String {
        match self.graph.node_weight(value.0).map(|i| &i.op) {
            Some(HlfheOp::Argument(i)) => format!("%arg{i}"),
            _ => format!("%{}", value.index()),
        }
    }

    fn type_list(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| {
                self.value_type(*v)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|_| "<unknown>".to_owned())
            })
            .join(", ")
    }
}

impl fmt::Display for HlfheFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .arguments
            .iter()
            .map(|a| format!("{}: {}", self.value_name(*a), self.type_list(&[*a])))
            .join(", ");

        writeln!(
            f,
            "func @{}({args}) -> ({}) {{",
            self.name,
            self.type_list(self.results())
        )?;

        for (value, inst) in self.operations() {
            let operands = self.operands(value);
            let operand_names = operands.iter().map(|v| self.value_name(*v)).join(", ");
            let operand_types = self.type_list(&operands);

            match (&inst.op, &inst.result) {
                (HlfheOp::Argument(_), _) => continue,
                (HlfheOp::Constant(attr), Some(ty)) => writeln!(
                    f,
                    "  {} = \"{}\"() {{value = {attr}}} : () -> {ty}",
                    self.value_name(value),
                    inst.op.name()
                )?,
                (op, Some(ty)) => writeln!(
                    f,
                    "  {} = \"{}\"({operand_names}) : ({operand_types}) -> {ty}",
                    self.value_name(value),
                    op.name()
                )?,
                (op, None) => writeln!(
                    f,
                    "  \"{}\"({operand_names}) : ({operand_types}) -> ()",
                    op.name()
                )?,
            }
        }

        write!(f, "}}")
    }
}
