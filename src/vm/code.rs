//! Compiled program representation.

use std::fmt;

use ecow::EcoString;

use crate::ast::{BinaryOp, UnaryOp};
use crate::values::Value;

/// One VM instruction. Operands index into the sibling tables on
/// [`Code`]; jump targets are absolute instruction indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Push `constants[n]`.
    Const(u32),
    /// Push the value of variable slot `n`; an uninitialized slot is an
    /// undefined-variable error.
    LoadVar(u32),
    /// Pop the computed value and assign slot `n`. An external slot keeps
    /// the host's value and pushes it back instead of the popped one.
    Assign(u32),
    /// Discard the top of stack.
    Pop,
    Jump(u32),
    /// Pop a boolean condition; jump when false.
    JumpIfFalse(u32),
    /// Bool-check the top of stack without popping; jump when false.
    JumpIfFalseNoPop(u32),
    /// Bool-check the top of stack without popping; jump when true.
    JumpIfTrueNoPop(u32),
    /// Bool-check the top of stack in the given context, leaving it.
    AssertBool(BoolContext),
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// Pop `n` elements, push them as one homogeneity-checked array.
    MakeArray(u32),
    /// Pop end then start, push the materialized range array.
    MakeRange { inclusive: bool },
    /// Pop index then object, push the element.
    Index,
    /// Fail unless `functions[n]` resolves in the execution context.
    /// Emitted before argument code so the lookup error precedes any
    /// argument side effect, as in the tree-walk evaluator.
    CheckFunction(u32),
    /// Pop `argc` arguments and invoke `functions[function]`.
    Call { function: u32, argc: u32 },
    /// Stop; the top of stack is the program's value.
    Return,
}

/// Where a boolean was required, for error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolContext {
    And,
    Or,
    Condition,
}

impl BoolContext {
    pub(crate) fn role(self) -> &'static str {
        match self {
            BoolContext::And => "'&&'",
            BoolContext::Or => "'||'",
            BoolContext::Condition => "a condition",
        }
    }
}

/// A variable slot: its source name plus an optional initial value for
/// the single-literal-assignment specialization. At execution start a
/// slot takes the context's value for the name if present, else this
/// default, else stays uninitialized.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub name: EcoString,
    pub default: Option<Value>,
}

/// A compiled, immutable program: instructions plus the constant,
/// variable and function tables they index. Built once, executed many
/// times; every execution gets fresh slots and a fresh stack.
#[derive(Clone, PartialEq)]
pub struct Code {
    pub constants: Vec<Value>,
    pub instructions: Vec<Instruction>,
    pub variables: Vec<VarSpec>,
    pub functions: Vec<EcoString>,
    pub max_stack: usize,
}

impl fmt::Debug for Code {
    /// Disassembly-style listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code (max_stack = {}):", self.max_stack)?;
        if !self.constants.is_empty() {
            writeln!(f, "  constants:")?;
            for (i, value) in self.constants.iter().enumerate() {
                writeln!(f, "    [{i}] {value:?}")?;
            }
        }
        if !self.variables.is_empty() {
            writeln!(f, "  variables:")?;
            for (i, spec) in self.variables.iter().enumerate() {
                match &spec.default {
                    Some(default) => {
                        writeln!(f, "    [{i}] {} (default {default:?})", spec.name)?
                    }
                    None => writeln!(f, "    [{i}] {}", spec.name)?,
                }
            }
        }
        if !self.functions.is_empty() {
            writeln!(f, "  functions:")?;
            for (i, name) in self.functions.iter().enumerate() {
                writeln!(f, "    [{i}] {name}")?;
            }
        }
        writeln!(f, "  instructions:")?;
        for (i, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "    {i:>4}: {instruction:?}")?;
        }
        Ok(())
    }
}
