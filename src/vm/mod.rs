//! Stack-based virtual machine for compiled programs.
//!
//! [`Code`] is the immutable compiled form; [`run`] executes it against
//! an execution context. Operator semantics come from
//! [`crate::evaluator::operators`], so the VM and the tree-walk
//! evaluator cannot diverge.

mod code;
mod runtime;


pub use code::{BoolContext, Code, Instruction, VarSpec};
pub use runtime::run;
