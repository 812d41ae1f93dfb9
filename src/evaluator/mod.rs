//! Tree-walk evaluation.
//!
//! [`Evaluator`] walks an AST post-order against an
//! [`crate::api::ExecutionContext`], with two deviations from plain
//! post-order: `&&`/`||` short-circuit, and a conditional evaluates only
//! the selected branch. All operator dispatch is delegated to
//! [`operators`], which the VM and the constant folder share.

mod error;
mod eval;
pub mod operators;


pub use error::RuntimeError;
pub use eval::Evaluator;
