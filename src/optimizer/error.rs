//! Compile-time error type.

use thiserror::Error;

use crate::evaluator::RuntimeError;

/// A fault detected statically: a constant subexpression that would fail
/// on every evaluation (constant division by zero, a constant non-boolean
/// condition, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("in constant expression: {0}")]
pub struct CompileTimeError(#[from] pub RuntimeError);
