//! The public error surface.
//!
//! Internal subsystems keep their own error types; everything is
//! converted into [`Error`] at the API boundary so embedders branch on
//! one enum.

use thiserror::Error;

use crate::evaluator::RuntimeError;
use crate::optimizer::CompileTimeError;
use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Lexical or syntactic fault, with a source byte offset.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A constant expression that fails on every evaluation, caught
    /// during optimization.
    #[error("compile error: {0}")]
    CompileTime(#[from] CompileTimeError),

    /// Evaluation-time fault: undefined names, type mismatches,
    /// arithmetic and range errors.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
