//! Runtime error types, shared by the tree-walk evaluator and the VM.

use ecow::EcoString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: EcoString },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: EcoString },

    #[error("type error: {message}")]
    TypeMismatch { message: EcoString },

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("invalid range: {message}")]
    InvalidRange { message: EcoString },

    #[error("expression nesting exceeds the maximum depth of {max_depth}")]
    StackOverflow { max_depth: usize },

    /// A malformed compiled program. Unreachable for programs built by
    /// this crate's compiler.
    #[error("internal error: {message}")]
    Internal { message: EcoString },
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<EcoString>) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: impl Into<EcoString>) -> Self {
        RuntimeError::UndefinedVariable { name: name.into() }
    }

    pub fn undefined_function(name: impl Into<EcoString>) -> Self {
        RuntimeError::UndefinedFunction { name: name.into() }
    }
}
