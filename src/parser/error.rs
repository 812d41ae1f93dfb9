//! Parse error types.

use thiserror::Error;

use crate::lexer::LexError;

/// Any failure while turning source text into an AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexError),

    #[error("{kind} at offset {offset}")]
    Syntax { kind: SyntaxErrorKind, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("missing closing {expected}")]
    MissingClosing { expected: &'static str },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("empty program")]
    EmptyProgram,

    #[error("invalid number literal")]
    InvalidNumber,

    #[error("expression nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}
