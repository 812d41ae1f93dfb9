//! Runtime values.
//!
//! [`Value`] is the dynamic value every expression evaluates to. Arrays are
//! homogeneous at the variant level; the check lives with the operator
//! semantics in [`crate::evaluator::operators`] so that literals and `+`
//! concatenation enforce it identically.
//!
//! Date/time values are opaque to the engine. Hosts inject them as trait
//! objects implementing [`Temporal`]; the engine only dispatches equality
//! and ordering through the trait and leaves construction and arithmetic
//! to host functions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ecow::{EcoString, EcoVec};

use crate::evaluator::RuntimeError;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(EcoString),
    Boolean(bool),
    Array(EcoVec<Value>),
    Temporal(Arc<dyn Temporal>),
}

/// The variant tag of a [`Value`], used for type checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Array,
    Temporal,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Temporal => "temporal",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Array(_) => ValueKind::Array,
            Value::Temporal(_) => ValueKind::Temporal,
        }
    }

    pub fn string(s: impl Into<EcoString>) -> Self {
        Value::String(s.into())
    }

    pub fn array(elements: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(elements.into_iter().collect())
    }
}

impl PartialEq for Value {
    /// Deep structural equality. Differently-tagged values compare unequal
    /// rather than erroring; `NaN != NaN` per IEEE 754.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.as_slice() == b.as_slice(),
            (Value::Temporal(a), Value::Temporal(b)) => a.temporal_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Temporal(t) => write!(f, "{t}"),
        }
    }
}

/// Sub-kind of a temporal value. Ordering is only defined between values of
/// the same sub-kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

/// Capability interface for host-supplied date/time values.
///
/// The engine never constructs or computes with temporals; it only needs
/// equality and ordering for `==`/`!=` and `<`/`<=`/`>`/`>=` dispatch.
/// Implementations are expected to return `None` from [`Temporal::temporal_cmp`]
/// when `other` is a different concrete type or a different [`TemporalKind`].
pub trait Temporal: fmt::Debug + fmt::Display + Send + Sync {
    fn kind(&self) -> TemporalKind;

    fn temporal_eq(&self, other: &dyn Temporal) -> bool;

    fn temporal_cmp(&self, other: &dyn Temporal) -> Option<Ordering>;
}

/// A host function callable from formulas.
///
/// Functions receive their arguments positionally, already evaluated left
/// to right, and either produce a value or fail the whole evaluation.
#[derive(Clone)]
pub struct NativeFunction(
    Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>,
);

impl NativeFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.0)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFunction(..)")
    }
}
