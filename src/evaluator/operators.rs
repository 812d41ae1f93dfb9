//! Operator semantics.
//!
//! Every engine that applies an operator goes through this module: the
//! tree-walk evaluator, the VM and the optimizer's constant folder. That
//! is the whole soundness argument for folding and compilation, so no
//! caller may reimplement any rule locally.

use std::cmp::Ordering;

use ecow::{eco_format, EcoString, EcoVec};

use crate::ast::{BinaryOp, UnaryOp};
use crate::evaluator::RuntimeError;
use crate::values::Value;

/// Apply a binary operator to two already-evaluated operands.
///
/// `&&`/`||` are included with strict (non-short-circuit) semantics; the
/// evaluator and compiler implement the short circuit around this and
/// only reach here when both sides were evaluated anyway.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => arithmetic(op, left, right, |a, b| Ok(a - b)),
        BinaryOp::Mul => arithmetic(op, left, right, |a, b| Ok(a * b)),
        BinaryOp::Div => arithmetic(op, left, right, |a, b| {
            if b == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }),
        BinaryOp::Mod => arithmetic(op, left, right, |a, b| {
            if b == 0.0 {
                Err(RuntimeError::ModuloByZero)
            } else {
                Ok(a % b)
            }
        }),
        BinaryOp::Pow => arithmetic(op, left, right, |a, b| Ok(a.powf(b))),
        BinaryOp::Eq => Ok(Value::Boolean(left == right)),
        BinaryOp::Neq => Ok(Value::Boolean(left != right)),
        BinaryOp::Lt => ordered(op, left, right, Ordering::is_lt),
        BinaryOp::Gt => ordered(op, left, right, Ordering::is_gt),
        BinaryOp::Le => ordered(op, left, right, Ordering::is_le),
        BinaryOp::Ge => ordered(op, left, right, Ordering::is_ge),
        BinaryOp::And => {
            let (a, b) = boolean_pair(op, left, right)?;
            Ok(Value::Boolean(a && b))
        }
        BinaryOp::Or => {
            let (a, b) = boolean_pair(op, left, right)?;
            Ok(Value::Boolean(a || b))
        }
    }
}

/// Apply a unary operator to an already-evaluated operand.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Neg, other) => Err(RuntimeError::type_mismatch(eco_format!(
            "unary '-' requires a number, got {}",
            other.kind()
        ))),
        (UnaryOp::Not, other) => Err(RuntimeError::type_mismatch(eco_format!(
            "unary '!' requires a boolean, got {}",
            other.kind()
        ))),
    }
}

/// Require a boolean, in an operator or condition position named by `role`.
pub fn boolean_operand(value: &Value, role: &str) -> Result<bool, RuntimeError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(RuntimeError::type_mismatch(eco_format!(
            "{role} requires a boolean, got {}",
            other.kind()
        ))),
    }
}

/// Validate array homogeneity: every element must carry the same type tag.
pub fn check_homogeneous(elements: &[Value]) -> Result<(), RuntimeError> {
    let Some((first, rest)) = elements.split_first() else {
        return Ok(());
    };
    let expected = first.kind();
    for element in rest {
        if element.kind() != expected {
            return Err(RuntimeError::type_mismatch(eco_format!(
                "arrays must be homogeneous, found {} and {}",
                expected,
                element.kind()
            )));
        }
    }
    Ok(())
}

/// Index into an array. The index must be an integral number; negative
/// indices count back from the end.
pub fn index(object: &Value, idx: &Value) -> Result<Value, RuntimeError> {
    let Value::Array(elements) = object else {
        return Err(RuntimeError::type_mismatch(eco_format!(
            "cannot index into a {}",
            object.kind()
        )));
    };
    let raw = integral(idx, "array index")?;
    let len = elements.len();
    let resolved = if raw < 0 { raw + len as i64 } else { raw };
    let in_bounds = (0..len as i64).contains(&resolved);
    if !in_bounds {
        return Err(RuntimeError::IndexOutOfBounds { index: raw, len });
    }
    Ok(elements[resolved as usize].clone())
}

/// Widest range that will be materialized; anything larger is an
/// [`RuntimeError::InvalidRange`] instead of an attempt to allocate it.
const MAX_RANGE_LEN: i64 = 10_000_000;

/// Build an array from integral numeric bounds. A descending range is
/// empty, not an error; a range spanning more than [`MAX_RANGE_LEN`]
/// elements is one.
///
/// The bounds arrive through a saturating `f64` cast, so `end` can sit at
/// `i64::MIN` itself; every step here is checked rather than wrapping.
pub fn make_range(start: &Value, end: &Value, inclusive: bool) -> Result<Value, RuntimeError> {
    let start = integral(start, "range start")?;
    let end = integral(end, "range end")?;
    let last = match (inclusive, end.checked_sub(1)) {
        (true, _) => end,
        (false, Some(last)) => last,
        // No integer precedes the exclusive bound.
        (false, None) => return Ok(Value::Array(EcoVec::new())),
    };
    if start > last {
        return Ok(Value::Array(EcoVec::new()));
    }
    let span = last
        .checked_sub(start)
        .and_then(|width| width.checked_add(1))
        .filter(|span| *span <= MAX_RANGE_LEN)
        .ok_or_else(|| RuntimeError::InvalidRange {
            message: eco_format!("range spans more than {MAX_RANGE_LEN} elements"),
        })?;
    let mut elements = EcoVec::with_capacity(span as usize);
    for n in start..=last {
        elements.push(Value::Number(n as f64));
    }
    Ok(Value::Array(elements))
}

fn integral(value: &Value, role: &str) -> Result<i64, RuntimeError> {
    let Value::Number(n) = value else {
        return Err(RuntimeError::InvalidRange {
            message: eco_format!("{role} must be a number, got {}", value.kind()),
        });
    };
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(RuntimeError::InvalidRange {
            message: eco_format!("{role} must be an integer, got {n}"),
        });
    }
    Ok(*n as i64)
}

fn add(left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), Value::String(b)) => {
            let mut joined = EcoString::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::String(joined))
        }
        (Value::Array(a), Value::Array(b)) => {
            let mut joined = a.clone();
            joined.extend(b.iter().cloned());
            check_homogeneous(joined.as_slice())?;
            Ok(Value::Array(joined))
        }
        _ => Err(operand_mismatch(BinaryOp::Add, left, right)),
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    apply: impl FnOnce(f64, f64) -> Result<f64, RuntimeError>,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => apply(*a, *b).map(Value::Number),
        _ => Err(operand_mismatch(op, left, right)),
    }
}

/// Ordering comparison. Numbers, strings and same-sub-kind temporals are
/// ordered; any other pairing is a type error. An unordered numeric pair
/// (NaN) makes every comparison false.
fn ordered(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    accept: impl FnOnce(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Temporal(a), Value::Temporal(b)) => match a.temporal_cmp(b.as_ref()) {
            Some(ordering) => Some(ordering),
            None => {
                return Err(RuntimeError::type_mismatch(eco_format!(
                    "cannot compare temporal values of different kinds with '{op}'"
                )));
            }
        },
        _ => return Err(operand_mismatch(op, left, right)),
    };
    Ok(Value::Boolean(ordering.is_some_and(accept)))
}

fn boolean_pair(op: BinaryOp, left: &Value, right: &Value) -> Result<(bool, bool), RuntimeError> {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Ok((*a, *b)),
        _ => Err(operand_mismatch(op, left, right)),
    }
}

fn operand_mismatch(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(eco_format!(
        "cannot apply '{op}' to {} and {}",
        left.kind(),
        right.kind()
    ))
}
