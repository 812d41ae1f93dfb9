//! AST optimization: constant folding, conditional folding and
//! dead-assignment elimination.
//!
//! The pass is sound and local. Folding reuses the operator semantics
//! from [`crate::evaluator::operators`], so a folded result is exactly
//! what the evaluator would have produced. A constant subexpression that
//! fails is a [`CompileTimeError`] only when the expression is certain
//! to be evaluated; inside the branch of a non-constant conditional or
//! the right side of `&&`/`||` it is kept unfolded instead, because the
//! interpreter might never reach it.
//!
//! What the pass never does: propagate a variable's value across
//! statements, or assume a script assignment wins over the host context.
//! Both are runtime-only facts under the external-override rule, so only
//! structurally dead assignments are touched and constants are folded
//! strictly within one expression.

mod error;

#[cfg(test)]
mod tests;

pub use error::CompileTimeError;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::evaluator::{operators, RuntimeError};
use crate::values::Value;
use crate::visitor::{has_side_effects, reads_variable, Transformer};

/// Optimize an AST, producing a fresh tree. Idempotent.
pub fn optimize(ast: &Node) -> Result<Node, CompileTimeError> {
    Folder { guarded: 0 }.transform(ast)
}

/// `guarded` counts how many enclosing positions might be skipped at
/// run time; while non-zero, fold failures keep the node instead of
/// failing the compilation.
struct Folder {
    guarded: usize,
}

impl Transformer for Folder {
    type Output = Result<Node, CompileTimeError>;

    fn transform(&mut self, node: &Node) -> Self::Output {
        match node {
            Node::Program(statements) => {
                let folded = statements
                    .iter()
                    .map(|s| self.transform(s))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(eliminate_dead_assignments(folded))
            }
            Node::Number(_) | Node::String(_) | Node::Boolean(_) | Node::Identifier(_) => {
                Ok(node.clone())
            }
            Node::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.transform(e))
                    .collect::<Result<_, _>>()?;
                Ok(Node::Array(elements))
            }
            Node::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => self.fold_logical(*op, left, right),
            Node::Binary { op, left, right } => {
                let left = self.transform(left)?;
                let right = self.transform(right)?;
                self.fold_binary(*op, left, right)
            }
            Node::Unary { op, operand } => {
                let operand = self.transform(operand)?;
                self.fold_unary(*op, operand)
            }
            Node::Call { name, args } => {
                // Functions are opaque: arguments fold, the call never does.
                let args = args
                    .iter()
                    .map(|a| self.transform(a))
                    .collect::<Result<_, _>>()?;
                Ok(Node::Call {
                    name: name.clone(),
                    args,
                })
            }
            Node::Assignment { name, value } => {
                let value = self.transform(value)?;
                Ok(Node::assignment(name.clone(), value))
            }
            Node::Conditional {
                condition,
                consequent,
                alternate,
            } => self.fold_conditional(condition, consequent, alternate),
            Node::Index { object, index } => {
                let object = self.transform(object)?;
                let index = self.transform(index)?;
                Ok(Node::index(object, index))
            }
            Node::Range {
                start,
                end,
                inclusive,
            } => {
                let start = self.transform(start)?;
                let end = self.transform(end)?;
                if let (Some(s), Some(e)) = (start.as_constant(), end.as_constant()) {
                    match operators::make_range(&s, &e, *inclusive) {
                        Ok(value) => {
                            if let Some(folded) = literal(&value) {
                                return Ok(folded);
                            }
                        }
                        Err(fault) => self.fail_if_certain(fault)?,
                    }
                }
                Ok(Node::range(start, end, *inclusive))
            }
        }
    }
}

impl Folder {
    /// Raise a fold-time fault only when the failing expression is
    /// certain to be evaluated; otherwise leave it for run time.
    fn fail_if_certain(&self, fault: RuntimeError) -> Result<(), CompileTimeError> {
        if self.guarded == 0 {
            Err(CompileTimeError(fault))
        } else {
            Ok(())
        }
    }

    fn transform_guarded(&mut self, node: &Node) -> Result<Node, CompileTimeError> {
        self.guarded += 1;
        let result = self.transform(node);
        self.guarded -= 1;
        result
    }

    fn fold_binary(
        &mut self,
        op: BinaryOp,
        left: Node,
        right: Node,
    ) -> Result<Node, CompileTimeError> {
        if let (Some(l), Some(r)) = (left.as_constant(), right.as_constant()) {
            match operators::binary(op, &l, &r) {
                Ok(value) => {
                    if let Some(folded) = literal(&value) {
                        return Ok(folded);
                    }
                }
                Err(fault) => self.fail_if_certain(fault)?,
            }
        }
        Ok(Node::binary(op, left, right))
    }

    fn fold_unary(&mut self, op: UnaryOp, operand: Node) -> Result<Node, CompileTimeError> {
        if let Some(v) = operand.as_constant() {
            match operators::unary(op, &v) {
                Ok(value) => {
                    if let Some(folded) = literal(&value) {
                        return Ok(folded);
                    }
                }
                Err(fault) => self.fail_if_certain(fault)?,
            }
        }
        Ok(Node::unary(op, operand))
    }

    /// `&&`/`||` fold only in ways the short circuit makes sound: a
    /// deciding constant left side replaces the whole expression even if
    /// the right side has effects (the evaluator would skip it too),
    /// while the right side is treated as a maybe-skipped position.
    fn fold_logical(
        &mut self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
    ) -> Result<Node, CompileTimeError> {
        let role = if op == BinaryOp::And { "'&&'" } else { "'||'" };
        let left = self.transform(left)?;

        if let Some(l) = left.as_constant() {
            match operators::boolean_operand(&l, role) {
                Ok(l) => {
                    let decided = match op {
                        BinaryOp::And => !l,
                        _ => l,
                    };
                    if decided {
                        return Ok(Node::Boolean(l));
                    }
                    // Not decided: the right side always runs, so it is
                    // not a guarded position here.
                    let right = self.transform(right)?;
                    if let Some(r) = right.as_constant() {
                        match operators::boolean_operand(&r, role) {
                            Ok(r) => return Ok(Node::Boolean(r)),
                            Err(fault) => self.fail_if_certain(fault)?,
                        }
                    }
                    return Ok(Node::binary(op, left, right));
                }
                Err(fault) => self.fail_if_certain(fault)?,
            }
        }

        let right = self.transform_guarded(right)?;
        Ok(Node::binary(op, left, right))
    }

    fn fold_conditional(
        &mut self,
        condition: &Node,
        consequent: &Node,
        alternate: &Node,
    ) -> Result<Node, CompileTimeError> {
        let condition = self.transform(condition)?;
        if let Some(v) = condition.as_constant() {
            match operators::boolean_operand(&v, "a condition") {
                // A constant condition selects its branch now; the dead
                // branch is dropped without being folded.
                Ok(taken) => {
                    return self.transform(if taken { consequent } else { alternate });
                }
                Err(fault) => self.fail_if_certain(fault)?,
            }
        }
        let consequent = self.transform_guarded(consequent)?;
        let alternate = self.transform_guarded(alternate)?;
        Ok(Node::conditional(condition, consequent, alternate))
    }
}

/// Drop assignments whose value is provably never observed: not the final
/// statement, never read later, and with an effect-free right-hand side.
/// Unwraps a program that shrinks to one statement.
fn eliminate_dead_assignments(statements: Vec<Node>) -> Node {
    let Some((final_statement, earlier)) = statements.split_last() else {
        return Node::Program(statements);
    };

    let mut kept = Vec::with_capacity(statements.len());
    for (i, statement) in earlier.iter().enumerate() {
        let dead = match statement {
            Node::Assignment { name, value } => {
                !has_side_effects(value)
                    && !statements[i + 1..]
                        .iter()
                        .any(|later| reads_variable(later, name))
            }
            _ => false,
        };
        if !dead {
            kept.push(statement.clone());
        }
    }

    if kept.is_empty() {
        final_statement.clone()
    } else {
        kept.push(final_statement.clone());
        Node::Program(kept)
    }
}

/// Rebuild a folded [`Value`] as a literal node. `None` for values with
/// no literal form (temporals), in which case the caller keeps the
/// unfolded expression.
fn literal(value: &Value) -> Option<Node> {
    match value {
        Value::Number(n) => Some(Node::Number(*n)),
        Value::String(s) => Some(Node::String(s.clone())),
        Value::Boolean(b) => Some(Node::Boolean(*b)),
        Value::Array(elements) => {
            let elements = elements.iter().map(literal).collect::<Option<_>>()?;
            Some(Node::Array(elements))
        }
        Value::Temporal(_) => None,
    }
}
