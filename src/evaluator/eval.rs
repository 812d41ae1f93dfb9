use ecow::EcoString;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::api::{ExecutionContext, ExecutionOptions};
use crate::ast::{BinaryOp, Node};
use crate::evaluator::operators;
use crate::evaluator::RuntimeError;
use crate::values::Value;

/// One evaluation run: a mutable scope seeded from the context's
/// variables, consumed statement by statement.
///
/// Host-supplied variables are immutable from the script's point of view.
/// An assignment to such a name still evaluates its right-hand side, then
/// yields the host's value instead of the computed one.
pub struct Evaluator<'ctx> {
    ctx: &'ctx ExecutionContext,
    scope: HashMap<EcoString, Value>,
    depth: usize,
    max_depth: usize,
}

impl<'ctx> Evaluator<'ctx> {
    pub fn new(ctx: &'ctx ExecutionContext, options: &ExecutionOptions) -> Self {
        let scope = ctx
            .variables()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            ctx,
            scope,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    pub fn evaluate(&mut self, ast: &Node) -> Result<Value, RuntimeError> {
        self.eval(ast)
    }

    /// Final value of every variable after evaluation, external ones
    /// included.
    pub fn into_scope(self) -> HashMap<EcoString, Value> {
        self.scope
    }

    fn eval(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.eval_node(node);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        match node {
            Node::Program(statements) => {
                let mut result = None;
                for statement in statements {
                    result = Some(self.eval(statement)?);
                }
                // The parser never produces an empty program.
                result.ok_or_else(|| RuntimeError::type_mismatch("empty program has no value"))
            }
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::String(s) => Ok(Value::String(s.clone())),
            Node::Boolean(b) => Ok(Value::Boolean(*b)),
            Node::Array(element_nodes) => {
                let mut elements = ecow::EcoVec::with_capacity(element_nodes.len());
                for element in element_nodes {
                    elements.push(self.eval(element)?);
                }
                operators::check_homogeneous(elements.as_slice())?;
                Ok(Value::Array(elements))
            }
            Node::Identifier(name) => match self.scope.get(name.as_str()) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::undefined_variable(name.clone())),
            },
            Node::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => self.eval_short_circuit(*op, left, right),
            Node::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                operators::binary(*op, &left, &right)
            }
            Node::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                operators::unary(*op, &operand)
            }
            Node::Call { name, args } => {
                // Resolve the function before touching the arguments so an
                // unknown name fails before any argument side effect runs.
                let Some(function) = self.ctx.function(name).cloned() else {
                    return Err(RuntimeError::undefined_function(name.clone()));
                };
                let mut values: SmallVec<[Value; 4]> = SmallVec::new();
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                function.call(&values)
            }
            Node::Assignment { name, value } => {
                // The right-hand side always runs for its side effects.
                let computed = self.eval(value)?;
                if let Some(external) = self.ctx.variable(name) {
                    return Ok(external.clone());
                }
                self.scope.insert(name.clone(), computed.clone());
                Ok(computed)
            }
            Node::Conditional {
                condition,
                consequent,
                alternate,
            } => {
                let condition = self.eval(condition)?;
                if operators::boolean_operand(&condition, "a condition")? {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
            Node::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                operators::index(&object, &index)
            }
            Node::Range {
                start,
                end,
                inclusive,
            } => {
                let start = self.eval(start)?;
                let end = self.eval(end)?;
                operators::make_range(&start, &end, *inclusive)
            }
        }
    }

    fn eval_short_circuit(
        &mut self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
    ) -> Result<Value, RuntimeError> {
        let role = if op == BinaryOp::And { "'&&'" } else { "'||'" };
        let left = self.eval(left)?;
        let left = operators::boolean_operand(&left, role)?;
        let decided = match op {
            BinaryOp::And => !left,
            _ => left,
        };
        if decided {
            return Ok(Value::Boolean(left));
        }
        let right = self.eval(right)?;
        let right = operators::boolean_operand(&right, role)?;
        Ok(Value::Boolean(right))
    }
}
