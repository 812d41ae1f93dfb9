//! Embedding API.
//!
//! Free functions for the whole pipeline plus the context and compiled
//! expression types. This is the only module embedders need; everything
//! else is exposed for inspection and tooling.
//!
//! [`evaluate`] interprets the AST as parsed, so a fault like `1 / 0`
//! surfaces at run time. [`compile`] always optimizes first and reports
//! the same fault at compile time instead.

mod context;
mod error;
mod expression;
mod options;

pub use context::ExecutionContext;
pub use error::Error;
pub use expression::CompiledExpression;
pub use options::ExecutionOptions;

use ecow::EcoString;
use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::ast::Node;
use crate::compiler;
use crate::evaluator::Evaluator;
use crate::values::Value;

/// Parse source text into an AST. The AST may be cached and reused
/// across [`evaluate_ast`] and [`compile_ast`] calls.
pub fn parse(source: &str) -> Result<Node, Error> {
    let ast = crate::parser::parse(source)?;
    trace!(statements = ast.statements().count(), "parsed");
    Ok(ast)
}

/// Optimize an AST: constant folding, conditional folding and
/// dead-assignment elimination. Fails on constant expressions that
/// would fail on every run.
pub fn optimize(ast: &Node) -> Result<Node, Error> {
    Ok(crate::optimizer::optimize(ast)?)
}

/// Parse and interpret in one step.
pub fn evaluate(source: &str, ctx: &ExecutionContext) -> Result<Value, Error> {
    evaluate_ast(&parse(source)?, ctx)
}

/// Interpret an already-parsed AST with default options.
pub fn evaluate_ast(ast: &Node, ctx: &ExecutionContext) -> Result<Value, Error> {
    evaluate_ast_with(ast, ctx, &ExecutionOptions::default())
}

/// Interpret an already-parsed AST.
pub fn evaluate_ast_with(
    ast: &Node,
    ctx: &ExecutionContext,
    options: &ExecutionOptions,
) -> Result<Value, Error> {
    let value = Evaluator::new(ctx, options).evaluate(ast)?;
    debug!(%value, "evaluated");
    Ok(value)
}

/// Like [`evaluate`], but the result is the final value of every
/// variable instead of the last statement's value.
pub fn evaluate_scope(
    source: &str,
    ctx: &ExecutionContext,
) -> Result<HashMap<EcoString, Value>, Error> {
    evaluate_scope_ast(&parse(source)?, ctx)
}

pub fn evaluate_scope_ast(
    ast: &Node,
    ctx: &ExecutionContext,
) -> Result<HashMap<EcoString, Value>, Error> {
    let mut evaluator = Evaluator::new(ctx, &ExecutionOptions::default());
    evaluator.evaluate(ast)?;
    Ok(evaluator.into_scope())
}

/// Parse, optimize and compile to bytecode in one step.
pub fn compile(source: &str) -> Result<CompiledExpression, Error> {
    compile_ast(&parse(source)?)
}

/// Optimize and compile an already-parsed AST.
pub fn compile_ast(ast: &Node) -> Result<CompiledExpression, Error> {
    let optimized = crate::optimizer::optimize(ast)?;
    let code = compiler::compile(&optimized);
    debug!(
        instructions = code.instructions.len(),
        variables = code.variables.len(),
        max_stack = code.max_stack,
        "compiled"
    );
    Ok(CompiledExpression::new(code))
}
