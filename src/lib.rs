//! Formulet is a small embeddable formula language.
//!
//! Source text is tokenized, parsed into an AST with a precedence-climbing
//! (Pratt) parser, optionally optimized (constant folding, conditional
//! folding, dead-assignment elimination), and then either tree-walk
//! interpreted or compiled to a compact bytecode program for fast repeated
//! execution against varying host contexts.
//!
//! ## Design Principles
//!
//! - **Never panic**: adversarial formulas produce errors, not crashes
//! - **One semantics**: the interpreter, the VM and the constant folder all
//!   dispatch through the same operator module, so they cannot disagree
//! - **External override**: a variable supplied by the host wins over a
//!   script's own assignment to that name, while the assignment's
//!   right-hand side is still evaluated for its side effects
//!
//! ## Example
//!
//! ```
//! use formulet::{compile, evaluate, ExecutionContext, Value};
//!
//! let ctx = ExecutionContext::new()
//!     .with_variable("base_price", Value::Number(40.0));
//!
//! // One-shot interpretation.
//! let result = evaluate("base_price * 1.05", &ctx).unwrap();
//! assert_eq!(result, Value::Number(42.0));
//!
//! // Compile once, execute many times.
//! let expr = compile("base_price * 1.05").unwrap();
//! let result = expr.execute(&ctx).unwrap();
//! assert_eq!(result, Value::Number(42.0));
//! ```

pub mod api;
pub mod ast;
pub mod compiler;
pub mod evaluator;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod values;
pub mod visitor;
pub mod vm;

pub use api::{
    compile, compile_ast, evaluate, evaluate_ast, evaluate_scope, evaluate_scope_ast, optimize,
    parse, CompiledExpression, Error, ExecutionContext, ExecutionOptions,
};
pub use values::{NativeFunction, Temporal, TemporalKind, Value, ValueKind};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_folding() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
