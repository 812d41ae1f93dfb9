//! Evaluation options.

/// Knobs for one evaluation run.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum AST nesting depth the evaluator will recurse into before
    /// failing with a stack-overflow error. Keeps adversarially deep
    /// expressions from exhausting the native stack.
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}
