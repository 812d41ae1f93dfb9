//! Compiled expression handle.

use tracing::trace;

use crate::api::{Error, ExecutionContext};
use crate::values::Value;
use crate::vm::{run, Code};

/// A formula compiled to bytecode: build once, execute many times.
///
/// The compiled program is immutable; every [`CompiledExpression::execute`]
/// call gets a fresh stack and fresh variable slots, so one instance may
/// be shared freely across threads.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    code: Code,
}

impl CompiledExpression {
    pub(crate) fn new(code: Code) -> Self {
        Self { code }
    }

    pub fn execute(&self, ctx: &ExecutionContext) -> Result<Value, Error> {
        let value = run(&self.code, ctx)?;
        trace!(%value, "executed");
        Ok(value)
    }

    /// The underlying program, mainly for inspection; its `Debug` output
    /// is a disassembly listing.
    pub fn code(&self) -> &Code {
        &self.code
    }
}
