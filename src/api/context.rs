//! Host-supplied evaluation context.

use ecow::EcoString;
use hashbrown::HashMap;

use crate::values::{NativeFunction, Value};

/// Variables and functions the host makes available to a formula.
///
/// Variables supplied here are external: a formula may assign to the
/// same name, but the host's value wins (the assignment's right-hand
/// side still runs). Functions live in their own namespace, so a
/// variable can never shadow a function.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    variables: HashMap<EcoString, Value>,
    functions: HashMap<EcoString, NativeFunction>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<EcoString>, value: Value) -> Self {
        self.set_variable(name, value);
        self
    }

    pub fn with_function(mut self, name: impl Into<EcoString>, function: NativeFunction) -> Self {
        self.set_function(name, function);
        self
    }

    pub fn set_variable(&mut self, name: impl Into<EcoString>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn set_function(&mut self, name: impl Into<EcoString>, function: NativeFunction) {
        self.functions.insert(name.into(), function);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&EcoString, &Value)> {
        self.variables.iter()
    }
}
