use std::collections::HashMap;
use crate::shell::error::ShellError;
use crate::shell::value::Value;

/// Flat, process-wide variable store. Loops and assignments share it.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an already-resolved value. References must be resolved by the caller.
    pub fn store(&mut self, name: &str, value: Value) {
        debug_assert!(!matches!(value, Value::VariableRef(_)), "unresolved reference stored in {}", name);
        self.vars.insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Result<&Value, ShellError> {
        self.vars
            .get(name)
            .ok_or_else(|| ShellError::UndefinedVariable(name.to_string()))
    }

    /// Resolves a single level: references are looked up, everything else is returned as-is.
    pub fn resolve(&self, value: &Value) -> Result<Value, ShellError> {
        match value {
            Value::VariableRef(name) => self.lookup(name).cloned(),
            other => Ok(other.clone()),
        }
    }
}
