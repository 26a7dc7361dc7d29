use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Result, bail};
use crate::backend::{LocalBackend, SpatialBackend};
use crate::shell::commands::Executable;
use crate::shell::env::Environment;
use crate::shell::error::ShellError;
use crate::shell::history::{History, MemoryHistory};
use crate::shell::output::SharedWriter;
use crate::shell::value::Value;

/// One interpreter instance: its variables, command table, history and backend.
///
/// A context is single-threaded. Nothing else may touch its environment or
/// history while `run` is in progress.
pub struct ShellContext {
    pub cwd: PathBuf,
    pub vars: Environment,
    pub history: Box<dyn History>,
    pub backend: Box<dyn SpatialBackend>,
    pub registry: Arc<HashMap<String, Box<dyn Executable>>>,
    pub out: SharedWriter,
    pub(crate) recall_depth: usize,
}

impl ShellContext {
    pub fn new() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut ctx = Self {
            cwd,
            vars: Environment::new(),
            history: Box::new(MemoryHistory::new()),
            backend: Box::new(LocalBackend::default()),
            registry: Arc::new(HashMap::new()),
            out: SharedWriter::stdout(),
            recall_depth: 0,
        };
        crate::shell::commands::builtins::register_all_builtins(&mut ctx);
        ctx
    }

    pub fn with_history(mut self, history: Box<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn with_backend(mut self, backend: Box<dyn SpatialBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_output(mut self, out: SharedWriter) -> Self {
        self.out = out;
        self
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn register_command(&mut self, name: &str, command: Box<dyn Executable>) -> Result<()> {
        match Arc::get_mut(&mut self.registry) {
            Some(map) => {
                map.insert(name.to_string(), command);
                Ok(())
            }
            None => bail!("Cannot register command '{}': registry is in use", name),
        }
    }

    /// Runs source text and returns the result of its last instruction.
    pub fn run(&mut self, src: &str) -> Result<crate::shell::value::Outcome> {
        crate::shell::executor::run_program(src, self)
    }

    /// Host-side assignment, same rules as `name = ...` in source.
    pub fn assign(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        crate::shell::executor::assign(self, name, values)
    }

    pub fn lookup(&self, name: &str) -> Result<&Value, ShellError> {
        self.vars.lookup(name)
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}
