pub mod builtins;

use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;

/// How bare names in a command's arguments are resolved before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    // Undefined variables are an error.
    Strict,
    // Undefined variables stand for their own name ("info states").
    Lenient,
}

pub trait Executable: Send + Sync {
    fn min_args(&self) -> usize {
        0
    }

    fn max_args(&self) -> Option<usize> {
        None
    }

    fn arg_policy(&self) -> ArgPolicy {
        ArgPolicy::Strict
    }

    fn execute(&self, args: &[Value], ctx: &mut ShellContext) -> Result<Outcome>;
}
