// Open command

use crate::shell::commands::builtins::spatial::resolve_file;
use crate::shell::commands::{ArgPolicy, Executable};
use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use colored::*;
use std::io::Write;

pub struct OpenCommand;

impl Executable for OpenCommand {
    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }

    fn arg_policy(&self) -> ArgPolicy {
        ArgPolicy::Lenient
    }

    fn execute(&self, args: &[Value], ctx: &mut ShellContext) -> Result<Outcome> {
        let path = resolve_file(&args[0], &ctx.cwd)?;
        ctx.backend.open(&path)?;
        writeln!(ctx.out, "{} {}", "Opened".green(), path.display())?;
        Ok(Outcome::with_value(Value::filename(path.to_string_lossy())))
    }
}
