// Save command

use crate::shell::commands::builtins::spatial::{layer_arg, resolve_file};
use crate::shell::commands::{ArgPolicy, Executable};
use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use colored::*;
use std::io::Write;

pub struct SaveCommand;

impl Executable for SaveCommand {
    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }

    fn arg_policy(&self) -> ArgPolicy {
        ArgPolicy::Lenient
    }

    fn execute(&self, args: &[Value], ctx: &mut ShellContext) -> Result<Outcome> {
        let path = resolve_file(&args[0], &ctx.cwd)?;

        let Some(driver) = ctx.backend.drivers().for_path(&path).map(str::to_string) else {
            let ext = path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default();
            writeln!(ctx.out, "{} '{}'", "Unable to find a driver for file".red(), ext)?;
            return Ok(Outcome::failure());
        };

        // Layer defaults to the target's file name without extension.
        let layer = match args.get(1) {
            Some(arg) => layer_arg(arg)?,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        ctx.backend.save(&path, &layer, &driver)?;
        writeln!(ctx.out, "Saved {} to {}", layer, path.display())?;
        Ok(Outcome::with_value(Value::filename(path.to_string_lossy())))
    }
}
