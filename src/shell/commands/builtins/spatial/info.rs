// Info command

use crate::shell::commands::builtins::spatial::layer_arg;
use crate::shell::commands::{ArgPolicy, Executable};
use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use colored::*;
use std::io::Write;

pub struct InfoCommand;

impl Executable for InfoCommand {
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
        let layer = layer_arg(&args[0])?;
        // Any second argument asks for the field table.
        let full = args.len() > 1;

        let Some(info) = ctx.backend.layer_info(&layer)? else {
            writeln!(ctx.out, "{} not found", layer.yellow())?;
            return Ok(Outcome::failure());
        };

        match info.feature_count {
            Some(n) => writeln!(ctx.out, "Number of features in {}: {}", info.name, n)?,
            None => writeln!(ctx.out, "Number of features in {}: unknown", info.name)?,
        }
        match info.extent {
            Some((min_x, max_x, min_y, max_y)) => {
                writeln!(ctx.out, "BBox: ({:.6} {:.6}), ({:.6} {:.6})", min_x, max_x, min_y, max_y)?
            }
            None => writeln!(ctx.out, "BBox: unknown")?,
        }

        if full {
            writeln!(ctx.out, "Name  -  Type  Width  Precision")?;
            for field in &info.fields {
                writeln!(ctx.out, "{} - {} {} {}", field.name, field.type_name, field.width, field.precision)?;
            }
        }
        Ok(Outcome::with_value(Value::name(info.name)))
    }
}
