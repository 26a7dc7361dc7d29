// List command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::error::ShellError;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use std::io::Write;

pub struct ListCommand;

impl Executable for ListCommand {
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }

    fn execute(&self, _args: &[Value], ctx: &mut ShellContext) -> Result<Outcome> {
        let source = ctx.backend.current().ok_or(ShellError::NoDataSource)?;
        let mut layers = source.layers.clone();
        layers.sort();

        writeln!(ctx.out, "{} layers", layers.len())?;
        for layer in &layers {
            writeln!(ctx.out, "Name: {}", layer)?;
        }
        let names = layers.into_iter().map(Value::name).collect();
        Ok(Outcome::with_value(Value::List(names)))
    }
}
