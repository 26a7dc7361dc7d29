// Print command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use std::io::Write;

pub struct PrintCommand;

impl Executable for PrintCommand {
    fn min_args(&self) -> usize {
        1
    }

    fn execute(&self, args: &[Value], ctx: &mut ShellContext) -> Result<Outcome> {
        // Arguments arrive resolved, so nothing is printed if any were undefined.
        for arg in args {
            writeln!(ctx.out, "{}", arg)?;
        }
        Ok(Outcome::success())
    }
}
