// History command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use std::io::Write;

pub struct HistoryCommand;

impl Executable for HistoryCommand {
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }

    fn execute(&self, _args: &[Value], ctx: &mut ShellContext) -> Result<Outcome> {
        // The last slot is the line being run right now.
        let len = ctx.history.len();
        for i in 1..len {
            if let Some(entry) = ctx.history.get(i) {
                writeln!(ctx.out, "{}: {}", i, entry)?;
            }
        }
        Ok(Outcome::success())
    }
}
