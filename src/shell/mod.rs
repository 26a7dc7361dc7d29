pub mod ast;
pub mod commands;
pub mod context;
pub mod env;
pub mod error;
pub mod executor;
pub mod expand;
pub mod history;
pub mod output;
pub mod parser;
pub mod value;

use context::ShellContext;
use value::Outcome;
use anyhow::Result;

#[cfg(test)]
mod tests;

/// Host entry for one complete input: the line is logged as the in-progress
/// history entry, then run. The entry stays even if the run fails.
pub fn run_line(src: &str, ctx: &mut ShellContext) -> Result<Outcome> {
    ctx.history.append(src);
    executor::run_program(src, ctx)
}
