use anyhow::{Context, Result};
use colored::*;
use log::debug;
use std::fs;
use std::path::Path;
use crate::config::ShetlandConfig;
use crate::handlers::build_context;
use crate::shell::history::MemoryHistory;
use crate::shell::run_line;

/// Runs a `-c` command line. Returns whether it ended truthy.
pub fn handle_command(src: &str, config: &ShetlandConfig) -> Result<bool> {
    let mut ctx = build_context(config, Box::new(MemoryHistory::new()));
    let outcome = run_line(src, &mut ctx)?;
    debug!("Command finished with {}", outcome);
    Ok(outcome.is_truthy())
}

/// Runs a whole script file as one program.
pub fn handle_script(path: &Path, config: &ShetlandConfig) -> Result<bool> {
    let src = fs::read_to_string(path).with_context(|| format!("Failed to read script: {}", path.display()))?;
    let mut ctx = build_context(config, Box::new(MemoryHistory::new()));
    let outcome = run_line(&src, &mut ctx).with_context(|| format!("{} {}", "Script failed:".red(), path.display()))?;
    Ok(outcome.is_truthy())
}
