mod backend;
mod cli;
mod config;
mod handlers;
mod shell;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use handlers::{repl, script};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    let ok = if let Some(cmd) = &cli.command {
        script::handle_command(cmd, &config)?
    } else if let Some(path) = &cli.script {
        script::handle_script(path, &config)?
    } else {
        repl::handle_repl(&config, cli.history_file.as_deref(), cli.no_history)?;
        true
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
