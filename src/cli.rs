use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shetland", version, about = "Shetland: an interactive shell for geospatial layers")]
pub struct Cli {
    /// Script file to run instead of starting the prompt
    pub script: Option<PathBuf>,

    /// Run one command line and exit
    #[arg(short = 'c', long = "command", conflicts_with = "script")]
    pub command: Option<String>,

    /// Configuration file (default: ./shetland.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// History file for the interactive prompt
    #[arg(long = "history-file")]
    pub history_file: Option<PathBuf>,

    /// Do not read or write the history file
    #[arg(long = "no-history")]
    pub no_history: bool,
}
