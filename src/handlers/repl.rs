use anyhow::{Context, Result};
use colored::*;
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use crate::config::ShetlandConfig;
use crate::handlers::build_context;
use crate::shell::context::ShellContext;
use crate::shell::history::{History, MemoryHistory};
use crate::shell::run_line;
use std::fs;
use std::path::{Path, PathBuf};

type LineEditor = Editor<(), DefaultHistory>;

const PROMPT: &str = "> ";
const CONTINUATION: &str = "... ";

/// Open minus close braces outside quotes.
fn brace_depth(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Where history is persisted, or `None` when it only lives for the session.
fn history_path(config: &ShetlandConfig, override_path: Option<&Path>, disabled: bool) -> Option<PathBuf> {
    if disabled || !config.history.enabled {
        return None;
    }
    override_path.map(Path::to_path_buf).or_else(|| config.history.path())
}

// Every run is a numbered slot, so repeated lines are kept.
fn editor_config(length: usize) -> Result<Config> {
    let config = Config::builder()
        .max_history_size(length)?
        .history_ignore_dups(false)?
        .build();
    Ok(config)
}

fn load_history(rl: &mut LineEditor, path: &Path) {
    if let Err(e) = rl.load_history(path) {
        // First run has no file yet
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
        if !is_not_found {
            warn!("Failed to load history: {}", e);
        }
    }
}

fn save_history(rl: &mut LineEditor, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create history directory: {}", e);
        }
    }
    if let Err(e) = rl.save_history(path) {
        warn!("Failed to save history: {}", e);
    }
}

/// The shell's numbered log, starting from what the editor loaded.
fn seed_history(saved: &DefaultHistory, length: usize) -> MemoryHistory {
    let history = MemoryHistory::from_entries(saved.iter(), length);
    debug!("Seeded {} history entries", history.len());
    history
}

fn execute(src: &str, ctx: &mut ShellContext, rl: &mut LineEditor) {
    match run_line(src, ctx) {
        Ok(outcome) => debug!("=> {}", outcome),
        Err(e) => eprintln!("{} {:#}", "✖".red(), e),
    }
    // A recalled line is remembered as the text that actually ran.
    if let Some(entry) = ctx.history.get(ctx.history.len()) {
        if let Err(e) = rl.add_history_entry(entry.as_str()) {
            warn!("Failed to add history entry: {}", e);
        }
    }
}

pub fn handle_repl(config: &ShetlandConfig, history_file: Option<&Path>, no_history: bool) -> Result<()> {
    let length = config.history.length;
    let path = history_path(config, history_file, no_history);

    let mut rl = LineEditor::with_config(editor_config(length)?).context("Failed to create line editor")?;
    if let Some(path) = &path {
        load_history(&mut rl, path);
    }
    let history = seed_history(rl.history(), length);
    let mut ctx = build_context(config, Box::new(history));

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { PROMPT } else { CONTINUATION };
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if pending.is_empty() && line.is_empty() {
                    continue;
                }
                pending.push_str(line);
                pending.push('\n');
                if brace_depth(&pending) > 0 {
                    continue;
                }
                let src = std::mem::take(&mut pending);
                execute(src.trim_end(), &mut ctx, &mut rl);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C drops whatever block was being typed
                pending.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                if let Some(path) = &path {
                    save_history(&mut rl, path);
                }
                return Err(e).context("Failed to read input");
            }
        }
    }

    if let Some(path) = &path {
        save_history(&mut rl, path);
    }
    Ok(())
}
