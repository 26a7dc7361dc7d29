pub mod repl;
pub mod script;

use crate::backend::{Drivers, LocalBackend};
use crate::config::ShetlandConfig;
use crate::shell::context::ShellContext;
use crate::shell::history::History;

/// Context wired with the configured drivers and the given history.
pub fn build_context(config: &ShetlandConfig, history: Box<dyn History>) -> ShellContext {
    let mut drivers = Drivers::builtin();
    drivers.extend(&config.drivers);
    ShellContext::new()
        .with_backend(Box::new(LocalBackend::new(drivers)))
        .with_history(history)
}
