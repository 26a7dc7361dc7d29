pub mod io;
pub mod spatial;

use crate::shell::context::ShellContext;
use log::error;

/// Helper to register all built-in commands at once
pub fn register_all_builtins(ctx: &mut ShellContext) {
    let builtins: [(&str, Box<dyn crate::shell::commands::Executable>); 6] = [
        // Spatial
        ("open", Box::new(spatial::open::OpenCommand)),
        ("list", Box::new(spatial::list::ListCommand)),
        ("info", Box::new(spatial::info::InfoCommand)),
        ("save", Box::new(spatial::save::SaveCommand)),
        // IO
        ("print", Box::new(io::print::PrintCommand)),
        ("history", Box::new(io::history::HistoryCommand)),
    ];
    for (name, command) in builtins {
        if let Err(e) = ctx.register_command(name, command) {
            error!("{:#}", e);
        }
    }
}
