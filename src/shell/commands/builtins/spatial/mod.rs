use crate::shell::value::Value;
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

pub mod info;
pub mod list;
pub mod open;
pub mod save;

/// Turns a filename argument into an absolute path. This is the only place
/// filenames are resolved, right before they reach the backend.
pub fn resolve_file(arg: &Value, cwd: &Path) -> Result<PathBuf> {
    let Some(text) = arg.as_text() else {
        bail!("Expected a filename, got {}", arg);
    };
    let p = Path::new(text);
    let joined = if p.is_absolute() { p.to_path_buf() } else { cwd.join(p) };
    // Existing files get symlinks and ".." resolved; new targets stay as joined.
    Ok(joined.canonicalize().unwrap_or(joined))
}

/// Layer names are plain text; lists and references are rejected.
pub fn layer_arg(arg: &Value) -> Result<String> {
    match arg.as_text() {
        Some(text) => Ok(text.to_string()),
        None => bail!("Expected a layer name, got {}", arg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let cwd = Path::new("/data");
        assert_eq!(resolve_file(&Value::filename("/nope/x.shp"), cwd).unwrap(), PathBuf::from("/nope/x.shp"));
        assert_eq!(resolve_file(&Value::quoted("'x.shp'"), cwd).unwrap(), PathBuf::from("/data/x.shp"));
        assert!(resolve_file(&Value::List(vec![]), cwd).is_err());
    }
}
