// Turns the source of a `for` loop into the values it iterates over.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use crate::shell::ast::{Token, TokenKind};
use crate::shell::env::Environment;
use crate::shell::error::ShellError;
use crate::shell::value::{strip_quotes, LiteralKind, Value};

pub fn has_wildcard(text: &str) -> bool {
    text.contains('*') || text.contains('?')
}

/// Expands a loop source in precedence order: bracketed list, glob, variable, bare literal.
pub fn expand_iterable(token: &Token, env: &Environment, cwd: &Path) -> Result<Vec<Value>> {
    if token.kind == TokenKind::List {
        return bracketed_elements(&token.text)
            .ok_or_else(|| ShellError::malformed("for", format!("bad list {}", token.text)).into());
    }

    let text = match token.kind {
        TokenKind::QuotedString => strip_quotes(&token.text),
        _ => token.text.as_str(),
    };

    if has_wildcard(text) {
        return expand_glob(text, cwd);
    }

    if token.kind == TokenKind::QuotedString {
        return Ok(vec![Value::quoted(&token.text)]);
    }

    match env.lookup(text) {
        Ok(Value::List(items)) => Ok(items.clone()),
        Ok(value) => Ok(vec![value.clone()]),
        Err(ShellError::UndefinedVariable(_)) => {
            debug!("'{}' is not a variable, iterating it as a literal", text);
            let kind = if token.kind == TokenKind::Filename { LiteralKind::Filename } else { LiteralKind::Name };
            Ok(vec![Value::Literal(kind, text.to_string())])
        }
        Err(e) => Err(e.into()),
    }
}

/// Splits `[a, 'b.shp', "c"]` on top-level commas. Quoted elements become
/// literals, bare ones stay unresolved references. Returns None if the text
/// is not bracketed.
pub fn bracketed_elements(text: &str) -> Option<Vec<Value>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, ',') => parts.push(std::mem::take(&mut current)),
            (None, c) => current.push(c),
        }
    }
    parts.push(current);

    let values = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('"') || p.starts_with('\'') {
                Value::name(strip_quotes(p))
            } else {
                Value::var(p)
            }
        })
        .collect();
    Some(values)
}

/// Matches `pattern` against the filesystem relative to `cwd`. Matches come
/// back in the order the glob walker yields them; callers wanting a stable
/// order must sort.
pub fn expand_glob(pattern: &str, cwd: &Path) -> Result<Vec<Value>> {
    let relative = !Path::new(pattern).is_absolute();
    let full_pattern = if relative {
        format!("{}/{}", glob::Pattern::escape(&cwd.to_string_lossy()), pattern)
    } else {
        pattern.to_string()
    };

    let paths = glob::glob(&full_pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

    let mut matches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                let shown = if relative {
                    path.strip_prefix(cwd).unwrap_or(&path).to_path_buf()
                } else {
                    path
                };
                matches.push(Value::filename(shown.to_string_lossy()));
            }
            Err(e) => debug!("Skipping unreadable glob entry: {}", e),
        }
    }
    debug!("Glob '{}' matched {} file(s)", pattern, matches.len());
    Ok(matches)
}
