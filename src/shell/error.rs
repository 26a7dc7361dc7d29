use thiserror::Error;

/// Failures raised by the interpreter itself.
///
/// Backend failures never pass through here: they travel as plain
/// `anyhow::Error`s so the host sees the library's own message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShellError {
    #[error("Unexpected input at line {line}, column {column}:\n{context}")]
    Parse {
        line: usize,
        column: usize,
        context: String,
    },

    #[error("Undefined variable {0}")]
    UndefinedVariable(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("Malformed {kind} instruction: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("No history available")]
    NoHistoryAvailable,

    #[error("Unknown history command {0}")]
    HistoryEntryMissing(String),

    #[error("No data source open, use 'open <file>' first")]
    NoDataSource,
}

impl ShellError {
    pub fn malformed(kind: impl ToString, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
