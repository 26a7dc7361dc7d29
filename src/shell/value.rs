use std::fmt;
use crate::shell::ast::{Token, TokenKind};
use crate::shell::expand::bracketed_elements;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Name,
    Filename,
    QuotedString,
}

/// Runtime value produced by the parser or by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(LiteralKind, String),
    VariableRef(String),
    List(Vec<Value>),
    CommandResult(Box<Outcome>),
}

impl Value {
    pub fn name(text: impl Into<String>) -> Self {
        Value::Literal(LiteralKind::Name, text.into())
    }

    pub fn filename(text: impl Into<String>) -> Self {
        Value::Literal(LiteralKind::Filename, text.into())
    }

    /// Builds a quoted-string literal, removing one pair of surrounding quotes.
    pub fn quoted(raw: &str) -> Self {
        Value::Literal(LiteralKind::QuotedString, strip_quotes(raw).to_string())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Value::VariableRef(name.into())
    }

    /// Converts an argument token. Punctuation tokens carry no value.
    pub fn from_token(token: &Token) -> Option<Self> {
        let value = match token.kind {
            TokenKind::Name => Value::name(&token.text),
            TokenKind::Variable => Value::var(&token.text),
            TokenKind::Filename => Value::filename(&token.text),
            TokenKind::QuotedString => Value::quoted(&token.text),
            TokenKind::List => Value::List(bracketed_elements(&token.text)?),
            TokenKind::Equals | TokenKind::Bang | TokenKind::Newline => return None,
        };
        Some(value)
    }

    /// Quotes only matter in source text; a bound quoted string is a plain name.
    pub fn into_bound(self) -> Self {
        match self {
            Value::Literal(LiteralKind::QuotedString, text) => Value::Literal(LiteralKind::Name, text),
            other => other,
        }
    }

    /// Text of a literal, or the text of the value a command produced.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Literal(_, text) => Some(text),
            Value::CommandResult(outcome) => outcome.value.as_ref().and_then(Value::as_text),
            Value::VariableRef(_) | Value::List(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(_, text) => f.write_str(text),
            Value::VariableRef(name) => f.write_str(name),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::CommandResult(outcome) => write!(f, "{}", outcome),
        }
    }
}

/// What a command, block or loop hands back: a success flag and maybe a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub value: Option<Value>,
}

impl Outcome {
    pub fn success() -> Self {
        Self { success: true, value: None }
    }

    pub fn failure() -> Self {
        Self { success: false, value: None }
    }

    pub fn with_value(value: Value) -> Self {
        Self { success: true, value: Some(value) }
    }

    pub fn is_truthy(&self) -> bool {
        self.success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "{}", self.success),
        }
    }
}

pub fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
