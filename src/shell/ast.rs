use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Command names, keywords and bare numbers: "open", "for", "3"
    Name,
    // Identifier in argument position or left of "=": "a"
    Variable,
    // Paths and glob patterns: "/tmp/states.shp", "*.shp"
    Filename,
    // Raw text keeps its quotes: "'states.shp'"
    QuotedString,
    // Raw bracketed text: "[a, 'b.shp']"
    List,
    Equals,
    Bang,
    Newline,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Name => "NAME",
            TokenKind::Variable => "VARIABLE",
            TokenKind::Filename => "FILENAME",
            TokenKind::QuotedString => "STRING",
            TokenKind::List => "LIST",
            TokenKind::Equals => "EQUALS",
            TokenKind::Bang => "BANG",
            TokenKind::Newline => "NEWLINE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    // "open f.shp", "a = b"
    Command,
    // "!3", "!open"
    Exec,
    // "!!"
    RepeatHist,
    // "for i in [a, b] { ... }"
    For,
    // "{ ... }"
    CodeBlock,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Command => "command",
            NodeKind::Exec => "exec",
            NodeKind::RepeatHist => "repeat_hist",
            NodeKind::For => "for",
            NodeKind::CodeBlock => "code_block",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Token(Token),
}

impl Child {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(t) => Some(t),
            Child::Node(_) => None,
        }
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Child::Token(t) if t.kind == TokenKind::Newline)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Child>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Child>) -> Self {
        Self { kind, children }
    }
}
