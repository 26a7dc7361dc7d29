use crate::shell::ast::{Child, Node, NodeKind, Token, TokenKind};
use crate::shell::error::ShellError;
use regex::Regex;
use std::sync::LazyLock;

static IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lex {
    Word,
    Quoted,
    List,
    Equals,
    Bang,
    LBrace,
    RBrace,
    Semi,
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
struct Lexeme {
    lex: Lex,
    text: String,
    line: usize,
    column: usize,
}

/// Parses source text into top-level instructions.
pub fn parse_program(src: &str) -> Result<Vec<Node>, ShellError> {
    let lexemes = scan(src)?;
    let mut parser = Parser { src, lexemes, pos: 0 };
    parser.program()
}

fn error_at(src: &str, line: usize, column: usize, msg: &str) -> ShellError {
    let src_line = src.lines().nth(line - 1).unwrap_or("");
    let caret = " ".repeat(column.saturating_sub(1));
    ShellError::Parse {
        line,
        column,
        context: format!("{}\n{}^ {}", src_line, caret, msg),
    }
}

fn scan(src: &str) -> Result<Vec<Lexeme>, ShellError> {
    let mut out = Vec::new();
    let mut chars = src.chars().peekable();
    let (mut line, mut column) = (1usize, 1usize);

    // Keeps line/column in step with every consumed char.
    macro_rules! bump {
        () => {{
            let c = chars.next();
            if c == Some('\n') {
                line += 1;
                column = 1;
            } else if c.is_some() {
                column += 1;
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        let (start_line, start_col) = (line, column);
        let single = |lex: Lex, text: &str| Lexeme { lex, text: text.to_string(), line: start_line, column: start_col };

        match c {
            '\n' => {
                bump!();
                out.push(single(Lex::Newline, "\n"));
            }
            c if c.is_whitespace() => {
                bump!();
            }
            '#' => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    bump!();
                }
            }
            ';' => {
                bump!();
                out.push(single(Lex::Semi, ";"));
            }
            '{' => {
                bump!();
                out.push(single(Lex::LBrace, "{"));
            }
            '}' => {
                bump!();
                out.push(single(Lex::RBrace, "}"));
            }
            '=' => {
                bump!();
                out.push(single(Lex::Equals, "="));
            }
            '!' => {
                bump!();
                if chars.peek() == Some(&'!') {
                    bump!();
                    out.push(single(Lex::Bang, "!!"));
                } else {
                    out.push(single(Lex::Bang, "!"));
                }
            }
            '"' | '\'' => {
                let mut text = String::new();
                text.push(c);
                bump!();
                let mut closed = false;
                while let Some(n) = bump!() {
                    text.push(n);
                    if n == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(error_at(src, start_line, start_col, "unterminated string"));
                }
                out.push(Lexeme { lex: Lex::Quoted, text, line: start_line, column: start_col });
            }
            '[' => {
                let mut text = String::new();
                let mut quote: Option<char> = None;
                let mut closed = false;
                while let Some(n) = bump!() {
                    text.push(n);
                    match quote {
                        Some(q) if n == q => quote = None,
                        Some(_) => {}
                        None if n == '"' || n == '\'' => quote = Some(n),
                        None if n == ']' => {
                            closed = true;
                            break;
                        }
                        None => {}
                    }
                }
                if !closed {
                    return Err(error_at(src, start_line, start_col, "unterminated list"));
                }
                out.push(Lexeme { lex: Lex::List, text, line: start_line, column: start_col });
            }
            _ => {
                let mut text = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_whitespace() || matches!(n, ';' | '{' | '}' | '=') {
                        break;
                    }
                    text.push(n);
                    bump!();
                }
                out.push(Lexeme { lex: Lex::Word, text, line: start_line, column: start_col });
            }
        }
    }

    out.push(Lexeme { lex: Lex::Eof, text: String::new(), line, column });
    Ok(out)
}

/// Argument words: identifiers are variable references, numbers are plain
/// names, anything else is a filename or glob.
fn classify_word(text: &str) -> TokenKind {
    if IDENT.is_match(text) {
        TokenKind::Variable
    } else if NUMBER.is_match(text) {
        TokenKind::Name
    } else {
        TokenKind::Filename
    }
}

struct Parser<'a> {
    src: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Lexeme {
        &self.lexemes[self.pos.min(self.lexemes.len() - 1)]
    }

    fn next(&mut self) -> Lexeme {
        let lexeme = self.peek().clone();
        if self.pos < self.lexemes.len() - 1 {
            self.pos += 1;
        }
        lexeme
    }

    fn error(&self, at: &Lexeme, msg: &str) -> ShellError {
        error_at(self.src, at.line, at.column, msg)
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek().lex, Lex::Newline | Lex::Semi) {
            self.next();
        }
    }

    fn program(&mut self) -> Result<Vec<Node>, ShellError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_separators();
            match self.peek().lex {
                Lex::Eof => break,
                Lex::RBrace => return Err(self.error(self.peek(), "unexpected '}'")),
                _ => {}
            }
            nodes.push(self.statement()?);
            match self.peek().lex {
                Lex::Newline | Lex::Semi | Lex::Eof => {}
                _ => return Err(self.error(self.peek(), "expected end of statement")),
            }
        }
        Ok(nodes)
    }

    fn statement(&mut self) -> Result<Node, ShellError> {
        let head = self.peek().clone();
        match head.lex {
            Lex::Bang => self.history_ref(),
            Lex::LBrace => self.block(),
            Lex::Word if head.text == "for" => self.for_loop(),
            Lex::Word => self.command(),
            _ => Err(self.error(&head, &format!("unexpected '{}'", head.text.escape_debug()))),
        }
    }

    fn history_ref(&mut self) -> Result<Node, ShellError> {
        let bang = self.next();
        if bang.text == "!!" {
            return Ok(Node::new(NodeKind::RepeatHist, vec![Child::Token(Token::new(TokenKind::Bang, "!!"))]));
        }
        let target = self.next();
        if target.lex != Lex::Word {
            return Err(self.error(&target, "expected a history number or prefix after '!'"));
        }
        Ok(Node::new(
            NodeKind::Exec,
            vec![
                Child::Token(Token::new(TokenKind::Bang, "!")),
                Child::Token(Token::new(TokenKind::Name, target.text)),
            ],
        ))
    }

    fn command(&mut self) -> Result<Node, ShellError> {
        let name = self.next();
        let mut children = Vec::new();

        if self.peek().lex == Lex::Equals {
            if !IDENT.is_match(&name.text) {
                return Err(self.error(&name, "invalid variable name"));
            }
            let equals = self.next();
            children.push(Child::Token(Token::new(TokenKind::Variable, name.text)));
            children.push(Child::Token(Token::new(TokenKind::Equals, "=")));
            let args = self.arguments()?;
            if args.is_empty() {
                return Err(self.error(&equals, "expected a value after '='"));
            }
            children.extend(args);
        } else {
            children.push(Child::Token(Token::new(TokenKind::Name, name.text)));
            children.extend(self.arguments()?);
        }
        Ok(Node::new(NodeKind::Command, children))
    }

    fn arguments(&mut self) -> Result<Vec<Child>, ShellError> {
        let mut args = Vec::new();
        loop {
            let lexeme = self.peek().clone();
            let token = match lexeme.lex {
                Lex::Word => Token::new(classify_word(&lexeme.text), lexeme.text),
                Lex::Quoted => Token::new(TokenKind::QuotedString, lexeme.text),
                Lex::List => Token::new(TokenKind::List, lexeme.text),
                Lex::Equals | Lex::Bang | Lex::LBrace => {
                    return Err(self.error(&lexeme, &format!("unexpected '{}'", lexeme.text)));
                }
                Lex::RBrace | Lex::Semi | Lex::Newline | Lex::Eof => break,
            };
            self.next();
            args.push(Child::Token(token));
        }
        Ok(args)
    }

    fn for_loop(&mut self) -> Result<Node, ShellError> {
        let keyword = self.next();
        let mut children = vec![Child::Token(Token::new(TokenKind::Name, keyword.text))];

        let var = self.next();
        if var.lex != Lex::Word || !IDENT.is_match(&var.text) {
            return Err(self.error(&var, "expected a loop variable"));
        }
        children.push(Child::Token(Token::new(TokenKind::Variable, var.text)));

        let kw_in = self.next();
        if kw_in.lex != Lex::Word || kw_in.text != "in" {
            return Err(self.error(&kw_in, "expected 'in'"));
        }
        children.push(Child::Token(Token::new(TokenKind::Name, "in")));

        let source = self.next();
        let token = match source.lex {
            Lex::Word => Token::new(classify_word(&source.text), source.text),
            Lex::Quoted => Token::new(TokenKind::QuotedString, source.text),
            Lex::List => Token::new(TokenKind::List, source.text),
            _ => return Err(self.error(&source, "expected a list, glob or variable to iterate")),
        };
        children.push(Child::Token(token));

        while self.peek().lex == Lex::Newline {
            self.next();
            children.push(Child::Token(Token::new(TokenKind::Newline, "\n")));
        }

        if self.peek().lex != Lex::LBrace {
            return Err(self.error(self.peek(), "expected '{' to start the loop body"));
        }
        children.push(Child::Node(self.block()?));
        Ok(Node::new(NodeKind::For, children))
    }

    fn block(&mut self) -> Result<Node, ShellError> {
        let open = self.next();
        let mut children = Vec::new();
        loop {
            self.skip_separators();
            match self.peek().lex {
                Lex::RBrace => {
                    self.next();
                    break;
                }
                Lex::Eof => return Err(self.error(&open, "unterminated block")),
                _ => {}
            }
            children.push(Child::Node(self.statement()?));
            match self.peek().lex {
                Lex::Newline | Lex::Semi | Lex::RBrace => {}
                Lex::Eof => return Err(self.error(&open, "unterminated block")),
                _ => return Err(self.error(self.peek(), "expected end of statement")),
            }
        }
        Ok(Node::new(NodeKind::CodeBlock, children))
    }
}
