//! Protobuf source parsing.
//!
//! A small tokenizer and recursive-descent parser that turns `.proto` text
//! into a [`Definition`]. It understands enough of the proto2/proto3 grammar
//! to recover messages, fields, map fields, and their comments; enum,
//! service, and extend bodies are skipped by brace matching.
//!
//! Comment attachment:
//! - A comment block whose last line sits directly above a declaration
//!   becomes that declaration's leading comment. Consecutive `//` lines form
//!   one block.
//! - A comment starting on the same line as a field's terminating `;`
//!   becomes the field's inline comment.

use std::path::Path;

use crate::definition::{
    Comment, Definition, Element, Enum, Import, MapField, Message, MessageElement, NormalField,
    Oneof, Package, ProtoOption, Service,
};
use crate::error::{Error, Result};

/// Parse protobuf source text into a definition tree.
pub fn parse(source: &str) -> Result<Definition> {
    let lexed = Lexer::new(source).run()?;
    Parser::new(lexed).parse_definition()
}

/// Read and parse a `.proto` file from disk.
pub fn parse_file(path: &Path) -> Result<Definition> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&source)
}

// ── Tokens ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    /// Identifier, possibly dotted (`foo.Bar`, `.pkg.Type`).
    Ident(String),
    /// Numeric literal as written (`42`, `-1`, `0x1F`, `1.5e3`).
    Number(String),
    /// String literal with escapes resolved.
    Str(String),
    Symbol(char),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
}

#[derive(Debug)]
struct CommentBlock {
    lines: Vec<String>,
    start_line: usize,
    end_line: usize,
    /// The comment follows another token on its first line.
    trailing: bool,
    /// Block was built from `//` comments and may absorb the next `//` line.
    line_style: bool,
    /// Number of tokens lexed before the comment ended.
    tokens_before: usize,
}

struct Lexed {
    tokens: Vec<Token>,
    comments: Vec<CommentBlock>,
    eof_line: usize,
    eof_column: usize,
}

// ── Lexer ──────────────────────────────────────────────────────────────

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    comments: Vec<CommentBlock>,
    /// Line of the most recently lexed token.
    last_token_line: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source
                .strip_prefix('\u{feff}')
                .unwrap_or(source)
                .chars()
                .peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
            comments: Vec::new(),
            last_token_line: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn run(mut self) -> Result<Lexed> {
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);

            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && self.peek_second() == Some('/') {
                self.line_comment(line);
            } else if c == '/' && self.peek_second() == Some('*') {
                self.block_comment(line, column)?;
            } else if c == '"' || c == '\'' {
                let value = self.string(c, line, column)?;
                self.push(TokenKind::Str(value), line, column);
            } else if c.is_ascii_digit()
                || ((c == '-' || c == '+')
                    && self.peek_second().is_some_and(|n| n.is_ascii_digit()))
            {
                let value = self.take_while(|ch| ch.is_ascii_alphanumeric() || ".+-".contains(ch));
                self.push(TokenKind::Number(value), line, column);
            } else if c.is_alphabetic() || c == '_' || c == '.' {
                let value = self.take_while(|ch| ch.is_alphanumeric() || ch == '_' || ch == '.');
                self.push(TokenKind::Ident(value), line, column);
            } else if "{}[]()<>;=,:-+".contains(c) {
                self.bump();
                self.push(TokenKind::Symbol(c), line, column);
            } else {
                return Err(Error::Parse {
                    line,
                    column,
                    message: format!("unexpected character '{c}'"),
                });
            }
        }

        Ok(Lexed {
            tokens: self.tokens,
            comments: self.comments,
            eof_line: self.line,
            eof_column: self.column,
        })
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.last_token_line = line;
        self.tokens.push(Token { kind, line, column });
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn line_comment(&mut self, line: usize) {
        self.bump();
        self.bump();
        let text = self.take_while(|c| c != '\n');
        let text = text.strip_suffix('\r').unwrap_or(&text).to_string();
        let trailing = self.last_token_line == line;
        let tokens_before = self.tokens.len();

        if !trailing {
            if let Some(prev) = self.comments.last_mut() {
                if prev.line_style
                    && !prev.trailing
                    && prev.end_line + 1 == line
                    && prev.tokens_before == tokens_before
                {
                    prev.lines.push(text);
                    prev.end_line = line;
                    return;
                }
            }
        }

        self.comments.push(CommentBlock {
            lines: vec![text],
            start_line: line,
            end_line: line,
            trailing,
            line_style: true,
            tokens_before,
        });
    }

    fn block_comment(&mut self, line: usize, column: usize) -> Result<()> {
        self.bump();
        self.bump();
        let mut body = String::new();
        loop {
            match self.bump() {
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.bump();
                    break;
                }
                Some(c) => body.push(c),
                None => {
                    return Err(Error::Parse {
                        line,
                        column,
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
        }

        let lines = body
            .lines()
            .map(|l| {
                let t = l.trim_start();
                t.strip_prefix('*').unwrap_or(t).to_string()
            })
            .collect();

        self.comments.push(CommentBlock {
            lines,
            start_line: line,
            end_line: self.line,
            trailing: self.last_token_line == line,
            line_style: false,
            tokens_before: self.tokens.len(),
        });
        Ok(())
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('\\' | '"' | '\'')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => break,
                },
                Some('\n') | None => break,
                Some(c) => out.push(c),
            }
        }
        Err(Error::Parse {
            line,
            column,
            message: "unterminated string literal".to_string(),
        })
    }
}

// ── Parser ─────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    comments: Vec<CommentBlock>,
    pos: usize,
    eof_line: usize,
    eof_column: usize,
}

impl Parser {
    fn new(lexed: Lexed) -> Self {
        Self {
            tokens: lexed.tokens,
            comments: lexed.comments,
            pos: 0,
            eof_line: lexed.eof_line,
            eof_column: lexed.eof_column,
        }
    }

    fn parse_definition(mut self) -> Result<Definition> {
        let mut elements = Vec::new();

        while let Some(token) = self.peek().cloned() {
            let comment = self.leading_comment(token.line);
            let element = match &token.kind {
                TokenKind::Symbol(';') => {
                    self.advance();
                    continue;
                }
                TokenKind::Ident(kw) => match kw.as_str() {
                    "syntax" => Element::Syntax(self.parse_assignment_statement()?),
                    "edition" => Element::Edition(self.parse_assignment_statement()?),
                    "package" => {
                        self.advance();
                        let name = self.expect_ident()?;
                        self.expect_symbol(';')?;
                        Element::Package(Package { name, comment })
                    }
                    "import" => {
                        self.advance();
                        let kind = match self.peek_ident() {
                            Some(k @ ("weak" | "public")) => {
                                let k = k.to_string();
                                self.advance();
                                Some(k)
                            }
                            _ => None,
                        };
                        let path = self.expect_string()?;
                        self.expect_symbol(';')?;
                        Element::Import(Import { path, kind })
                    }
                    "option" => Element::Option(self.parse_option_statement()?),
                    "message" => Element::Message(self.parse_message(comment)?),
                    "enum" => {
                        self.advance();
                        let name = self.expect_ident()?;
                        self.skip_block()?;
                        Element::Enum(Enum { name, comment })
                    }
                    "service" => {
                        self.advance();
                        let name = self.expect_ident()?;
                        self.skip_block()?;
                        Element::Service(Service { name, comment })
                    }
                    "extend" => {
                        self.advance();
                        let target = self.expect_ident()?;
                        self.skip_block()?;
                        Element::Extend(target)
                    }
                    _ => return Err(self.unexpected(&token, "top-level declaration")),
                },
                _ => return Err(self.unexpected(&token, "top-level declaration")),
            };
            elements.push(element);
        }

        Ok(Definition { elements })
    }

    /// `syntax = "proto3";` and `edition = "2023";`
    fn parse_assignment_statement(&mut self) -> Result<String> {
        self.advance();
        self.expect_symbol('=')?;
        let value = self.expect_string()?;
        self.expect_symbol(';')?;
        Ok(value)
    }

    fn parse_option_statement(&mut self) -> Result<ProtoOption> {
        self.advance();
        let option = self.parse_option()?;
        self.expect_symbol(';')?;
        Ok(option)
    }

    fn parse_message(&mut self, comment: Option<Comment>) -> Result<Message> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect_symbol('{')?;

        let mut elements = Vec::new();
        loop {
            let Some(token) = self.peek().cloned() else {
                return Err(self.eof_error("'}' closing message"));
            };
            let element_comment = self.leading_comment(token.line);

            let element = match &token.kind {
                TokenKind::Symbol('}') => {
                    self.advance();
                    break;
                }
                TokenKind::Symbol(';') => {
                    self.advance();
                    continue;
                }
                TokenKind::Ident(kw) => match kw.as_str() {
                    "message" => MessageElement::Message(self.parse_message(element_comment)?),
                    "enum" => {
                        self.advance();
                        let name = self.expect_ident()?;
                        self.skip_block()?;
                        MessageElement::Enum(Enum {
                            name,
                            comment: element_comment,
                        })
                    }
                    "extend" => {
                        self.advance();
                        self.expect_ident()?;
                        self.skip_block()?;
                        continue;
                    }
                    "oneof" => MessageElement::Oneof(self.parse_oneof(element_comment)?),
                    "option" => MessageElement::Option(self.parse_option_statement()?),
                    "reserved" => MessageElement::Reserved(self.parse_raw_statement()?),
                    "extensions" => MessageElement::Extensions(self.parse_raw_statement()?),
                    "map" if self.peek_symbol_at(1, '<') => {
                        MessageElement::MapField(self.parse_map_field(element_comment)?)
                    }
                    _ => MessageElement::NormalField(self.parse_normal_field(element_comment)?),
                },
                _ => return Err(self.unexpected(&token, "message element")),
            };
            elements.push(element);
        }

        Ok(Message {
            name,
            comment,
            elements,
        })
    }

    fn parse_oneof(&mut self, comment: Option<Comment>) -> Result<Oneof> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect_symbol('{')?;

        let mut fields = Vec::new();
        loop {
            let Some(token) = self.peek().cloned() else {
                return Err(self.eof_error("'}' closing oneof"));
            };
            match &token.kind {
                TokenKind::Symbol('}') => {
                    self.advance();
                    break;
                }
                TokenKind::Symbol(';') => self.advance(),
                TokenKind::Ident(kw) if kw == "option" => {
                    self.parse_option_statement()?;
                }
                TokenKind::Ident(_) => {
                    let comment = self.leading_comment(token.line);
                    fields.push(self.parse_normal_field(comment)?);
                }
                _ => return Err(self.unexpected(&token, "oneof field")),
            }
        }

        Ok(Oneof {
            name,
            comment,
            fields,
        })
    }

    fn parse_normal_field(&mut self, comment: Option<Comment>) -> Result<NormalField> {
        let mut field = NormalField {
            comment,
            ..Default::default()
        };

        match self.peek_ident() {
            Some("repeated") => field.repeated = true,
            Some("optional") => field.optional = true,
            Some("required") => field.required = true,
            _ => {}
        }
        if field.repeated || field.optional || field.required {
            self.advance();
        }

        field.type_name = self.expect_ident()?;
        field.name = self.expect_ident()?;
        self.expect_symbol('=')?;
        field.number = self.expect_field_number()?;
        field.options = self.parse_field_options()?;
        let line = self.expect_symbol(';')?;
        field.inline_comment = self.inline_comment(line);

        Ok(field)
    }

    fn parse_map_field(&mut self, comment: Option<Comment>) -> Result<MapField> {
        self.advance();
        self.expect_symbol('<')?;
        let key_type = self.expect_ident()?;
        self.expect_symbol(',')?;
        let type_name = self.expect_ident()?;
        self.expect_symbol('>')?;
        let name = self.expect_ident()?;
        self.expect_symbol('=')?;
        let number = self.expect_field_number()?;
        let options = self.parse_field_options()?;
        let line = self.expect_symbol(';')?;

        Ok(MapField {
            name,
            key_type,
            type_name,
            number,
            options,
            comment,
            inline_comment: self.inline_comment(line),
        })
    }

    fn parse_field_options(&mut self) -> Result<Vec<ProtoOption>> {
        let mut options = Vec::new();
        if !self.peek_symbol_at(0, '[') {
            return Ok(options);
        }
        self.advance();
        loop {
            options.push(self.parse_option()?);
            if self.peek_symbol_at(0, ',') {
                self.advance();
                continue;
            }
            self.expect_symbol(']')?;
            break;
        }
        Ok(options)
    }

    /// `name = constant`, where name may be `(ext.name).sub`.
    fn parse_option(&mut self) -> Result<ProtoOption> {
        let mut name = String::new();
        if self.peek_symbol_at(0, '(') {
            self.advance();
            name.push('(');
            name.push_str(&self.expect_ident()?);
            self.expect_symbol(')')?;
            name.push(')');
            if let Some(sub) = self.peek_ident().filter(|s| s.starts_with('.')) {
                name.push_str(sub);
                self.advance();
            }
        } else {
            name = self.expect_ident()?;
        }
        self.expect_symbol('=')?;
        let value = self.parse_constant()?;
        Ok(ProtoOption { name, value })
    }

    fn parse_constant(&mut self) -> Result<String> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.eof_error("constant"));
        };
        match token.kind {
            TokenKind::Ident(v) | TokenKind::Number(v) => {
                self.advance();
                Ok(v)
            }
            TokenKind::Str(mut v) => {
                self.advance();
                // Adjacent string literals concatenate.
                while let Some(TokenKind::Str(next)) = self.peek().map(|t| t.kind.clone()) {
                    v.push_str(&next);
                    self.advance();
                }
                Ok(v)
            }
            TokenKind::Symbol(sign @ ('-' | '+')) => {
                self.advance();
                let rest = self.expect_ident_or_number()?;
                Ok(format!("{sign}{rest}"))
            }
            TokenKind::Symbol('{') => self.skip_block().map(|raw| format!("{{{raw}}}")),
            _ => Err(self.unexpected(&token, "constant")),
        }
    }

    /// Consume tokens up to `;`, returning their text joined by spaces.
    fn parse_raw_statement(&mut self) -> Result<String> {
        self.advance();
        let mut parts: Vec<String> = Vec::new();
        loop {
            let Some(token) = self.next() else {
                return Err(self.eof_error("';'"));
            };
            match token.kind {
                TokenKind::Symbol(';') => break,
                TokenKind::Symbol(',') => {
                    if let Some(last) = parts.last_mut() {
                        last.push(',');
                    }
                }
                TokenKind::Str(s) => parts.push(format!("\"{s}\"")),
                TokenKind::Ident(s) | TokenKind::Number(s) => parts.push(s),
                TokenKind::Symbol(c) => parts.push(c.to_string()),
            }
        }
        Ok(parts.join(" "))
    }

    /// Skip a `{ ... }` block, returning the inner token text.
    fn skip_block(&mut self) -> Result<String> {
        self.expect_symbol('{')?;
        let mut depth = 1usize;
        let mut parts = Vec::new();
        while depth > 0 {
            let Some(token) = self.next() else {
                return Err(self.eof_error("'}'"));
            };
            match &token.kind {
                TokenKind::Symbol('{') => depth += 1,
                TokenKind::Symbol('}') => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                parts.push(match token.kind {
                    TokenKind::Str(s) => format!("\"{s}\""),
                    TokenKind::Ident(s) | TokenKind::Number(s) => s,
                    TokenKind::Symbol(c) => c.to_string(),
                });
            }
        }
        Ok(parts.join(" "))
    }

    // ── Comment attachment ─────────────────────────────────────────────

    fn leading_comment(&self, line: usize) -> Option<Comment> {
        self.comments
            .iter()
            .find(|c| !c.trailing && c.end_line + 1 == line)
            .map(|c| Comment::new(c.lines.iter().cloned()))
    }

    fn inline_comment(&self, line: usize) -> Option<Comment> {
        self.comments
            .iter()
            .find(|c| c.trailing && c.start_line == line)
            .map(|c| Comment::new(c.lines.iter().cloned()))
    }

    // ── Token helpers ──────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn peek_symbol_at(&self, offset: usize, symbol: char) -> bool {
        matches!(
            self.tokens.get(self.pos + offset).map(|t| &t.kind),
            Some(TokenKind::Symbol(c)) if *c == symbol
        )
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Ident(s),
                ..
            }) => Ok(s),
            Some(token) => Err(self.unexpected(&token, "identifier")),
            None => Err(self.eof_error("identifier")),
        }
    }

    fn expect_ident_or_number(&mut self) -> Result<String> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Ident(s) | TokenKind::Number(s),
                ..
            }) => Ok(s),
            Some(token) => Err(self.unexpected(&token, "number")),
            None => Err(self.eof_error("number")),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Str(s),
                ..
            }) => Ok(s),
            Some(token) => Err(self.unexpected(&token, "string literal")),
            None => Err(self.eof_error("string literal")),
        }
    }

    /// Returns the line the symbol was found on.
    fn expect_symbol(&mut self, symbol: char) -> Result<usize> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Symbol(c),
                line,
                ..
            }) if c == symbol => Ok(line),
            Some(token) => Err(self.unexpected(&token, &format!("'{symbol}'"))),
            None => Err(self.eof_error(&format!("'{symbol}'"))),
        }
    }

    fn expect_field_number(&mut self) -> Result<u32> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Number(raw),
                line,
                column,
            }) => parse_int(&raw).ok_or_else(|| Error::Parse {
                line,
                column,
                message: format!("invalid field number '{raw}'"),
            }),
            Some(token) => Err(self.unexpected(&token, "field number")),
            None => Err(self.eof_error("field number")),
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> Error {
        let found = match &token.kind {
            TokenKind::Ident(s) | TokenKind::Number(s) => format!("'{s}'"),
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::Symbol(c) => format!("'{c}'"),
        };
        Error::Parse {
            line: token.line,
            column: token.column,
            message: format!("expected {expected}, found {found}"),
        }
    }

    fn eof_error(&self, expected: &str) -> Error {
        Error::Parse {
            line: self.eof_line,
            column: self.eof_column,
            message: format!("expected {expected}, found end of input"),
        }
    }
}

fn parse_int(raw: &str) -> Option<u32> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if raw.len() > 1 && raw.starts_with('0') {
        u32::from_str_radix(&raw[1..], 8).ok()
    } else {
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_message(def: &Definition) -> &Message {
        def.elements
            .iter()
            .find_map(|e| match e {
                Element::Message(m) => Some(m),
                _ => None,
            })
            .expect("a message")
    }

    #[test]
    fn parses_header_declarations() {
        let def = parse(
            r#"
            syntax = "proto3";
            package acme.billing.v1;
            import public "google/protobuf/timestamp.proto";
            option go_package = "example.com/billing";
            "#,
        )
        .unwrap();

        assert_eq!(
            def.elements,
            vec![
                Element::Syntax("proto3".to_string()),
                Element::Package(Package {
                    name: "acme.billing.v1".to_string(),
                    comment: None,
                }),
                Element::Import(Import {
                    path: "google/protobuf/timestamp.proto".to_string(),
                    kind: Some("public".to_string()),
                }),
                Element::Option(ProtoOption {
                    name: "go_package".to_string(),
                    value: "example.com/billing".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn parses_fields_labels_and_options() {
        let def = parse(
            r#"
            message User {
              string user_name = 1;
              repeated Address addresses = 2 [(gogoproto.nullable) = true, deprecated = true];
              optional int64 age = 0x3;
            }
            "#,
        )
        .unwrap();
        let msg = only_message(&def);
        assert_eq!(msg.name, "User");
        assert_eq!(msg.elements.len(), 3);

        let MessageElement::NormalField(addresses) = &msg.elements[1] else {
            panic!("expected normal field");
        };
        assert_eq!(addresses.type_name, "Address");
        assert!(addresses.repeated);
        assert_eq!(addresses.number, 2);
        assert_eq!(addresses.options.len(), 2);
        assert_eq!(addresses.options[0].name, "(gogoproto.nullable)");
        assert_eq!(addresses.options[0].value, "true");

        let MessageElement::NormalField(age) = &msg.elements[2] else {
            panic!("expected normal field");
        };
        assert!(age.optional);
        assert_eq!(age.number, 3);
    }

    #[test]
    fn parses_map_fields() {
        let def = parse("message M { map<string, Project> projects = 3; }").unwrap();
        let MessageElement::MapField(map) = &only_message(&def).elements[0] else {
            panic!("expected map field");
        };
        assert_eq!(map.name, "projects");
        assert_eq!(map.key_type, "string");
        assert_eq!(map.type_name, "Project");
    }

    #[test]
    fn attaches_leading_and_inline_comments() {
        let def = parse(
            "// A user account.\n\
             // Second line.\n\
             message User {\n\
               // The login name.\n\
               string user_name = 1; // unique\n\
               string email = 2;\n\
             }\n",
        )
        .unwrap();
        let msg = only_message(&def);
        assert_eq!(
            msg.comment,
            Some(Comment::new([" A user account.", " Second line."]))
        );

        let MessageElement::NormalField(name) = &msg.elements[0] else {
            panic!("expected normal field");
        };
        assert_eq!(name.comment, Some(Comment::new([" The login name."])));
        assert_eq!(name.inline_comment, Some(Comment::new([" unique"])));

        let MessageElement::NormalField(email) = &msg.elements[1] else {
            panic!("expected normal field");
        };
        assert_eq!(email.comment, None);
        assert_eq!(email.inline_comment, None);
    }

    #[test]
    fn detached_comment_is_not_attached() {
        let def = parse("// detached\n\nmessage M {}\n").unwrap();
        assert_eq!(only_message(&def).comment, None);
    }

    #[test]
    fn block_comment_splits_lines() {
        let def = parse("/* first\n * second\n */\nmessage M {}\n").unwrap();
        let comment = only_message(&def).comment.clone().unwrap();
        assert_eq!(comment.lines, vec!["first", " second", ""]);
    }

    #[test]
    fn keeps_nested_and_skipped_elements() {
        let def = parse(
            r#"
            message Outer {
              message Inner { int32 x = 1; }
              enum Kind { KIND_UNSPECIFIED = 0; KIND_A = 1; }
              oneof choice {
                string a = 4;
                int32 b = 5;
              }
              reserved 6, 8 to 10;
              reserved "old";
              option deprecated = true;
            }
            service Users { rpc Get(Outer) returns (Outer) { option (google.api.http) = { get: "/v1/users" }; } }
            enum Top { TOP_UNSPECIFIED = 0; }
            "#,
        )
        .unwrap();

        let msg = only_message(&def);
        assert!(matches!(msg.elements[0], MessageElement::Message(_)));
        assert!(matches!(msg.elements[1], MessageElement::Enum(_)));
        let MessageElement::Oneof(oneof) = &msg.elements[2] else {
            panic!("expected oneof");
        };
        assert_eq!(oneof.fields.len(), 2);
        assert_eq!(
            msg.elements[3],
            MessageElement::Reserved("6, 8 to 10".to_string())
        );
        assert_eq!(msg.elements[4], MessageElement::Reserved("\"old\"".to_string()));
        assert!(matches!(msg.elements[5], MessageElement::Option(_)));
        assert!(matches!(def.elements[1], Element::Service(_)));
        assert!(matches!(def.elements[2], Element::Enum(_)));
    }

    #[test]
    fn reports_error_location() {
        let err = parse("message M {\n  string = 1;\n}\n").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_unterminated_message() {
        let err = parse("message M {\n  string a = 1;\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn empty_source_has_no_elements() {
        assert_eq!(parse("").unwrap(), Definition::default());
        assert_eq!(parse("// just a comment\n").unwrap(), Definition::default());
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let def = parse("\u{feff}syntax = \"proto3\";\npackage p;\n").unwrap();
        assert_eq!(def.elements.len(), 2);

        let err = parse("\u{feff}message = 1;").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => assert_eq!((line, column), (1, 9)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
