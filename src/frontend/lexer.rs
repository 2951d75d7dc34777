use std::{collections::VecDeque, str::Chars};

use itertools::{PeekNth, peek_nth};
use strum::EnumString;

use crate::frontend::SourceFile;

#[derive(Debug)]
pub struct Lexer<'source> {
    source: &'source SourceFile,
    position: usize,
    chars: PeekNth<Chars<'source>>,
    peek_buffer: VecDeque<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /* Words */
    Keyword(Keyword), // function
    Identifier,       // greet

    /* Literals */
    BooleanLiteral,      // true
    NumberLiteral,       // 0.6
    StringLiteral,       // "hello, world"
    UnterminatedString, // "hello, world

    /* Delimiters */
    OpenParen,  // (
    CloseParen, // )
    OpenBrace,  // {
    CloseBrace, // }
    Semicolon,  // ;
    Comma,      // ,
    Colon,      // :

    /* Operators */
    Equals, // =
    Dot,    // .

    /// Anything the lexer does not understand. Kept as a token so the error
    /// can be reported (and skipped) by later stages.
    BadCharacter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    Function,
    Var,
}

/// A half open byte range into a [`SourceFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Marks nodes which were synthesized by a compiler pass and have no
    /// corresponding source text
    pub const NONE: Self = Self {
        start: usize::MAX,
        end: usize::MAX,
    };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_synthetic(&self) -> bool {
        *self == Self::NONE
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        if self.is_synthetic() {
            return other;
        }

        if other.is_synthetic() {
            return self;
        }

        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl core::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_synthetic() {
            f.write_str("<no source>")
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source SourceFile) -> Self {
        Self {
            source,
            chars: peek_nth(source.contents.chars()),
            position: 0,
            peek_buffer: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &'source SourceFile {
        self.source
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn ignore_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn ignore_line(&mut self) {
        while self.chars.peek().is_some_and(|c| *c != '\n') {
            self.bump();
        }
    }

    fn read_string(&mut self) -> Token {
        let start_position = self.position;

        // Opening quote
        self.bump();

        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }

            self.bump();

            if c == '\\' && self.chars.peek().is_some_and(|c| *c == '"') {
                self.bump();
                continue;
            }

            if c == '"' {
                return Token {
                    kind: TokenKind::StringLiteral,
                    span: self.new_span(start_position),
                };
            }
        }

        Token {
            kind: TokenKind::UnterminatedString,
            span: self.new_span(start_position),
        }
    }

    // Keyword, identifier, or boolean literal
    fn read_word(&mut self) -> Token {
        let start_position = self.position;

        while self
            .chars
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        {
            self.bump();
        }

        let span = self.new_span(start_position);
        let value = self.source.value_of_span(span);

        let kind = if let Ok(keyword) = value.parse() {
            TokenKind::Keyword(keyword)
        } else {
            match value {
                "true" | "false" => TokenKind::BooleanLiteral,
                _ => TokenKind::Identifier,
            }
        };

        Token { kind, span }
    }

    fn read_number(&mut self) -> Token {
        let start_position = self.position;

        while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }

        // Only treat the dot as a decimal point when digits follow, `1.foo`
        // is a property access
        if self.chars.peek() == Some(&'.')
            && self.chars.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.bump();

            while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }

        Token {
            kind: TokenKind::NumberLiteral,
            span: self.new_span(start_position),
        }
    }

    fn read_single(&mut self, kind: TokenKind) -> Token {
        let start_position = self.position;

        self.bump();

        Token {
            kind,
            span: self.new_span(start_position),
        }
    }

    fn new_span(&self, start: usize) -> Span {
        Span {
            start,
            end: self.position,
        }
    }

    pub fn peek(&mut self) -> Option<Token> {
        if let Some(token) = self.peek_buffer.front() {
            return Some(*token);
        }

        let token = self.lex_token()?;
        self.peek_buffer.push_back(token);

        Some(token)
    }

    pub fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    pub fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.peek_buffer.pop_front() {
            return Some(token);
        }

        self.lex_token()
    }

    fn lex_token(&mut self) -> Option<Token> {
        while let Some(c) = self.chars.peek().copied() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.ignore_whitespace();
                    continue;
                }
                '/' if self.chars.peek_nth(1).is_some_and(|c| *c == '/') => {
                    self.ignore_line();
                    continue;
                }

                '"' => self.read_string(),
                n if n.is_ascii_digit() => self.read_number(),
                a if a.is_ascii_alphabetic() || a == '_' || a == '$' => self.read_word(),

                '(' => self.read_single(TokenKind::OpenParen),
                ')' => self.read_single(TokenKind::CloseParen),
                '{' => self.read_single(TokenKind::OpenBrace),
                '}' => self.read_single(TokenKind::CloseBrace),
                ';' => self.read_single(TokenKind::Semicolon),
                ',' => self.read_single(TokenKind::Comma),
                ':' => self.read_single(TokenKind::Colon),
                '=' => self.read_single(TokenKind::Equals),
                '.' => self.read_single(TokenKind::Dot),

                _ => self.read_single(TokenKind::BadCharacter),
            };

            return Some(token);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(contents: &str) -> Vec<TokenKind> {
        let source = SourceFile::from_memory("test.js", contents);
        let mut lexer = Lexer::new(&source);
        let mut kinds = Vec::new();

        while let Some(token) = lexer.next() {
            kinds.push(token.kind);
        }

        kinds
    }

    #[test]
    fn lexes_declarations() {
        assert_eq!(
            kinds("function f(a, b) { var x = \"s\"; } // trailing"),
            vec![
                TokenKind::Keyword(Keyword::Function),
                TokenKind::Identifier,
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::StringLiteral,
                TokenKind::Semicolon,
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn number_followed_by_member_access() {
        assert_eq!(
            kinds("0.6 1.x true"),
            vec![
                TokenKind::NumberLiteral,
                TokenKind::NumberLiteral,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::BooleanLiteral,
            ]
        );
    }

    #[test]
    fn unknown_characters_and_open_strings_are_tokens() {
        assert_eq!(
            kinds("# \"open\nx"),
            vec![
                TokenKind::BadCharacter,
                TokenKind::UnterminatedString,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let source = SourceFile::from_memory("test.js", "é = 1");
        let mut lexer = Lexer::new(&source);

        let bad = lexer.next().unwrap();
        assert_eq!(bad.kind, TokenKind::BadCharacter);
        assert_eq!(bad.span, Span::new(0, 2));

        assert_eq!(lexer.peek().unwrap().span, Span::new(3, 4));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Equals);
    }
}
