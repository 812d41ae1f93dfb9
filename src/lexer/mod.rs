//! Zero-copy tokenizer for Formulet source text.
//!
//! The lexer walks an immutable source buffer and produces one
//! `(kind, start, end)` token per call; token text is never materialized
//! here. The parser slices the source lazily when it actually needs the
//! characters (number parsing, identifier names, string unescaping).
//!
//! Statement separators (`;`), whitespace and `//` line comments are all
//! folded into the next token read.

mod error;


pub use error::{LexError, LexErrorKind};

/// A lexical token: a tag plus a byte-offset span into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Slice the token's text out of the source it was lexed from.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end]
    }
}

/// All recognized token kinds.
///
/// Kinds carry no payload; the span on [`Token`] is enough to recover the
/// text when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Numeric literal: integer, decimal, leading-dot shorthand, optional
    /// exponent (`42`, `3.14`, `.5`, `2.1e-10`).
    Number,
    /// String literal including its surrounding quotes.
    String,
    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// `true`
    True,
    /// `false`
    False,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `..`
    DotDot,
    /// `..=`
    DotDotEq,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Human-readable description, used in syntax error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Number => "a number",
            TokenKind::String => "a string",
            TokenKind::Identifier => "an identifier",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Bang => "'!'",
            TokenKind::Equal => "'='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::DotDot => "'..'",
            TokenKind::DotDotEq => "'..='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Eof => "end of input",
        }
    }
}

/// Streaming tokenizer over a source buffer.
///
/// Call [`Lexer::next_token`] repeatedly; after the first `Eof` every
/// subsequent call returns `Eof` again.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    /// Produce the next token, skipping whitespace, comments and `;`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.pos;
        let Some(byte) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        match byte {
            b'0'..=b'9' => self.lex_number(start),
            b'.' => match self.peek_at(1) {
                Some(b'0'..=b'9') => self.lex_number(start),
                Some(b'.') => {
                    self.pos += 2;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        Ok(self.token(TokenKind::DotDotEq, start))
                    } else {
                        Ok(self.token(TokenKind::DotDot, start))
                    }
                }
                _ => Err(self.unexpected(start)),
            },
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => Ok(self.lex_identifier(start)),
            b'"' | b'\'' => self.lex_string(start, byte),
            _ => self.lex_operator(start, byte),
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    /// Skip whitespace, `//` line comments and `;` separators, interleaved
    /// in any order.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n' | b';') => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(byte) = self.peek() {
                        if byte == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, LexError> {
        self.consume_digits();

        // Fractional part. A '.' not followed by a digit is left alone so
        // that range expressions like `1..5` tokenize as number, '..',
        // number.
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            self.consume_digits();
        }

        // Optional exponent; 'e' must be followed by an optionally signed
        // digit sequence or the literal is malformed.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let exponent_start = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(LexError {
                    kind: LexErrorKind::MalformedExponent,
                    offset: exponent_start,
                });
            }
            self.consume_digits();
        }

        Ok(self.token(TokenKind::Number, start))
    }

    fn consume_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        let kind = match &self.source[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier,
        };
        self.token(kind, start)
    }

    /// Lex a string literal. `quote` is the opening quote byte; the token
    /// span includes both quotes. Escapes are validated for termination
    /// only; the parser interprets them.
    fn lex_string(&mut self, start: usize, quote: u8) -> Result<Token, LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        offset: start,
                    });
                }
                Some(b'\\') => {
                    // Backslash consumes the next character, whatever it is.
                    if self.peek_at(1).is_none() {
                        return Err(LexError {
                            kind: LexErrorKind::UnterminatedString,
                            offset: start,
                        });
                    }
                    self.pos += 2;
                }
                Some(byte) if byte == quote => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::String, start));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn lex_operator(&mut self, start: usize, byte: u8) -> Result<Token, LexError> {
        let followed_by_eq = self.peek_at(1) == Some(b'=');
        let (kind, len) = match byte {
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' => (TokenKind::Star, 1),
            b'/' => (TokenKind::Slash, 1),
            b'%' => (TokenKind::Percent, 1),
            b'^' => (TokenKind::Caret, 1),
            b'(' => (TokenKind::LParen, 1),
            b')' => (TokenKind::RParen, 1),
            b'[' => (TokenKind::LBracket, 1),
            b']' => (TokenKind::RBracket, 1),
            b',' => (TokenKind::Comma, 1),
            b'?' => (TokenKind::Question, 1),
            b':' => (TokenKind::Colon, 1),
            b'=' if followed_by_eq => (TokenKind::EqualEqual, 2),
            b'=' => (TokenKind::Equal, 1),
            b'!' if followed_by_eq => (TokenKind::BangEqual, 2),
            b'!' => (TokenKind::Bang, 1),
            b'<' if followed_by_eq => (TokenKind::LessEqual, 2),
            b'<' => (TokenKind::Less, 1),
            b'>' if followed_by_eq => (TokenKind::GreaterEqual, 2),
            b'>' => (TokenKind::Greater, 1),
            b'&' if self.peek_at(1) == Some(b'&') => (TokenKind::AmpAmp, 2),
            b'|' if self.peek_at(1) == Some(b'|') => (TokenKind::PipePipe, 2),
            _ => return Err(self.unexpected(start)),
        };
        self.pos += len;
        Ok(self.token(kind, start))
    }

    fn unexpected(&self, offset: usize) -> LexError {
        // Decode the full character for the message; the cursor may sit on
        // the first byte of a multi-byte sequence.
        let ch = self.source[offset..].chars().next().unwrap_or('\u{fffd}');
        LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            offset,
        }
    }
}
