//! Precedence-climbing (Pratt) parser.
//!
//! The parser holds exactly one lookahead token and pulls the next one
//! from the lexer on demand; no token array is ever built. Infix
//! expressions are resolved by a single `parse_expr(min_precedence)` loop
//! driven by the table below instead of one grammar rule per level.
//!
//! Precedence, low to high:
//!
//! | level | operators            | associativity |
//! |-------|----------------------|---------------|
//! | 1     | `=`                  | right         |
//! | 2     | `? :`                | right         |
//! | 3     | `\|\|`               | left          |
//! | 4     | `&&`                 | left          |
//! | 5     | `== != < > <= >=`    | left          |
//! | 6     | `.. ..=`             | none          |
//! | 7     | `+ -`                | left          |
//! | 8     | `* / %`              | left          |
//! | 9     | `^`                  | right         |
//! | 10    | `[...]` indexing     | postfix       |
//!
//! Unary `-`/`!` bind their operand at the exponentiation level, so
//! `-2 ^ 2` is `-(2 ^ 2)` while `-2 * 3` is `(-2) * 3`.
//!
//! Tree depth is bounded by [`MAX_NESTING`]: a source that would produce
//! a deeper tree is a syntax error, never a native stack overflow.

mod error;


pub use error::{ParseError, SyntaxErrorKind};

use ecow::EcoString;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::lexer::{Lexer, Token, TokenKind};

const PREC_ASSIGN: u8 = 1;
const PREC_TERNARY: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_COMPARISON: u8 = 5;
const PREC_RANGE: u8 = 6;
const PREC_ADDITIVE: u8 = 7;
const PREC_MULTIPLICATIVE: u8 = 8;
const PREC_POW: u8 = 9;
const PREC_POSTFIX: u8 = 10;

/// Maximum depth of the produced expression tree. Deeper sources fail
/// with a syntax error, which keeps this parser and every later
/// recursive pass over the AST within native stack bounds.
const MAX_NESTING: usize = 500;

/// Parse a whole source string.
///
/// Statements are expressions separated by `;` or newlines (the lexer
/// folds separators away). Zero statements is an error; one is returned
/// directly; several are wrapped in [`Node::Program`].
pub fn parse(source: &str) -> Result<Node, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut statements = Vec::new();
    while parser.current.kind != TokenKind::Eof {
        statements.push(parser.parse_expr(0)?);
    }
    match statements.pop() {
        None => Err(parser.syntax_error(SyntaxErrorKind::EmptyProgram)),
        Some(single) if statements.is_empty() => Ok(single),
        Some(last) => {
            statements.push(last);
            Ok(Node::Program(statements))
        }
    }
}

struct Parser<'src> {
    source: &'src str,
    lexer: Lexer<'src>,
    current: Token,
    depth: usize,
}

/// Plain binary operators driven purely by the precedence table.
/// `=`, `? :`, ranges and indexing have their own arms in `parse_expr`.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8, bool)> {
    let entry = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, PREC_OR, false),
        TokenKind::AmpAmp => (BinaryOp::And, PREC_AND, false),
        TokenKind::EqualEqual => (BinaryOp::Eq, PREC_COMPARISON, false),
        TokenKind::BangEqual => (BinaryOp::Neq, PREC_COMPARISON, false),
        TokenKind::Less => (BinaryOp::Lt, PREC_COMPARISON, false),
        TokenKind::LessEqual => (BinaryOp::Le, PREC_COMPARISON, false),
        TokenKind::Greater => (BinaryOp::Gt, PREC_COMPARISON, false),
        TokenKind::GreaterEqual => (BinaryOp::Ge, PREC_COMPARISON, false),
        TokenKind::Plus => (BinaryOp::Add, PREC_ADDITIVE, false),
        TokenKind::Minus => (BinaryOp::Sub, PREC_ADDITIVE, false),
        TokenKind::Star => (BinaryOp::Mul, PREC_MULTIPLICATIVE, false),
        TokenKind::Slash => (BinaryOp::Div, PREC_MULTIPLICATIVE, false),
        TokenKind::Percent => (BinaryOp::Mod, PREC_MULTIPLICATIVE, false),
        TokenKind::Caret => (BinaryOp::Pow, PREC_POW, true),
        _ => return None,
    };
    Some(entry)
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            source,
            lexer,
            current,
            depth: 0,
        })
    }

    /// Consume the current token and pull the next one.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let consumed = self.current;
        self.current = self.lexer.next_token()?;
        Ok(consumed)
    }

    fn syntax_error(&self, kind: SyntaxErrorKind) -> ParseError {
        ParseError::Syntax {
            kind,
            offset: self.current.start,
        }
    }

    /// Consume a required closing delimiter.
    fn expect_closing(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.current.kind == kind {
            self.advance()?;
            Ok(())
        } else {
            Err(self.syntax_error(SyntaxErrorKind::MissingClosing {
                expected: kind.describe(),
            }))
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Node, ParseError> {
        let entry_depth = self.depth;
        let result = self.parse_expr_deeper(min_prec);
        self.depth = entry_depth;
        result
    }

    /// Body of [`Parser::parse_expr`]. [`Parser::deepen`] runs once per
    /// prefix expression and once per infix combination, so the counter
    /// bounds the depth of the produced tree, not just the recursion here:
    /// a long flat chain grows its left-leaning tree one level per
    /// operator and trips the limit just like nested parentheses do.
    fn parse_expr_deeper(&mut self, min_prec: u8) -> Result<Node, ParseError> {
        self.deepen()?;
        let mut left = self.parse_prefix()?;

        loop {
            match self.current.kind {
                TokenKind::Equal if PREC_ASSIGN >= min_prec => {
                    let Node::Identifier(name) = left else {
                        return Err(self.syntax_error(SyntaxErrorKind::InvalidAssignmentTarget));
                    };
                    self.deepen()?;
                    self.advance()?;
                    let value = self.parse_expr(PREC_ASSIGN)?;
                    left = Node::assignment(name, value);
                }
                TokenKind::Question if PREC_TERNARY >= min_prec => {
                    self.deepen()?;
                    self.advance()?;
                    let consequent = self.parse_expr(0)?;
                    self.expect_closing(TokenKind::Colon)?;
                    let alternate = self.parse_expr(PREC_TERNARY)?;
                    left = Node::conditional(left, consequent, alternate);
                }
                kind @ (TokenKind::DotDot | TokenKind::DotDotEq) if PREC_RANGE >= min_prec => {
                    self.deepen()?;
                    self.advance()?;
                    // Non-associative: `1..2..3` parses as `(1..2)..3` and
                    // fails at run time since a range bound must be numeric.
                    let end = self.parse_expr(PREC_RANGE + 1)?;
                    left = Node::range(left, end, kind == TokenKind::DotDotEq);
                }
                TokenKind::LBracket if PREC_POSTFIX >= min_prec => {
                    self.deepen()?;
                    self.advance()?;
                    let index = self.parse_expr(0)?;
                    self.expect_closing(TokenKind::RBracket)?;
                    left = Node::index(left, index);
                }
                kind => {
                    let Some((op, prec, right_assoc)) = binary_op(kind) else {
                        break;
                    };
                    if prec < min_prec {
                        break;
                    }
                    self.deepen()?;
                    self.advance()?;
                    let next_min = if right_assoc { prec } else { prec + 1 };
                    let right = self.parse_expr(next_min)?;
                    left = Node::binary(op, left, right);
                }
            }
        }

        Ok(left)
    }

    fn deepen(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            Err(self.syntax_error(SyntaxErrorKind::NestingTooDeep { limit: MAX_NESTING }))
        } else {
            Ok(())
        }
    }

    fn parse_prefix(&mut self) -> Result<Node, ParseError> {
        match self.current.kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::String => self.parse_string(),
            TokenKind::True => {
                self.advance()?;
                Ok(Node::Boolean(true))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(Node::Boolean(false))
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                let name: EcoString = token.text(self.source).into();
                if self.current.kind == TokenKind::LParen {
                    self.advance()?;
                    let args = self.parse_arguments(TokenKind::RParen)?;
                    Ok(Node::Call { name, args })
                } else {
                    Ok(Node::Identifier(name))
                }
            }
            TokenKind::Minus => {
                self.advance()?;
                let operand = self.parse_expr(PREC_POW)?;
                Ok(Node::unary(UnaryOp::Neg, operand))
            }
            TokenKind::Bang => {
                self.advance()?;
                let operand = self.parse_expr(PREC_POW)?;
                Ok(Node::unary(UnaryOp::Not, operand))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expr(0)?;
                self.expect_closing(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance()?;
                let elements = self.parse_arguments(TokenKind::RBracket)?;
                Ok(Node::Array(elements))
            }
            TokenKind::Eof => Err(self.syntax_error(SyntaxErrorKind::UnexpectedEof)),
            kind => Err(self.syntax_error(SyntaxErrorKind::UnexpectedToken {
                expected: "an expression",
                found: kind.describe(),
            })),
        }
    }

    /// Comma-separated expressions up to (and consuming) `closing`.
    /// No trailing comma.
    fn parse_arguments(&mut self, closing: TokenKind) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        if self.current.kind == closing {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                kind if kind == closing => {
                    self.advance()?;
                    return Ok(args);
                }
                _ => {
                    return Err(self.syntax_error(SyntaxErrorKind::MissingClosing {
                        expected: closing.describe(),
                    }));
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Node, ParseError> {
        let token = self.advance()?;
        let text = token.text(self.source);
        match text.parse::<f64>() {
            Ok(value) => Ok(Node::Number(value)),
            Err(_) => Err(ParseError::Syntax {
                kind: SyntaxErrorKind::InvalidNumber,
                offset: token.start,
            }),
        }
    }

    /// Materialize a string literal, interpreting backslash escapes.
    /// `\n`, `\t`, `\r`, `\\` and the quote escapes map to their usual
    /// characters; any other escaped character stands for itself.
    fn parse_string(&mut self) -> Result<Node, ParseError> {
        let token = self.advance()?;
        let raw = &self.source[token.start + 1..token.end - 1];

        if !raw.contains('\\') {
            return Ok(Node::string(raw));
        }

        let mut text = EcoString::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                text.push(ch);
                continue;
            }
            // The lexer guarantees a backslash is never the final character.
            match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some(other) => text.push(other),
                None => {}
            }
        }
        Ok(Node::String(text))
    }
}
