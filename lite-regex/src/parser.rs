//! Parser for regex patterns
//!
//! This module provides a recursive descent parser that converts
//! tokens into an Abstract Syntax Tree (AST).
//!
//! Grammar (in order of precedence, lowest to highest):
//!   expression := term ( '|' term )*
//!   term       := factor*
//!   factor     := base ( '*' | '+' | '?' | '{' min [',' [max]] '}' )?
//!   base       := CHAR | ESCAPE CHAR | '.' | '\w' | '\d' | '(' expression ')'
//!                 | '[' class ']'
//!   class      := '^'? ( CHAR | CHAR '-' CHAR | '\w' | '\d' )+
//!
//! An empty term parses as [`Expr::Empty`], so `a|` matches `a` or the empty
//! string.

use crate::ast::{self, Expr, RepeatOp};
use crate::error::{RegexError, Result};
use crate::lexer::{Token, TokenKind, tokenize};
use std::collections::BTreeSet;

/// Default cap on the bounds of a `{m,n}` quantifier
pub const DEFAULT_MAX_REPEAT: u32 = 1000;

/// Largest number of members an explicit character class may hold
pub const MAX_CLASS_SIZE: usize = 1 << 16;

/// Deepest allowed nesting of parenthesised groups
pub const MAX_NESTING: usize = 256;

/// Parser for regex patterns
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    pattern: &'a str,
    max_repeat: u32,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over the tokens of `pattern`
    pub fn new(tokens: &'a [Token], pattern: &'a str) -> Self {
        Parser {
            tokens,
            position: 0,
            pattern,
            max_repeat: DEFAULT_MAX_REPEAT,
            depth: 0,
        }
    }

    /// Reject quantifier bounds larger than `limit`
    pub fn with_max_repeat(mut self, limit: u32) -> Self {
        self.max_repeat = limit;
        self
    }

    /// Parse the entire token sequence and return the AST
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;

        if let Some(token) = self.peek() {
            return Err(self.error(
                "Unexpected token at end of pattern",
                format!("Expected end of pattern but found '{}'", token.value),
            ));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    /// Consume the current token if it has the given kind
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Position of the current token, or the pattern length when exhausted
    fn current_position(&self) -> usize {
        self.peek()
            .map(|t| t.position)
            .unwrap_or_else(|| self.pattern.chars().count())
    }

    fn error(&self, message: impl Into<String>, details: impl Into<String>) -> RegexError {
        self.error_at(self.current_position(), message, details)
    }

    fn error_at(
        &self,
        position: usize,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> RegexError {
        RegexError::parse(message, position, self.pattern, details)
    }

    /// expression := term ( '|' term )*
    fn parse_expression(&mut self) -> Result<Expr> {
        let mut expr = self.parse_term()?;

        while self.eat(TokenKind::Pipe) {
            let right = self.parse_term()?;
            expr = Expr::alternate(expr, right);
        }

        Ok(expr)
    }

    /// term := factor*
    fn parse_term(&mut self) -> Result<Expr> {
        let mut factors = Vec::new();

        while let Some(kind) = self.peek_kind() {
            if matches!(kind, TokenKind::Pipe | TokenKind::RightParen) {
                break;
            }
            factors.push(self.parse_factor()?);
        }

        Ok(Expr::sequence(factors))
    }

    /// factor := base ( '*' | '+' | '?' | quantifier )?
    fn parse_factor(&mut self) -> Result<Expr> {
        let base = self.parse_base()?;

        let op = match self.peek() {
            Some(token) if token.kind == TokenKind::LeftBrace => {
                return self.parse_quantifier(base);
            }
            Some(token)
                if matches!(
                    token.kind,
                    TokenKind::Star | TokenKind::Plus | TokenKind::Question
                ) =>
            {
                RepeatOp::from_char(token.value)
            }
            _ => None,
        };
        let Some(op) = op else {
            return Ok(base);
        };
        self.position += 1;
        Ok(Expr::repeat(base, op))
    }

    /// quantifier := '{' min [',' [max]] '}'
    fn parse_quantifier(&mut self, base: Expr) -> Result<Expr> {
        let open = self.current_position();
        self.position += 1; // consume '{'

        let min = self.parse_number()?;
        let max = if self.eat(TokenKind::Comma) {
            if self.peek_kind() == Some(TokenKind::RightBrace) {
                None
            } else {
                Some(self.parse_number()?)
            }
        } else {
            Some(min)
        };

        if !self.eat(TokenKind::RightBrace) {
            return Err(self.error(
                "Unclosed quantifier",
                format!("Expected '}}' to close quantifier opened at position {}", open),
            ));
        }

        let largest = max.unwrap_or(min);
        if largest > self.max_repeat {
            return Err(self.error_at(
                open,
                "Quantifier bound too large",
                format!(
                    "Bound {} exceeds the repetition limit of {}",
                    largest, self.max_repeat
                ),
            ));
        }

        Expr::quantifier(base, min, max).map_err(|bounds| {
            self.error_at(open, "Invalid quantifier range", bounds.to_string())
        })
    }

    /// A run of digits inside a quantifier
    fn parse_number(&mut self) -> Result<u32> {
        let mut value: Option<u32> = None;
        let start = self.current_position();

        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Number {
                break;
            }
            self.position += 1;
            let digit = token.value.to_digit(10).unwrap_or(0);
            value = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .map(Some)
                .ok_or_else(|| {
                    self.error_at(start, "Invalid number in quantifier", "Number too large")
                })?;
        }

        value.ok_or_else(|| {
            let found = match self.peek() {
                Some(token) => format!("Found '{}' where digits were expected", token.value),
                None => "Found end of pattern".to_string(),
            };
            self.error("Expected number in quantifier", found)
        })
    }

    /// base := CHAR | ESCAPE CHAR | '.' | '\w' | '\d' | '(' expression ')' | '[' class ']'
    fn parse_base(&mut self) -> Result<Expr> {
        let Some(token) = self.next() else {
            return Err(self.error(
                "Unexpected end of pattern",
                "Expected a character, group, or character class",
            ));
        };

        match token.kind {
            TokenKind::Char | TokenKind::Escaped => Ok(Expr::Literal(token.value)),
            TokenKind::Dot => Ok(Expr::AnyChar),
            TokenKind::Word => Ok(Expr::WordClass),
            TokenKind::Digit => Ok(Expr::DigitClass),
            TokenKind::LeftParen => self.parse_group(token),
            TokenKind::LeftBracket => self.parse_char_class(token),
            TokenKind::Caret | TokenKind::Dollar => Err(self.error_at(
                token.position,
                "Anchors are not supported",
                format!(
                    "'{}' is only valid as the negation marker at the start of a character class",
                    token.value
                ),
            )),
            _ => Err(self.error_at(
                token.position,
                format!("Unexpected token: {}", token),
                format!("Token '{}' is not valid in this position", token.value),
            )),
        }
    }

    fn parse_group(&mut self, open: Token) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(
                open.position,
                "Pattern nested too deeply",
                format!("Groups may nest at most {} levels", MAX_NESTING),
            ));
        }

        self.depth += 1;
        let inner = self.parse_expression()?;
        self.depth -= 1;

        if !self.eat(TokenKind::RightParen) {
            return Err(self.error(
                "Missing closing parenthesis",
                format!(
                    "No matching ')' for opening '(' at position {}",
                    open.position
                ),
            ));
        }

        Ok(inner)
    }

    /// class := '^'? ( CHAR | CHAR '-' CHAR | '\w' | '\d' )+ ']'
    fn parse_char_class(&mut self, open: Token) -> Result<Expr> {
        let negated = self.eat(TokenKind::Caret);
        let mut chars = BTreeSet::new();

        loop {
            let Some(token) = self.peek() else {
                return Err(self.error(
                    "Unclosed character class",
                    format!(
                        "Character class starting at position {} is not closed",
                        open.position
                    ),
                ));
            };
            self.position += 1;

            match token.kind {
                TokenKind::RightBracket => break,
                TokenKind::Word => chars.extend(ast::word_chars()),
                TokenKind::Digit => chars.extend(ast::digit_chars()),
                TokenKind::Dash => {
                    chars.insert('-');
                }
                _ if token.is_literal() => self.parse_class_member(token, &mut chars)?,
                _ => {
                    return Err(self.error_at(
                        token.position,
                        format!("Unexpected token in character class: {}", token),
                        format!("Token '{}' cannot appear inside '[...]'", token.value),
                    ));
                }
            }
        }

        if chars.is_empty() {
            return Err(self.error_at(
                open.position,
                "Empty character class",
                format!(
                    "Character class at position {} has no members",
                    open.position
                ),
            ));
        }

        if chars.len() > MAX_CLASS_SIZE {
            return Err(self.error_at(
                open.position,
                "Character class too large",
                format!("A class may name at most {} characters", MAX_CLASS_SIZE),
            ));
        }

        Ok(Expr::CharClass(ast::CharClass { chars, negated }))
    }

    /// A single member, or the start of a `start-end` range
    fn parse_class_member(&mut self, start: Token, chars: &mut BTreeSet<char>) -> Result<()> {
        let range_end = match (self.peek_kind(), self.tokens.get(self.position + 1)) {
            (Some(TokenKind::Dash), Some(end)) if end.is_literal() => Some(*end),
            _ => None,
        };

        let Some(end) = range_end else {
            chars.insert(start.value);
            return Ok(());
        };

        if start.value > end.value {
            return Err(self.error_at(
                start.position,
                "Invalid character range",
                format!(
                    "Range '{}-{}' is invalid (start > end)",
                    start.value, end.value
                ),
            ));
        }

        let span = end.value as usize - start.value as usize + 1;
        if span > MAX_CLASS_SIZE {
            return Err(self.error_at(
                start.position,
                "Character class too large",
                format!(
                    "Range '{}-{}' spans {} characters, more than the limit of {}",
                    start.value, end.value, span, MAX_CLASS_SIZE
                ),
            ));
        }

        chars.extend(start.value..=end.value);
        self.position += 2;
        Ok(())
    }
}

/// Parse a regex pattern string into an AST
pub fn parse(pattern: &str) -> Result<Expr> {
    let tokens = tokenize(pattern)?;
    Parser::new(&tokens, pattern).parse()
}
