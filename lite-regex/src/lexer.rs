//! Lexer for tokenizing regex patterns
//!
//! This module turns pattern text into a flat sequence of [`Token`]s, each
//! tagged with the character offset it came from. The lexer carries two bits
//! of context through the scan: whether it is inside `[...]` and whether it
//! is inside a `{m,n}` quantifier. Classes do not nest.

use crate::error::{RegexError, Result};
use std::fmt;

/// The kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A literal character
    Char,
    /// A literal produced by a `\x` escape; never acts as an operator
    Escaped,
    /// Dot `.` (any character)
    Dot,
    /// Star `*` (zero or more)
    Star,
    /// Plus `+` (one or more)
    Plus,
    /// Question `?` (optional)
    Question,
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Pipe `|` (alternation)
    Pipe,
    /// Left bracket `[` (start of character class)
    LeftBracket,
    /// Right bracket `]` (end of character class)
    RightBracket,
    /// Caret `^` (class negation)
    Caret,
    /// Dollar `$`
    Dollar,
    /// Dash `-` between two class members (range operator)
    Dash,
    /// Word character shorthand (`\w`)
    Word,
    /// Digit shorthand (`\d`)
    Digit,
    /// Left brace `{` (start of quantifier)
    LeftBrace,
    /// Right brace `}` (end of quantifier)
    RightBrace,
    /// A digit inside a quantifier
    Number,
    /// Comma `,` inside a quantifier
    Comma,
}

/// A token in a regex pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: char,
    /// 0-based character offset in the pattern
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: char, position: usize) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }

    /// Whether this token stands for a single literal character
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::Char | TokenKind::Escaped)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Char => write!(f, "literal `{}`", self.value),
            TokenKind::Escaped => write!(f, "escape `\\{}`", self.value),
            TokenKind::Word => write!(f, "shorthand `\\w`"),
            TokenKind::Digit => write!(f, "shorthand `\\d`"),
            TokenKind::Number => write!(f, "number `{}`", self.value),
            _ => write!(f, "`{}`", self.value),
        }
    }
}

/// Lexer for tokenizing regex patterns
pub struct Lexer<'a> {
    pattern: &'a str,
    chars: Vec<char>,
    position: usize,
    /// Whether we're currently inside a character class
    in_char_class: bool,
    /// Position of the `[` that opened the current class
    class_start: usize,
    /// Whether we're currently inside a `{m,n}` quantifier
    in_quantifier: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given pattern
    pub fn new(pattern: &'a str) -> Self {
        Lexer {
            pattern,
            chars: pattern.chars().collect(),
            position: 0,
            in_char_class: false,
            class_start: 0,
            in_quantifier: false,
        }
    }

    /// Tokenize the entire pattern
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::with_capacity(self.chars.len());
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        if self.in_char_class {
            return Err(RegexError::lex(
                "Unclosed character class",
                self.class_start,
                self.pattern,
                format!(
                    "Character class starting at position {} is not closed",
                    self.class_start
                ),
            ));
        }

        Ok(tokens)
    }

    /// Get the next token, or `None` at the end of the pattern
    fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(&c) = self.chars.get(self.position) else {
            return Ok(None);
        };
        let start = self.position;
        self.position += 1;

        if c == '\\' {
            return self.read_escape(start).map(Some);
        }

        let kind = if self.in_char_class {
            self.class_kind(c, start)
        } else if self.in_quantifier {
            self.quantifier_kind(c)
        } else {
            self.top_level_kind(c)
        };

        Ok(Some(Token::new(kind, c, start)))
    }

    /// Read an escape sequence (the backslash at `start` was already consumed)
    fn read_escape(&mut self, start: usize) -> Result<Token> {
        let Some(&c) = self.chars.get(self.position) else {
            return Err(RegexError::lex(
                "Invalid escape sequence",
                start,
                self.pattern,
                "Escape character '\\' at end of pattern",
            ));
        };
        self.position += 1;

        let kind = match c {
            'w' => TokenKind::Word,
            'd' => TokenKind::Digit,
            '.' => TokenKind::Char,
            _ => TokenKind::Escaped,
        };
        Ok(Token::new(kind, c, start))
    }

    fn top_level_kind(&mut self, c: char) -> TokenKind {
        match c {
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '$' => TokenKind::Dollar,
            ']' => TokenKind::RightBracket,
            '}' => TokenKind::RightBrace,
            '[' => {
                self.in_char_class = true;
                self.class_start = self.position - 1;
                TokenKind::LeftBracket
            }
            '{' => {
                self.in_quantifier = true;
                TokenKind::LeftBrace
            }
            _ => TokenKind::Char,
        }
    }

    fn quantifier_kind(&mut self, c: char) -> TokenKind {
        match c {
            '0'..='9' => TokenKind::Number,
            ',' => TokenKind::Comma,
            '}' => {
                self.in_quantifier = false;
                TokenKind::RightBrace
            }
            _ => TokenKind::Char,
        }
    }

    fn class_kind(&mut self, c: char, at: usize) -> TokenKind {
        match c {
            ']' => {
                self.in_char_class = false;
                TokenKind::RightBracket
            }
            '^' if at == self.class_start + 1 => TokenKind::Caret,
            '-' if self.is_range_dash(at) => TokenKind::Dash,
            _ => TokenKind::Char,
        }
    }

    /// A `-` is a range operator only between two class members
    fn is_range_dash(&self, at: usize) -> bool {
        let opens_class = at == self.class_start + 1
            || (at == self.class_start + 2 && self.chars[self.class_start + 1] == '^');
        let preceded = !opens_class && self.chars[at - 1] != '[';
        let followed = matches!(self.chars.get(at + 1), Some(&next) if next != ']');
        preceded && followed
    }
}

/// Tokenize a pattern in one call
pub fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    Lexer::new(pattern).tokenize()
}
