//! Error types for the regex compiler
//!
//! Every failure in the pipeline (lexing, parsing, automaton construction)
//! is reported through the single [`RegexError`] shape, so callers need one
//! handling path. The [`ErrorKind`] records which stage produced it.

use std::fmt;
use thiserror::Error;

/// The stage of compilation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Dangling escape or a character class left open at end of pattern
    Lex,
    /// Unexpected or missing tokens, bad ranges, bad quantifier bounds
    Parse,
    /// Internal failure while turning a validated AST into an automaton
    Build,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "lex"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Build => write!(f, "build"),
        }
    }
}

/// A compilation failure with the location it points at
///
/// The rendered form is the multi-line layout consumed by the CLI:
///
/// ```text
/// Regex parse error: Missing closing parenthesis
/// At position 4 in pattern:
/// (a|b
///     ^
/// Details: No matching ')' for opening '(' at position 0
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{message}\nAt position {position} in pattern:\n{pattern}\n{marker}\nDetails: {details}",
    marker = position_marker(.position)
)]
pub struct RegexError {
    /// Which stage failed
    pub kind: ErrorKind,
    /// One-line summary
    pub message: String,
    /// 0-based character offset into the pattern
    pub position: usize,
    /// The full pattern being compiled
    pub pattern: String,
    /// Free-form explanation of the failure
    pub details: String,
}

impl RegexError {
    /// Create a new error
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        position: usize,
        pattern: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        RegexError {
            kind,
            message: message.into(),
            position,
            pattern: pattern.into(),
            details: details.into(),
        }
    }

    /// Create a lexer error
    pub fn lex(
        message: impl Into<String>,
        position: usize,
        pattern: &str,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Lex,
            format!("Regex lex error: {}", message.into()),
            position,
            pattern,
            details,
        )
    }

    /// Create a parser error
    pub fn parse(
        message: impl Into<String>,
        position: usize,
        pattern: &str,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Parse,
            format!("Regex parse error: {}", message.into()),
            position,
            pattern,
            details,
        )
    }

    /// Create an automaton construction error
    pub fn build(
        message: impl Into<String>,
        pattern: &str,
        details: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Build,
            format!("Regex build error: {}", message.into()),
            0,
            pattern,
            details,
        )
    }

    /// Attach the pattern text to an error raised without it
    pub(crate) fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }
}

fn position_marker(position: &usize) -> String {
    let mut marker = " ".repeat(*position);
    marker.push('^');
    marker
}

/// Result type alias for regex operations
pub type Result<T> = std::result::Result<T, RegexError>;
