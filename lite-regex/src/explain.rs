//! Human-readable pattern explanations
//!
//! Works from the token stream alone: one line per token, keyed by its kind.

use crate::error::Result;
use crate::lexer::{Token, TokenKind, tokenize};

/// Explain `pattern` one token per line
pub fn explain(pattern: &str) -> Result<String> {
    let tokens = tokenize(pattern)?;

    let mut explanation = format!("Pattern explanation for: {}\n\n", pattern);
    for token in &tokens {
        explanation.push_str(&describe(token));
        explanation.push('\n');
    }

    Ok(explanation)
}

/// Describe a single token
pub fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Char => format!("• Matches literal character '{}'", token.value),
        TokenKind::Escaped => format!("• Matches escaped literal character '{}'", token.value),
        TokenKind::Dot => "• Matches any single ASCII character".to_string(),
        TokenKind::Star => "• Matches zero or more of the preceding element".to_string(),
        TokenKind::Plus => "• Matches one or more of the preceding element".to_string(),
        TokenKind::Question => {
            "• Matches zero or one of the preceding element (optional)".to_string()
        }
        TokenKind::LeftParen => "• Starts a group".to_string(),
        TokenKind::RightParen => "• Ends a group".to_string(),
        TokenKind::Pipe => {
            "• OR operator - matches either the pattern before or after".to_string()
        }
        TokenKind::LeftBracket => {
            "• Starts a character class (matches any one character from the set)".to_string()
        }
        TokenKind::RightBracket => "• Ends a character class".to_string(),
        TokenKind::Caret => {
            "• Negates the character class ('^' anchors are not supported)".to_string()
        }
        TokenKind::Dollar => {
            "• '$' anchor (not supported: patterns always match the whole input)".to_string()
        }
        TokenKind::Dash => "• Range operator between the surrounding characters".to_string(),
        TokenKind::Word => "• Matches word characters (letters, digits, underscore)".to_string(),
        TokenKind::Digit => "• Matches any digit (0-9)".to_string(),
        TokenKind::LeftBrace => "• Starts a repetition count {min,max}".to_string(),
        TokenKind::RightBrace => "• Ends a repetition count".to_string(),
        TokenKind::Number => format!("• Repetition count digit '{}'", token.value),
        TokenKind::Comma => "• Separates the minimum and maximum repetition count".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_per_token() {
        let text = explain(r"a(b|c)*\d").unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], r"Pattern explanation for: a(b|c)*\d");
        assert_eq!(lines[1], "");
        assert_eq!(lines.len(), 2 + 8);
        assert_eq!(lines[2], "• Matches literal character 'a'");
        assert_eq!(lines[9], "• Matches any digit (0-9)");
    }

    #[test]
    fn test_class_and_quantifier() {
        let text = explain("[^a-z]{2,3}").unwrap();
        assert!(text.contains("Negates the character class"));
        assert!(text.contains("Range operator"));
        assert!(text.contains("Repetition count digit '3'"));
    }

    #[test]
    fn test_explains_patterns_the_parser_rejects() {
        // explanation only needs tokens
        let text = explain("^a$").unwrap();
        assert!(text.contains("anchor"));
    }

    #[test]
    fn test_lexer_errors_propagate() {
        assert!(explain(r"a\").is_err());
        assert!(explain("[abc").is_err());
    }
}
