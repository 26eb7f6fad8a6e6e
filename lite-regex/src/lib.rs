//! lite-regex
//!
//! A small regex compiler for full-string matching. Patterns go through a
//! lexer and a recursive-descent parser, are turned into a Thompson NFA, and
//! are optionally subset-constructed into a DFA.
//!
//! ```
//! use lite_regex::compile;
//!
//! let regex = compile("a(b|c)*").unwrap();
//! assert!(regex.matches("abcbc"));
//! assert!(!regex.matches("abd"));
//! ```

pub mod ast;
pub mod dfa;
pub mod engine;
pub mod error;
pub mod explain;
pub mod lexer;
pub mod matcher;
pub mod nfa;
pub mod parser;

pub use ast::{CharClass, Expr, RepeatOp};
pub use dfa::{Dfa, DfaBuilder, DfaStateId};
pub use engine::{Regex, RegexBuilder, Strategy, compile};
pub use error::{ErrorKind, RegexError, Result};
pub use explain::explain;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use matcher::Matcher;
pub use nfa::{Nfa, NfaBuilder, State, StateId, StateSet};
pub use parser::{Parser, parse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // string -> tokens -> AST -> NFA -> DFA -> verdict
        let pattern = r"\d+(\.\d+)?";
        let tokens = tokenize(pattern).unwrap();
        assert_eq!(tokens.len(), 8);

        let ast = parse(pattern).unwrap();
        let nfa = Nfa::from_expr(&ast).unwrap();
        let dfa = Dfa::from_nfa(&nfa).unwrap();

        for text in ["42", "3.14", "3.", ".5", ""] {
            assert_eq!(nfa.matches(text), dfa.matches(text), "{text:?}");
        }
        assert!(dfa.matches("3.14"));
        assert!(!dfa.matches("3."));
    }

    #[test]
    fn test_compile_reports_structured_errors() {
        let err = compile("(a|b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.pattern, "(a|b");
        assert!(err.to_string().starts_with("Regex parse error"));
    }
}
