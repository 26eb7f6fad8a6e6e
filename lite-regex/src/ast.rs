//! Abstract Syntax Tree (AST) for regex patterns
//!
//! The AST is a closed set of variants; the NFA builder dispatches on it with
//! an exhaustive `match`. Concatenation and alternation are binary, built
//! left-associatively by the parser, so a long literal or a long list of
//! alternatives is a deep left spine. Everything that walks those spines
//! (printing, dropping, NFA construction) does so iteratively.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::ops::RangeInclusive;

/// The characters `.` and negated classes range over
pub const ALPHABET: RangeInclusive<char> = '\0'..='\x7f';

/// Members of `\w`
pub fn word_chars() -> impl Iterator<Item = char> {
    ('a'..='z').chain('A'..='Z').chain('0'..='9').chain(['_'])
}

/// Members of `\d`
pub fn digit_chars() -> impl Iterator<Item = char> {
    '0'..='9'
}

/// An expression in the AST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Matches only the empty string (an empty term such as `a|`)
    Empty,

    /// A literal character
    Literal(char),

    /// Any character in the supported alphabet (`.`)
    AnyChar,

    /// Word character shorthand (`\w`)
    WordClass,

    /// Digit shorthand (`\d`)
    DigitClass,

    /// A character class `[abc]`, `[^abc]` or `[a-z]`
    CharClass(CharClass),

    /// Concatenation of two expressions
    Concat(Box<Expr>, Box<Expr>),

    /// Alternation of two expressions (`a|b`)
    Alternate(Box<Expr>, Box<Expr>),

    /// Postfix repetition (`*`, `+`, `?`)
    Repeat {
        /// The expression being repeated
        expr: Box<Expr>,
        /// The repetition operator
        op: RepeatOp,
    },

    /// Counted repetition (`{m}`, `{m,}`, `{m,n}`)
    Quantifier {
        /// The expression being repeated
        expr: Box<Expr>,
        /// Minimum number of occurrences
        min: u32,
        /// Maximum number of occurrences, `None` when unbounded
        max: Option<u32>,
    },
}

/// A character class with its members already expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    /// The characters named by the class
    pub chars: BTreeSet<char>,
    /// Whether the class is negated `[^...]`
    pub negated: bool,
}

/// A postfix repetition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatOp {
    /// Zero or more (`*`)
    ZeroOrMore,
    /// One or more (`+`)
    OneOrMore,
    /// Zero or one (`?`)
    Optional,
}

impl RepeatOp {
    /// Map an operator character to its repetition
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(RepeatOp::ZeroOrMore),
            '+' => Some(RepeatOp::OneOrMore),
            '?' => Some(RepeatOp::Optional),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            RepeatOp::ZeroOrMore => '*',
            RepeatOp::OneOrMore => '+',
            RepeatOp::Optional => '?',
        }
    }
}

/// Returned when a counted quantifier has `max < min`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBounds {
    pub min: u32,
    pub max: u32,
}

impl fmt::Display for InvalidBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max < min ({} < {}): max must be >= min",
            self.max, self.min
        )
    }
}

impl Expr {
    /// Create a literal expression
    pub fn literal(c: char) -> Self {
        Expr::Literal(c)
    }

    /// Create a concatenation
    pub fn concat(left: Expr, right: Expr) -> Self {
        Expr::Concat(Box::new(left), Box::new(right))
    }

    /// Create an alternation
    pub fn alternate(left: Expr, right: Expr) -> Self {
        Expr::Alternate(Box::new(left), Box::new(right))
    }

    /// Create a character class
    pub fn char_class(chars: impl IntoIterator<Item = char>, negated: bool) -> Self {
        Expr::CharClass(CharClass {
            chars: chars.into_iter().collect(),
            negated,
        })
    }

    /// Create a postfix repetition
    pub fn repeat(expr: Expr, op: RepeatOp) -> Self {
        Expr::Repeat {
            expr: Box::new(expr),
            op,
        }
    }

    /// Create a counted repetition, rejecting `max < min`
    pub fn quantifier(expr: Expr, min: u32, max: Option<u32>) -> Result<Self, InvalidBounds> {
        if let Some(max) = max
            && max < min
        {
            return Err(InvalidBounds { min, max });
        }
        Ok(Expr::Quantifier {
            expr: Box::new(expr),
            min,
            max,
        })
    }

    /// Concatenate a list of expressions left to right
    pub fn sequence(exprs: impl IntoIterator<Item = Expr>) -> Self {
        exprs
            .into_iter()
            .reduce(Expr::concat)
            .unwrap_or(Expr::Empty)
    }

    /// The operands of a left-leaning `Concat` chain, in pattern order
    ///
    /// Anything that is not a `Concat` is a chain of one.
    pub fn concat_parts(&self) -> Vec<&Expr> {
        let mut parts = Vec::new();
        let mut node = self;
        while let Expr::Concat(left, right) = node {
            parts.push(right.as_ref());
            node = left;
        }
        parts.push(node);
        parts.reverse();
        parts
    }

    /// The branches of a left-leaning `Alternate` chain, in pattern order
    pub fn alternatives(&self) -> Vec<&Expr> {
        let mut branches = Vec::new();
        let mut node = self;
        while let Expr::Alternate(left, right) = node {
            branches.push(right.as_ref());
            node = left;
        }
        branches.push(node);
        branches.reverse();
        branches
    }

    /// Whether this node owns no subexpressions
    fn is_leaf(&self) -> bool {
        match self {
            Expr::Concat(..) | Expr::Alternate(..) => false,
            Expr::Repeat { .. } | Expr::Quantifier { .. } => false,
            _ => true,
        }
    }

    /// Convert the AST back to pattern text
    pub fn to_pattern_string(&self) -> String {
        match self {
            Expr::Empty => String::new(),
            Expr::Literal(c) => escape_literal(*c),
            Expr::AnyChar => ".".to_string(),
            Expr::WordClass => "\\w".to_string(),
            Expr::DigitClass => "\\d".to_string(),
            Expr::CharClass(cc) => cc.to_pattern_string(),
            Expr::Concat(..) => self
                .concat_parts()
                .into_iter()
                .map(Expr::concat_operand)
                .collect(),
            Expr::Alternate(..) => self
                .alternatives()
                .into_iter()
                .map(Expr::to_pattern_string)
                .collect::<Vec<_>>()
                .join("|"),
            Expr::Repeat { expr, op } => format!("{}{}", expr.repeat_operand(), op.as_char()),
            Expr::Quantifier { expr, min, max } => {
                let bounds = match max {
                    Some(max) if max == min => format!("{{{}}}", min),
                    Some(max) => format!("{{{},{}}}", min, max),
                    None => format!("{{{},}}", min),
                };
                format!("{}{}", expr.repeat_operand(), bounds)
            }
        }
    }

    fn concat_operand(&self) -> String {
        match self {
            Expr::Alternate(..) => format!("({})", self.to_pattern_string()),
            _ => self.to_pattern_string(),
        }
    }

    fn repeat_operand(&self) -> String {
        match self {
            Expr::Concat(..)
            | Expr::Alternate(..)
            | Expr::Repeat { .. }
            | Expr::Quantifier { .. }
            | Expr::Empty => format!("({})", self.to_pattern_string()),
            _ => self.to_pattern_string(),
        }
    }
}

/// Drops with an explicit stack so that deep spines cannot exhaust the
/// call stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let deep = match self {
            Expr::Concat(left, right) | Expr::Alternate(left, right) => {
                !left.is_leaf() || !right.is_leaf()
            }
            Expr::Repeat { expr, .. } | Expr::Quantifier { expr, .. } => !expr.is_leaf(),
            _ => false,
        };
        if !deep {
            return;
        }

        let mut stack = vec![mem::replace(self, Expr::Empty)];
        while let Some(mut expr) = stack.pop() {
            match &mut expr {
                Expr::Concat(left, right) | Expr::Alternate(left, right) => {
                    stack.push(mem::replace(&mut **left, Expr::Empty));
                    stack.push(mem::replace(&mut **right, Expr::Empty));
                }
                Expr::Repeat { expr: child, .. } | Expr::Quantifier { expr: child, .. } => {
                    stack.push(mem::replace(&mut **child, Expr::Empty));
                }
                _ => {}
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pattern_string())
    }
}

impl CharClass {
    fn to_pattern_string(&self) -> String {
        let mut result = String::from("[");
        if self.negated {
            result.push('^');
        }
        for &c in &self.chars {
            if matches!(c, ']' | '\\' | '-' | '^') {
                result.push('\\');
            }
            result.push(c);
        }
        result.push(']');
        result
    }
}

fn escape_literal(c: char) -> String {
    match c {
        '.' | '*' | '+' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '\\' => {
            format!("\\{}", c)
        }
        _ => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert_eq!(Expr::literal('a').to_pattern_string(), "a");
        assert_eq!(Expr::literal('.').to_pattern_string(), "\\.");
    }

    #[test]
    fn test_sequence() {
        let expr = Expr::sequence(vec![
            Expr::literal('a'),
            Expr::literal('b'),
            Expr::literal('c'),
        ]);
        assert_eq!(expr.to_pattern_string(), "abc");
        assert!(matches!(expr, Expr::Concat(..)));
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(Expr::sequence(Vec::new()), Expr::Empty);
    }

    #[test]
    fn test_alternation_inside_concat() {
        let expr = Expr::concat(
            Expr::literal('a'),
            Expr::alternate(Expr::literal('b'), Expr::literal('c')),
        );
        assert_eq!(expr.to_string(), "a(b|c)");
    }

    #[test]
    fn test_repeat() {
        let expr = Expr::repeat(
            Expr::alternate(Expr::literal('b'), Expr::literal('c')),
            RepeatOp::ZeroOrMore,
        );
        assert_eq!(expr.to_string(), "(b|c)*");
    }

    #[test]
    fn test_character_class() {
        let expr = Expr::char_class(['c', 'a', 'b'], true);
        assert_eq!(expr.to_string(), "[^abc]");
    }

    #[test]
    fn test_quantifier_forms() {
        let a = || Expr::literal('a');
        assert_eq!(Expr::quantifier(a(), 3, Some(3)).unwrap().to_string(), "a{3}");
        assert_eq!(Expr::quantifier(a(), 2, Some(5)).unwrap().to_string(), "a{2,5}");
        assert_eq!(Expr::quantifier(a(), 2, None).unwrap().to_string(), "a{2,}");
    }

    #[test]
    fn test_quantifier_rejects_inverted_bounds() {
        let err = Expr::quantifier(Expr::literal('a'), 3, Some(1)).unwrap_err();
        assert_eq!(err, InvalidBounds { min: 3, max: 1 });
        assert!(err.to_string().contains("max < min"));
    }

    #[test]
    fn test_spines_in_pattern_order() {
        let expr = Expr::sequence("abc".chars().map(Expr::literal));
        let parts: Vec<_> = expr.concat_parts().into_iter().cloned().collect();
        assert_eq!(parts, vec![Expr::literal('a'), Expr::literal('b'), Expr::literal('c')]);

        let expr = Expr::alternate(
            Expr::alternate(Expr::literal('x'), Expr::literal('y')),
            Expr::literal('z'),
        );
        assert_eq!(expr.alternatives().len(), 3);
        assert_eq!(expr.to_string(), "x|y|z");
        assert_eq!(Expr::literal('q').alternatives(), vec![&Expr::literal('q')]);
    }

    #[test]
    fn test_deep_spines_print_and_drop() {
        let literal = Expr::sequence(std::iter::repeat_n(Expr::literal('x'), 200_000));
        assert_eq!(literal.to_pattern_string().len(), 200_000);
        drop(literal);

        let branches = (0..50_000)
            .map(|_| Expr::literal('a'))
            .reduce(Expr::alternate)
            .unwrap();
        assert_eq!(branches.alternatives().len(), 50_000);
        drop(branches);
    }

    #[test]
    fn test_repeat_op_chars() {
        for c in ['*', '+', '?'] {
            assert_eq!(RepeatOp::from_char(c).unwrap().as_char(), c);
        }
        assert_eq!(RepeatOp::from_char('x'), None);
    }
}
