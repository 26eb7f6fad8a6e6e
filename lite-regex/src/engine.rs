//! The compile pipeline and the compiled matcher
//!
//! `pattern -> tokens -> AST -> NFA -> (DFA)`. Tokens and the AST are dropped
//! once the NFA exists; with [`Strategy::Dfa`] the NFA is dropped too once
//! the DFA is built. A compiled [`Regex`] is immutable and can be shared
//! across threads.

use crate::ast::Expr;
use crate::dfa::{self, Dfa, DfaBuilder};
use crate::error::Result;
use crate::lexer::tokenize;
use crate::matcher::Matcher;
use crate::nfa::{self, Nfa, NfaBuilder};
use crate::parser::{self, Parser};
use log::debug;
use std::fmt;

/// Which automaton answers `matches`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Subset-construct a DFA and walk its table
    #[default]
    Dfa,
    /// Simulate the NFA directly
    Nfa,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Dfa => write!(f, "dfa"),
            Strategy::Nfa => write!(f, "nfa"),
        }
    }
}

#[derive(Debug, Clone)]
enum Automaton {
    Nfa(Nfa),
    Dfa(Dfa),
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    automaton: Automaton,
    length_prefilter: bool,
}

impl Regex {
    /// Compile a pattern with default settings
    pub fn new(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern).build()
    }

    /// Whether the entire `text` matches the pattern
    pub fn matches(&self, text: &str) -> bool {
        if self.length_prefilter && !self.admits_length(text.chars().count()) {
            return false;
        }
        match &self.automaton {
            Automaton::Nfa(nfa) => nfa.matches(text),
            Automaton::Dfa(dfa) => dfa.matches(text),
        }
    }

    /// The pattern this was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn strategy(&self) -> Strategy {
        match self.automaton {
            Automaton::Nfa(_) => Strategy::Nfa,
            Automaton::Dfa(_) => Strategy::Dfa,
        }
    }

    /// Number of states in the retained automaton
    pub fn state_count(&self) -> usize {
        match &self.automaton {
            Automaton::Nfa(nfa) => nfa.state_count(),
            Automaton::Dfa(dfa) => dfa.state_count(),
        }
    }

    pub fn min_length(&self) -> usize {
        match &self.automaton {
            Automaton::Nfa(nfa) => nfa.min_length(),
            Automaton::Dfa(dfa) => dfa.min_length(),
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        match &self.automaton {
            Automaton::Nfa(nfa) => nfa.max_length(),
            Automaton::Dfa(dfa) => dfa.max_length(),
        }
    }

    pub fn as_nfa(&self) -> Option<&Nfa> {
        match &self.automaton {
            Automaton::Nfa(nfa) => Some(nfa),
            Automaton::Dfa(_) => None,
        }
    }

    pub fn as_dfa(&self) -> Option<&Dfa> {
        match &self.automaton {
            Automaton::Dfa(dfa) => Some(dfa),
            Automaton::Nfa(_) => None,
        }
    }
}

impl Matcher for Regex {
    fn matches(&self, text: &str) -> bool {
        Regex::matches(self, text)
    }

    fn min_length(&self) -> usize {
        Regex::min_length(self)
    }

    fn max_length(&self) -> Option<usize> {
        Regex::max_length(self)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Configures and compiles a [`Regex`]
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    strategy: Strategy,
    length_prefilter: bool,
    max_repeat: u32,
    nfa_state_limit: usize,
    nfa_transition_limit: usize,
    dfa_state_limit: usize,
    dfa_transition_limit: usize,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.to_string(),
            strategy: Strategy::default(),
            length_prefilter: true,
            max_repeat: parser::DEFAULT_MAX_REPEAT,
            nfa_state_limit: nfa::DEFAULT_STATE_LIMIT,
            nfa_transition_limit: nfa::DEFAULT_TRANSITION_LIMIT,
            dfa_state_limit: dfa::DEFAULT_STATE_LIMIT,
            dfa_transition_limit: dfa::DEFAULT_TRANSITION_LIMIT,
        }
    }

    /// Choose NFA simulation or DFA table walk
    pub fn strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.strategy = strategy;
        self
    }

    /// Reject texts outside the pattern's length bounds before matching
    pub fn length_prefilter(&mut self, enabled: bool) -> &mut Self {
        self.length_prefilter = enabled;
        self
    }

    /// Largest bound accepted in `{m,n}`
    pub fn max_repeat(&mut self, limit: u32) -> &mut Self {
        self.max_repeat = limit;
        self
    }

    /// Largest NFA the pattern may produce
    pub fn nfa_state_limit(&mut self, limit: usize) -> &mut Self {
        self.nfa_state_limit = limit;
        self
    }

    /// Most character edges the NFA may hold
    pub fn nfa_transition_limit(&mut self, limit: usize) -> &mut Self {
        self.nfa_transition_limit = limit;
        self
    }

    /// Largest DFA subset construction may produce
    pub fn dfa_state_limit(&mut self, limit: usize) -> &mut Self {
        self.dfa_state_limit = limit;
        self
    }

    /// Most edges the DFA transition table may hold
    pub fn dfa_transition_limit(&mut self, limit: usize) -> &mut Self {
        self.dfa_transition_limit = limit;
        self
    }

    /// Lex and parse the pattern with these settings, without building
    /// an automaton
    pub fn parse(&self) -> Result<Expr> {
        let pattern = self.pattern.as_str();
        let tokens = tokenize(pattern)?;
        debug!("lexed {:?} into {} tokens", pattern, tokens.len());

        Parser::new(&tokens, pattern)
            .with_max_repeat(self.max_repeat)
            .parse()
    }

    pub fn build(&self) -> Result<Regex> {
        let pattern = self.pattern.as_str();

        let nfa = {
            let ast = self.parse()?;
            debug!("parsed {:?} as {}", pattern, ast);

            NfaBuilder::new()
                .with_state_limit(self.nfa_state_limit)
                .with_transition_limit(self.nfa_transition_limit)
                .build(&ast)
                .map_err(|e| e.with_pattern(pattern))?
        };
        debug!(
            "built NFA with {} states, length bounds [{}, {}]",
            nfa.state_count(),
            nfa.min_length(),
            nfa.max_length()
                .map_or_else(|| "unbounded".to_string(), |max| max.to_string())
        );

        let automaton = match self.strategy {
            Strategy::Nfa => Automaton::Nfa(nfa),
            Strategy::Dfa => {
                let dfa = DfaBuilder::new()
                    .with_state_limit(self.dfa_state_limit)
                    .with_transition_limit(self.dfa_transition_limit)
                    .build(&nfa)
                    .map_err(|e| e.with_pattern(pattern))?;
                debug!(
                    "built DFA with {} states and {} transitions",
                    dfa.state_count(),
                    dfa.transition_count()
                );
                Automaton::Dfa(dfa)
            }
        };

        Ok(Regex {
            pattern: self.pattern.clone(),
            automaton,
            length_prefilter: self.length_prefilter,
        })
    }
}

/// Compile a pattern into a DFA-backed matcher
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
}
