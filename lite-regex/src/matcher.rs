//! Full-string matching over a compiled automaton
//!
//! Both automata answer the same question, whether the whole text is in the
//! language, and must agree on every input. The NFA walks a set of active
//! states; the DFA walks a single state through its transition table.
//! Neither searches for substrings.

use crate::dfa::Dfa;
use crate::nfa::Nfa;

/// A compiled pattern that can test whole strings
pub trait Matcher {
    /// Whether the entire `text` is accepted
    fn matches(&self, text: &str) -> bool;

    /// Shortest accepted length, in characters
    fn min_length(&self) -> usize;

    /// Longest accepted length, in characters; `None` when unbounded
    fn max_length(&self) -> Option<usize>;

    /// Whether a text of `len` characters could be accepted at all
    fn admits_length(&self, len: usize) -> bool {
        len >= self.min_length() && self.max_length().is_none_or(|max| len <= max)
    }
}

impl Matcher for Nfa {
    fn matches(&self, text: &str) -> bool {
        let mut active = self.initial_states();

        for c in text.chars() {
            active = self.step(&active, c);
            if active.is_empty() {
                return false;
            }
        }

        self.is_accepting(&active)
    }

    fn min_length(&self) -> usize {
        Nfa::min_length(self)
    }

    fn max_length(&self) -> Option<usize> {
        Nfa::max_length(self)
    }
}

impl Matcher for Dfa {
    fn matches(&self, text: &str) -> bool {
        let mut state = self.start();

        for c in text.chars() {
            match self.next(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }

        self.is_accepting(state)
    }

    fn min_length(&self) -> usize {
        Dfa::min_length(self)
    }

    fn max_length(&self) -> Option<usize> {
        Dfa::max_length(self)
    }
}
