//! DFA (Deterministic Finite Automaton) via subset construction
//!
//! Each DFA state stands for a set of NFA states. A cache keyed by that set
//! makes sure every distinct subset is materialised once, which bounds the
//! construction and makes it terminate. Only symbols that advance some
//! member NFA state are explored; every other symbol is an implicit dead end.

use crate::error::{RegexError, Result};
use crate::nfa::{Nfa, StateSet};
use log::trace;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A DFA state ID
pub type DfaStateId = usize;

/// Default cap on the number of DFA states
pub const DEFAULT_STATE_LIMIT: usize = 10_000;

/// Default cap on the number of edges in the transition table
pub const DEFAULT_TRANSITION_LIMIT: usize = 1_000_000;

/// A DFA state and the NFA states it represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    pub nfa_states: StateSet,
}

/// A DFA (Deterministic Finite Automaton)
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: DfaStateId,
    accepting: HashSet<DfaStateId>,
    transitions: HashMap<(DfaStateId, char), DfaStateId>,
    min_length: usize,
    max_length: Option<usize>,
}

impl Dfa {
    /// Convert an NFA with the default state limit
    pub fn from_nfa(nfa: &Nfa) -> Result<Self> {
        DfaBuilder::new().build(nfa)
    }

    pub fn start(&self) -> DfaStateId {
        self.start
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn accepting_states(&self) -> &HashSet<DfaStateId> {
        &self.accepting
    }

    pub fn is_accepting(&self, id: DfaStateId) -> bool {
        self.accepting.contains(&id)
    }

    /// The transition on `c`, or `None` for a dead end
    pub fn next(&self, id: DfaStateId, c: char) -> Option<DfaStateId> {
        self.transitions.get(&(id, c)).copied()
    }

    /// Number of edges in the transition table
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

/// Subset construction over one NFA
#[derive(Debug)]
pub struct DfaBuilder {
    cache: HashMap<StateSet, DfaStateId>,
    states: Vec<DfaState>,
    accepting: HashSet<DfaStateId>,
    queue: VecDeque<DfaStateId>,
    state_limit: usize,
    transition_limit: usize,
}

impl DfaBuilder {
    pub fn new() -> Self {
        DfaBuilder {
            cache: HashMap::new(),
            states: Vec::new(),
            accepting: HashSet::new(),
            queue: VecDeque::new(),
            state_limit: DEFAULT_STATE_LIMIT,
            transition_limit: DEFAULT_TRANSITION_LIMIT,
        }
    }

    /// Fail the build once more than `limit` DFA states are needed
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    /// Fail the build once the transition table needs more than `limit` edges
    pub fn with_transition_limit(mut self, limit: usize) -> Self {
        self.transition_limit = limit;
        self
    }

    pub fn build(mut self, nfa: &Nfa) -> Result<Dfa> {
        let mut transitions = HashMap::new();
        let start = self.intern(nfa, nfa.initial_states())?;

        while let Some(current) = self.queue.pop_front() {
            let members = self.states[current].nfa_states.clone();

            for c in alphabet(nfa, &members) {
                let moved = nfa.move_on(&members, c);
                if moved.is_empty() {
                    continue;
                }
                if transitions.len() >= self.transition_limit {
                    return Err(RegexError::build(
                        "Automaton too large",
                        "",
                        format!(
                            "Subset construction needs more than {} DFA transitions; \
                             use NFA matching instead",
                            self.transition_limit
                        ),
                    ));
                }
                let target = self.intern(nfa, nfa.epsilon_closure(&moved))?;
                transitions.insert((current, c), target);
            }
        }

        Ok(Dfa {
            states: self.states,
            start,
            accepting: self.accepting,
            transitions,
            min_length: nfa.min_length(),
            max_length: nfa.max_length(),
        })
    }

    /// Look up the DFA state for `set`, creating and queueing it if new
    fn intern(&mut self, nfa: &Nfa, set: StateSet) -> Result<DfaStateId> {
        if let Some(&id) = self.cache.get(&set) {
            return Ok(id);
        }

        if self.states.len() >= self.state_limit {
            return Err(RegexError::build(
                "Automaton too large",
                "",
                format!(
                    "Subset construction needs more than {} DFA states; use NFA matching instead",
                    self.state_limit
                ),
            ));
        }

        let id = self.states.len();
        if nfa.is_accepting(&set) {
            self.accepting.insert(id);
        }
        trace!(
            "DFA state {} <- {} NFA states{}",
            id,
            set.len(),
            if self.accepting.contains(&id) { " (accepting)" } else { "" }
        );

        self.cache.insert(set.clone(), id);
        self.states.push(DfaState { nfa_states: set });
        self.queue.push_back(id);
        Ok(id)
    }
}

impl Default for DfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Symbols that advance at least one state in `states`
fn alphabet(nfa: &Nfa, states: &StateSet) -> BTreeSet<char> {
    states
        .iter()
        .flat_map(|&id| nfa.state(id).transitions.keys().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn dfa(pattern: &str) -> Dfa {
        let nfa = Nfa::from_expr(&parse(pattern).unwrap()).unwrap();
        Dfa::from_nfa(&nfa).unwrap()
    }

    fn walk(dfa: &Dfa, text: &str) -> Option<DfaStateId> {
        text.chars()
            .try_fold(dfa.start(), |state, c| dfa.next(state, c))
    }

    #[test]
    fn test_literal_dfa() {
        let dfa = dfa("ab");
        assert_eq!(dfa.state_count(), 3);
        let end = walk(&dfa, "ab").unwrap();
        assert!(dfa.is_accepting(end));
        assert!(!dfa.is_accepting(dfa.start()));
        assert_eq!(dfa.next(dfa.start(), 'b'), None);
    }

    #[test]
    fn test_star_loops_onto_itself() {
        let dfa = dfa("a*");
        assert!(dfa.is_accepting(dfa.start()));
        let once = walk(&dfa, "a").unwrap();
        let twice = walk(&dfa, "aa").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_equal_subsets_share_a_state() {
        // in (a|b)* the subset depends only on the last character read
        let dfa = dfa("(a|b)*");
        assert_eq!(walk(&dfa, "ba"), walk(&dfa, "a"));
        assert_eq!(walk(&dfa, "aab"), walk(&dfa, "b"));
        assert_ne!(walk(&dfa, "a"), walk(&dfa, "b"));
        assert_eq!(dfa.state_count(), 3);
    }

    #[test]
    fn test_alphabet_is_restricted() {
        let dfa = dfa("[a-c]");
        assert_eq!(dfa.transition_count(), 3);
        assert_eq!(dfa.next(dfa.start(), 'd'), None);
    }

    #[test]
    fn test_length_bounds_carried_over() {
        let dfa = dfa("a{2,4}");
        assert_eq!(dfa.min_length(), 2);
        assert_eq!(dfa.max_length(), Some(4));
        assert_eq!(self::dfa("a+").max_length(), None);
    }

    #[test]
    fn test_accepting_set_matches_members() {
        let dfa = dfa("a(b|c)*");
        for &id in dfa.accepting_states() {
            assert!(!dfa.state(id).nfa_states.is_empty());
        }
        assert!(dfa.is_accepting(walk(&dfa, "abcb").unwrap()));
    }

    #[test]
    fn test_state_limit() {
        // (a|b)*a(a|b){8} needs 2^9 subset states
        let nfa = Nfa::from_expr(&parse("(a|b)*a(a|b){8}").unwrap()).unwrap();
        let err = DfaBuilder::new()
            .with_state_limit(64)
            .build(&nfa)
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Build);
        assert!(Dfa::from_nfa(&nfa).is_ok());
    }

    #[test]
    fn test_transition_limit() {
        // a{40} walks 40 edges through 41 states
        let nfa = Nfa::from_expr(&parse("a{40}").unwrap()).unwrap();
        let err = DfaBuilder::new()
            .with_transition_limit(39)
            .build(&nfa)
            .unwrap_err();
        assert!(err.details.contains("39 DFA transitions"));
        let dfa = DfaBuilder::new().with_transition_limit(40).build(&nfa).unwrap();
        assert_eq!(dfa.transition_count(), 40);
    }

    #[test]
    fn test_long_alternation_collapses() {
        let pattern = vec!["a"; 20_000].join("|");
        let dfa = dfa(&pattern);
        assert_eq!(dfa.state_count(), 2);
        assert!(dfa.is_accepting(walk(&dfa, "a").unwrap()));
        assert_eq!(walk(&dfa, "b"), None);
    }
}
