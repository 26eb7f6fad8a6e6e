//! NFA (Nondeterministic Finite Automaton) construction
//!
//! This module implements Thompson's construction: every AST node becomes a
//! fragment with exactly one start and one accept state, and fragments are
//! fused with epsilon transitions. States live in an arena owned by the
//! builder, so loop-back edges for `*`, `+` and `{m,}` are plain indices.
//!
//! Each fragment also carries the structural `[min, max]` length of the
//! strings it can accept.

use crate::ast::{self, Expr, RepeatOp};
use crate::error::{RegexError, Result};
use std::collections::{BTreeSet, HashMap};

/// An NFA state ID
pub type StateId = usize;

/// A set of NFA states, ordered so it can key a cache
pub type StateSet = BTreeSet<StateId>;

/// Default cap on the number of states one pattern may produce
pub const DEFAULT_STATE_LIMIT: usize = 100_000;

/// Default cap on the number of character edges one pattern may produce
///
/// Large classes under counted repetition add edges much faster than
/// states, so states alone do not bound the automaton's size.
pub const DEFAULT_TRANSITION_LIMIT: usize = 1_000_000;

/// An NFA state
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Character transitions from this state
    pub transitions: HashMap<char, BTreeSet<StateId>>,
    /// Epsilon transitions from this state
    pub epsilon_targets: BTreeSet<StateId>,
    /// Whether this is the accepting state
    pub accepting: bool,
}

impl State {
    /// Targets reachable by consuming `c`
    pub fn next_states(&self, c: char) -> impl Iterator<Item = StateId> + '_ {
        self.transitions.get(&c).into_iter().flatten().copied()
    }
}

/// An NFA (Nondeterministic Finite Automaton)
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
    min_length: usize,
    max_length: Option<usize>,
}

impl Nfa {
    /// Build an NFA from an AST expression with the default state limit
    pub fn from_expr(expr: &Expr) -> Result<Self> {
        NfaBuilder::new().build(expr)
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of states flagged accepting; always 1 for a built NFA
    pub fn accepting_count(&self) -> usize {
        self.states.iter().filter(|s| s.accepting).count()
    }

    /// Shortest string length the NFA can accept
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Longest string length the NFA can accept, `None` when unbounded
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Whether any state in `states` is accepting
    pub fn is_accepting(&self, states: &StateSet) -> bool {
        states.iter().any(|&id| self.states[id].accepting)
    }

    /// Compute epsilon closure of a set of states
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack: Vec<_> = states.iter().copied().collect();

        while let Some(state) = stack.pop() {
            for &target in &self.states[state].epsilon_targets {
                if closure.insert(target) {
                    stack.push(target);
                }
            }
        }

        closure
    }

    /// The states reached from `states` by consuming `c`, before closure
    pub fn move_on(&self, states: &StateSet, c: char) -> StateSet {
        states
            .iter()
            .flat_map(|&id| self.states[id].next_states(c))
            .collect()
    }

    /// One simulation step: move on `c`, then take the epsilon closure
    pub fn step(&self, states: &StateSet, c: char) -> StateSet {
        self.epsilon_closure(&self.move_on(states, c))
    }

    /// The closure of the start state
    pub fn initial_states(&self) -> StateSet {
        self.epsilon_closure(&StateSet::from([self.start]))
    }
}

/// A partially built automaton with one entry and one exit
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
    min_length: usize,
    max_length: Option<usize>,
}

/// Thompson construction over one AST
///
/// The builder is the identity allocator for its states: ids are indices into
/// its own arena, so separate builds never share or collide on ids.
#[derive(Debug)]
pub struct NfaBuilder {
    states: Vec<State>,
    transition_count: usize,
    state_limit: usize,
    transition_limit: usize,
}

impl NfaBuilder {
    pub fn new() -> Self {
        NfaBuilder {
            states: Vec::new(),
            transition_count: 0,
            state_limit: DEFAULT_STATE_LIMIT,
            transition_limit: DEFAULT_TRANSITION_LIMIT,
        }
    }

    /// Fail the build once more than `limit` states are needed
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    /// Fail the build once more than `limit` character edges are needed
    pub fn with_transition_limit(mut self, limit: usize) -> Self {
        self.transition_limit = limit;
        self
    }

    /// Build an NFA from an AST expression
    pub fn build(mut self, expr: &Expr) -> Result<Nfa> {
        let fragment = self.fragment(expr)?;

        let accepting = self.states.iter().filter(|s| s.accepting).count();
        if accepting != 1 || !self.states[fragment.accept].accepting {
            return Err(RegexError::build(
                "Failed to build NFA",
                "",
                format!(
                    "Expected exactly one accepting state (the fragment exit), found {}",
                    accepting
                ),
            ));
        }

        Ok(Nfa {
            states: self.states,
            start: fragment.start,
            accept: fragment.accept,
            min_length: fragment.min_length,
            max_length: fragment.max_length,
        })
    }

    /// Allocate a new state and return its ID
    fn new_state(&mut self, accepting: bool) -> Result<StateId> {
        if self.states.len() >= self.state_limit {
            return Err(RegexError::build(
                "Automaton too large",
                "",
                format!(
                    "Pattern needs more than {} NFA states; reduce counted repetitions",
                    self.state_limit
                ),
            ));
        }
        let id = self.states.len();
        self.states.push(State {
            accepting,
            ..State::default()
        });
        Ok(id)
    }

    /// A fresh start state and a fresh (accepting) exit state
    fn new_pair(&mut self) -> Result<(StateId, StateId)> {
        Ok((self.new_state(false)?, self.new_state(true)?))
    }

    fn add_transition(&mut self, from: StateId, c: char, to: StateId) -> Result<()> {
        if self.transition_count >= self.transition_limit {
            return Err(RegexError::build(
                "Automaton too large",
                "",
                format!(
                    "Pattern needs more than {} NFA transitions; shrink character classes \
                     under counted repetition",
                    self.transition_limit
                ),
            ));
        }
        if self.states[from]
            .transitions
            .entry(c)
            .or_default()
            .insert(to)
        {
            self.transition_count += 1;
        }
        Ok(())
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].epsilon_targets.insert(to);
    }

    /// Clear the accepting flag of a fragment exit that is being composed
    fn demote(&mut self, id: StateId) {
        self.states[id].accepting = false;
    }

    fn fragment(&mut self, expr: &Expr) -> Result<Fragment> {
        match expr {
            Expr::Empty => self.empty(),
            Expr::Literal(c) => self.symbols([*c]),
            Expr::AnyChar => self.symbols(ast::ALPHABET),
            Expr::WordClass => self.symbols(ast::word_chars()),
            Expr::DigitClass => self.symbols(ast::digit_chars()),
            Expr::CharClass(cc) if cc.negated => {
                self.symbols(ast::ALPHABET.filter(|c| !cc.chars.contains(c)))
            }
            Expr::CharClass(cc) => self.symbols(cc.chars.iter().copied()),
            Expr::Concat(..) => self.concat(expr),
            Expr::Alternate(..) => self.alternate(expr),
            Expr::Repeat { expr, op } => self.repeat(expr, *op),
            Expr::Quantifier { expr, min, max } => self.counted(expr, *min, *max),
        }
    }

    fn empty(&mut self) -> Result<Fragment> {
        let (start, accept) = self.new_pair()?;
        self.add_epsilon(start, accept);
        Ok(Fragment {
            start,
            accept,
            min_length: 0,
            max_length: Some(0),
        })
    }

    /// One edge per character from a fresh start to a fresh accept
    fn symbols(&mut self, chars: impl IntoIterator<Item = char>) -> Result<Fragment> {
        let (start, accept) = self.new_pair()?;
        for c in chars {
            self.add_transition(start, c, accept)?;
        }
        Ok(Fragment {
            start,
            accept,
            min_length: 1,
            max_length: Some(1),
        })
    }

    /// Concatenation over the whole left spine, so long literal runs do not
    /// recurse once per character
    fn concat(&mut self, expr: &Expr) -> Result<Fragment> {
        let mut parts = expr.concat_parts().into_iter();
        let mut acc = match parts.next() {
            Some(first) => self.fragment(first)?,
            None => return self.empty(),
        };
        for part in parts {
            let next = self.fragment(part)?;
            self.add_epsilon(acc.accept, next.start);
            self.demote(acc.accept);
            acc = Fragment {
                start: acc.start,
                accept: next.accept,
                min_length: acc.min_length.saturating_add(next.min_length),
                max_length: add_bounds(acc.max_length, next.max_length),
            };
        }
        Ok(acc)
    }

    /// Alternation over the whole left spine: every branch hangs off one
    /// shared start and joins one shared accept
    fn alternate(&mut self, expr: &Expr) -> Result<Fragment> {
        let (start, accept) = self.new_pair()?;
        let mut min_length = usize::MAX;
        let mut max_length = Some(0);

        for branch in expr.alternatives() {
            let branch = self.fragment(branch)?;
            self.add_epsilon(start, branch.start);
            self.add_epsilon(branch.accept, accept);
            self.demote(branch.accept);

            min_length = min_length.min(branch.min_length);
            max_length = max_length.zip(branch.max_length).map(|(a, b)| a.max(b));
        }

        Ok(Fragment {
            start,
            accept,
            min_length,
            max_length,
        })
    }

    fn repeat(&mut self, child: &Expr, op: RepeatOp) -> Result<Fragment> {
        let inner = self.fragment(child)?;
        let (start, accept) = self.new_pair()?;

        self.add_epsilon(start, inner.start);
        self.add_epsilon(inner.accept, accept);
        self.demote(inner.accept);

        let (min_length, max_length) = match op {
            RepeatOp::ZeroOrMore => {
                self.add_epsilon(start, accept);
                self.add_epsilon(inner.accept, inner.start);
                (0, None)
            }
            RepeatOp::OneOrMore => {
                self.add_epsilon(inner.accept, inner.start);
                (inner.min_length, None)
            }
            RepeatOp::Optional => {
                self.add_epsilon(start, accept);
                (0, inner.max_length)
            }
        };

        Ok(Fragment {
            start,
            accept,
            min_length,
            max_length,
        })
    }

    /// `{min}`, `{min,max}` and `{min,}`: a chain of fresh copies of `child`
    fn counted(&mut self, child: &Expr, min: u32, max: Option<u32>) -> Result<Fragment> {
        let (start, accept) = self.new_pair()?;
        let mut cursor = start;
        // bounds of one copy; every copy has the same shape
        let mut unit = (0, Some(0));

        for _ in 0..min {
            let copy = self.fragment(child)?;
            unit = (copy.min_length, copy.max_length);
            self.add_epsilon(cursor, copy.start);
            self.demote(copy.accept);
            cursor = copy.accept;
        }

        match max {
            Some(max) => {
                for _ in min..max {
                    // enough copies already: leave early
                    self.add_epsilon(cursor, accept);
                    let copy = self.fragment(child)?;
                    unit = (copy.min_length, copy.max_length);
                    self.add_epsilon(cursor, copy.start);
                    self.demote(copy.accept);
                    cursor = copy.accept;
                }
                self.add_epsilon(cursor, accept);
            }
            None => {
                let copy = self.fragment(child)?;
                unit = (copy.min_length, copy.max_length);
                self.add_epsilon(cursor, accept);
                self.add_epsilon(cursor, copy.start);
                self.add_epsilon(copy.accept, copy.start);
                self.add_epsilon(copy.accept, accept);
                self.demote(copy.accept);
            }
        }

        let (unit_min, unit_max) = unit;
        Ok(Fragment {
            start,
            accept,
            min_length: unit_min.saturating_mul(min as usize),
            max_length: match max {
                Some(max) => unit_max.and_then(|u| u.checked_mul(max as usize)),
                None => None,
            },
        })
    }
}

impl Default for NfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn add_bounds(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    a?.checked_add(b?)
}
