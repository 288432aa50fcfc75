//! Core puzzle engine for the stack-sort game.
//!
//! This module defines the game's fundamental components:
//! - `State`: the stack configuration, with goal/terminal tests and
//!   order-sensitive equality and hashing.
//! - `Move`: a single-token transfer between two stacks.
//! - `successors` / `predecessors`: the legal-move relation, forwards and
//!   backwards (the backward direction feeds the pattern-database builder).
//! - `random_state_with_seed`: deterministic random instance generation,
//!   with configuration validation up front.
use crate::error::SolverError;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Maximum number of tokens a stack can hold.
pub const STACK_CAPACITY: usize = 4;
/// Number of tokens of each color in a well-formed instance.
pub const TOKENS_PER_COLOR: usize = 4;
/// Smallest supported stack count.
pub const MIN_STACKS: usize = 4;
/// Largest supported stack count.
pub const MAX_STACKS: usize = 10;
/// Smallest supported color count.
pub const MIN_COLORS: usize = 3;
/// Largest supported color count.
pub const MAX_COLORS: usize = 8;

/// A token's color id. Valid ids are small positive integers (1..=8).
pub type Color = u8;

/// A single-token transfer: pop the top of `from`, push it onto `to`.
///
/// Every move has uniform cost 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A snapshot of the puzzle: an ordered sequence of stacks, each holding
/// up to [`STACK_CAPACITY`] tokens. The *last* element of a stack is its
/// top (most recently placed, first to be removed).
///
/// `State` is a value type: `clone()` produces a fully independent deep
/// copy, and a state is never mutated after construction; each transition
/// goes through [`State::apply`], which is copy-then-mutate-once.
///
/// Equality and hashing are derived element-wise over the stack sequence,
/// *including stack order*: two states that are the same configuration
/// under a relabeling of stack positions are distinct. This inflates the
/// search space but matches the identity the search structures rely on.
///
/// The type is structurally permissive: it can represent configurations
/// that violate the token-count invariants. Well-formedness is enforced by
/// [`random_state_with_seed`] and checked by [`validate_state`], not here.
///
/// # Examples
/// ```
/// use stacksort_solver::engine::State;
/// let state = State::new(vec![vec![1, 1, 1, 1], vec![]]);
/// assert!(state.is_goal());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    stacks: Vec<Vec<Color>>,
}

impl State {
    pub fn new(stacks: Vec<Vec<Color>>) -> Self {
        State { stacks }
    }

    /// Number of stacks in this instance (fixed for its whole lifetime).
    pub fn num_stacks(&self) -> usize {
        self.stacks.len()
    }

    /// The tokens of one stack, bottom first.
    pub fn stack(&self, idx: usize) -> &[Color] {
        &self.stacks[idx]
    }

    /// All stacks, bottom-first each.
    pub fn stacks(&self) -> &[Vec<Color>] {
        &self.stacks
    }

    pub fn is_stack_empty(&self, idx: usize) -> bool {
        self.stacks[idx].is_empty()
    }

    pub fn is_stack_full(&self, idx: usize) -> bool {
        self.stacks[idx].len() == STACK_CAPACITY
    }

    /// The top token of a stack, or `None` if the stack is empty.
    pub fn top_token(&self, idx: usize) -> Option<Color> {
        self.stacks[idx].last().copied()
    }

    /// A stack is complete when it is full and monochrome.
    pub fn is_stack_complete(&self, idx: usize) -> bool {
        let stack = &self.stacks[idx];
        stack.len() == STACK_CAPACITY && stack.iter().all(|&t| t == stack[0])
    }

    /// Terminal test: every stack is either empty or complete.
    pub fn is_goal(&self) -> bool {
        (0..self.num_stacks()).all(|i| self.is_stack_empty(i) || self.is_stack_complete(i))
    }

    /// The sorted list of distinct color ids present in the state.
    pub fn colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.stacks.iter().flatten().copied().collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Applies a move to a copy of `self` and returns the child state.
    ///
    /// The move is assumed legal; legality is the move generator's job.
    ///
    /// # Panics
    /// Panics if `mv.from` is empty or either index is out of bounds.
    pub fn apply(&self, mv: Move) -> State {
        let mut child = self.clone();
        let token = child.stacks[mv.from]
            .pop()
            .expect("move applied to an empty source stack");
        child.stacks[mv.to].push(token);
        child
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stack) in self.stacks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "stack {}: {:?}", i, stack)?;
        }
        Ok(())
    }
}

/// Generates every legal child of `state`, paired with the move that
/// produces it.
///
/// A move `(from, to)` is legal when `from` is non-empty, `to` is not full,
/// `from != to`, and `to` is either empty or its top token matches the top
/// token of `from`.
pub fn successors(state: &State) -> Vec<(Move, State)> {
    let mut children = Vec::new();

    for from in 0..state.num_stacks() {
        let token = match state.top_token(from) {
            Some(t) => t,
            None => continue,
        };

        for to in 0..state.num_stacks() {
            if to == from || state.is_stack_full(to) {
                continue;
            }
            if let Some(target_top) = state.top_token(to) {
                if target_top != token {
                    continue; // only same-colored tokens stack
                }
            }
            let mv = Move { from, to };
            children.push((mv, state.apply(mv)));
        }
    }

    children
}

/// Generates every state that has `state` among its successors.
///
/// This is the exact inverse of the forward relation: undoing the placement
/// of a stack's top token `c` is legal only when the token underneath is
/// also `c` (or the stack empties), because the forward move required a
/// matching or empty target. The undone token may return to any other
/// non-full stack, since the forward rule put no constraint on the source's
/// top.
///
/// Used by the pattern-database builder's backward breadth-first search.
pub fn predecessors(state: &State) -> Vec<State> {
    let mut parents = Vec::new();

    for from in 0..state.num_stacks() {
        let stack = state.stack(from);
        let token = match stack.last() {
            Some(&t) => t,
            None => continue,
        };
        // The forward move landed `token` on an empty stack or on a
        // matching top; anything else cannot be undone from here.
        if stack.len() > 1 && stack[stack.len() - 2] != token {
            continue;
        }

        for to in 0..state.num_stacks() {
            if to == from || state.is_stack_full(to) {
                continue;
            }
            parents.push(state.apply(Move { from, to }));
        }
    }

    parents
}

/// Validates a `(num_stacks, num_colors)` pair before any state exists.
///
/// Constraints: 4..=10 stacks, 3..=8 colors, and at least `num_stacks - 1`
/// colors but no more than `num_stacks`. Fewer colors leaves the instance
/// trivially loose; more leaves no room to assemble complete stacks.
pub fn validate_config(num_stacks: usize, num_colors: usize) -> Result<(), SolverError> {
    if !(MIN_STACKS..=MAX_STACKS).contains(&num_stacks) {
        return Err(SolverError::Config(format!(
            "stack count {} out of range {}..={}",
            num_stacks, MIN_STACKS, MAX_STACKS
        )));
    }
    if !(MIN_COLORS..=MAX_COLORS).contains(&num_colors) {
        return Err(SolverError::Config(format!(
            "color count {} out of range {}..={}",
            num_colors, MIN_COLORS, MAX_COLORS
        )));
    }
    if num_colors + 1 < num_stacks || num_colors > num_stacks {
        return Err(SolverError::Config(format!(
            "{} colors incompatible with {} stacks",
            num_colors, num_stacks
        )));
    }
    Ok(())
}

/// Checks the token-count invariants of a fully built state: no stack over
/// capacity, exactly [`TOKENS_PER_COLOR`] tokens of every color present,
/// and at least `num_stacks - 1` distinct colors.
pub fn validate_state(state: &State) -> Result<(), SolverError> {
    let mut counts = std::collections::HashMap::new();
    for (idx, stack) in state.stacks().iter().enumerate() {
        if stack.len() > STACK_CAPACITY {
            return Err(SolverError::Config(format!(
                "stack {} holds {} tokens (capacity {})",
                idx,
                stack.len(),
                STACK_CAPACITY
            )));
        }
        for &token in stack {
            *counts.entry(token).or_insert(0usize) += 1;
        }
    }
    for (&color, &count) in &counts {
        if count != TOKENS_PER_COLOR {
            return Err(SolverError::Config(format!(
                "color {} has {} tokens instead of {}",
                color, count, TOKENS_PER_COLOR
            )));
        }
    }
    if counts.len() + 1 < state.num_stacks() {
        return Err(SolverError::Config(format!(
            "{} colors is below the minimum {} for {} stacks",
            counts.len(),
            state.num_stacks() - 1,
            state.num_stacks()
        )));
    }
    Ok(())
}

/// The canonical solved position for a configuration: color `c` fills
/// stack `c - 1`, remaining stacks empty.
pub fn canonical_goal(num_stacks: usize, num_colors: usize) -> State {
    let mut stacks: Vec<Vec<Color>> = (1..=num_colors as Color)
        .map(|color| vec![color; TOKENS_PER_COLOR])
        .collect();
    stacks.resize(num_stacks, Vec::new());
    State::new(stacks)
}

/// Creates a well-formed instance by walking `steps` random backward moves
/// from the canonical goal. The result is solvable in at most `steps`
/// moves, which makes it cheap ground truth for larger configurations
/// where exhaustive search from an arbitrary instance is out of reach.
pub fn scrambled_state_with_seed(
    num_stacks: usize,
    num_colors: usize,
    steps: u32,
    seed: u64,
) -> Result<State, SolverError> {
    validate_config(num_stacks, num_colors)?;

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = canonical_goal(num_stacks, num_colors);
    for _ in 0..steps {
        let mut parents = predecessors(&state);
        if parents.is_empty() {
            break;
        }
        let pick = rng.gen_range(0..parents.len());
        state = parents.swap_remove(pick);
    }
    Ok(state)
}

/// Creates a random, well-formed initial state for the given configuration.
///
/// Uses [`SmallRng`] seeded with `seed`, so the same arguments always
/// produce the same instance. Four tokens of each color `1..=num_colors`
/// are shuffled and distributed: a random subset of stacks (at most
/// `num_stacks - num_colors`) is held empty, every other stack receives at
/// least one token, and the remainder lands on random non-full stacks.
///
/// Rejects an invalid configuration with [`SolverError::Config`] before
/// building anything; the search core never sees a malformed instance.
pub fn random_state_with_seed(
    num_stacks: usize,
    num_colors: usize,
    seed: u64,
) -> Result<State, SolverError> {
    validate_config(num_stacks, num_colors)?;

    let mut rng = SmallRng::seed_from_u64(seed);

    let mut tokens: Vec<Color> = Vec::with_capacity(num_colors * TOKENS_PER_COLOR);
    for color in 1..=num_colors as Color {
        tokens.extend(std::iter::repeat(color).take(TOKENS_PER_COLOR));
    }
    tokens.shuffle(&mut rng);

    let num_empty = rng.gen_range(0..=num_stacks - num_colors);
    let mut order: Vec<usize> = (0..num_stacks).collect();
    order.shuffle(&mut rng);
    let occupied: Vec<usize> = order[num_empty..].to_vec();

    let mut stacks = vec![Vec::with_capacity(STACK_CAPACITY); num_stacks];

    // Seed every occupied stack with one token, then scatter the rest.
    for &idx in &occupied {
        if let Some(token) = tokens.pop() {
            stacks[idx].push(token);
        }
    }
    while let Some(token) = tokens.pop() {
        let open: Vec<usize> = occupied
            .iter()
            .copied()
            .filter(|&i| stacks[i].len() < STACK_CAPACITY)
            .collect();
        let idx = open[rng.gen_range(0..open.len())];
        stacks[idx].push(token);
    }

    Ok(State::new(stacks))
}
