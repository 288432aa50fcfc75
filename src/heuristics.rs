//! Heuristic estimates of remaining moves for a puzzle state.
//!
//! Four variants with different guarantees:
//! - [`AdmissibleHeuristic`]: never overestimates; pairs with A* at
//!   weight 1.0 for provably optimal solutions.
//! - [`WeightedHeuristic`]: admissible base plus mixing penalties, for
//!   weighted best-first search (weight > 1.0, optimality traded for speed).
//! - [`DeepeningHeuristic`]: cheap misplaced-token count used to order
//!   children inside bounded depth-first search.
//! - [`PatternDbHeuristic`]: disjoint pattern-database lookup with a
//!   whole-state admissible fallback.
use crate::engine::{Color, State, TOKENS_PER_COLOR};
use crate::pattern_db::DisjointPatternDatabase;
use std::collections::HashMap;

/// A remaining-cost estimate for a state.
///
/// Search algorithms take this as a parameter and never hard-code a
/// variant; estimates are non-negative and `0.0` for any goal state.
pub trait Heuristic {
    fn estimate(&self, state: &State) -> f64;
}

/// For each color, the stack holding the most tokens of it (ties go to the
/// lowest stack index, keeping the estimate deterministic).
fn best_stacks(state: &State) -> HashMap<Color, usize> {
    let mut per_stack: HashMap<Color, Vec<usize>> = HashMap::new();
    for (idx, stack) in state.stacks().iter().enumerate() {
        for &token in stack {
            per_stack
                .entry(token)
                .or_insert_with(|| vec![0; state.num_stacks()])[idx] += 1;
        }
    }

    per_stack
        .into_iter()
        .map(|(color, counts)| {
            let mut best = 0usize;
            for (idx, &count) in counts.iter().enumerate() {
                if count > counts[best] {
                    best = idx;
                }
            }
            (color, best)
        })
        .collect()
}

/// Lower bound on the number of moves to reach a goal.
///
/// Two per-color lower bounds on how many of that color's tokens must move
/// at least once, combined with `max` so the same token is never charged
/// twice:
/// - `buried`: tokens with a differently-colored token anywhere below them
///   in their stack. Tokens below can only leave after the ones above, so
///   in any goal that token has moved.
/// - `displaced`: the color's total count minus its largest single-stack
///   count. All tokens of a color end in one stack, and only tokens already
///   there can avoid moving.
///
/// Each counted token needs a move of its own, each move transfers one
/// token of one color, and the per-color charges never exceed the number
/// of that color's tokens that move, so the sum over colors never exceeds
/// the true optimal cost.
pub fn admissible_estimate(state: &State) -> u32 {
    let mut buried: HashMap<Color, u32> = HashMap::new();
    let mut totals: HashMap<Color, u32> = HashMap::new();
    let mut max_in_one: HashMap<Color, u32> = HashMap::new();

    for stack in state.stacks() {
        let mut here: HashMap<Color, u32> = HashMap::new();
        for (pos, &token) in stack.iter().enumerate() {
            *totals.entry(token).or_insert(0) += 1;
            *here.entry(token).or_insert(0) += 1;
            if stack[..pos].iter().any(|&below| below != token) {
                *buried.entry(token).or_insert(0) += 1;
            }
        }
        for (color, count) in here {
            let best = max_in_one.entry(color).or_insert(0);
            *best = (*best).max(count);
        }
    }

    totals
        .iter()
        .map(|(color, &total)| {
            let displaced = total - max_in_one[color];
            let blocked = buried.get(color).copied().unwrap_or(0);
            displaced.max(blocked)
        })
        .sum()
}

/// The admissible lower bound, unchanged. Inject into A* with weight 1.0
/// to retain the optimality guarantee.
pub struct AdmissibleHeuristic;

impl Heuristic for AdmissibleHeuristic {
    fn estimate(&self, state: &State) -> f64 {
        admissible_estimate(state) as f64
    }
}

/// Admissible base plus penalties for mixed stacks and split colors,
/// scaled by `weight - 1.0`. Not admissible; meant for weighted best-first
/// search with `weight > 1.0`.
///
/// Penalties: for every stack holding more than one color, the number of
/// distinct colors beyond the first; for every color whose full token set
/// is present but spread over several stacks, the number of stacks beyond
/// the first.
pub struct WeightedHeuristic {
    pub weight: f64,
}

impl Heuristic for WeightedHeuristic {
    fn estimate(&self, state: &State) -> f64 {
        let base = admissible_estimate(state) as f64;

        let mut penalties = 0usize;
        for stack in state.stacks() {
            let mut colors: Vec<Color> = stack.clone();
            colors.sort_unstable();
            colors.dedup();
            if colors.len() > 1 {
                penalties += colors.len() - 1;
            }
        }

        for color in state.colors() {
            let total: usize = state.stacks().iter().map(|s| s.iter().filter(|&&t| t == color).count()).sum();
            if total == TOKENS_PER_COLOR {
                let spread = state
                    .stacks()
                    .iter()
                    .filter(|s| s.contains(&color))
                    .count();
                if spread > 1 {
                    penalties += spread - 1;
                }
            }
        }

        base + penalties as f64 * (self.weight - 1.0)
    }
}

/// Fast approximate count for iterative deepening: tokens lying outside
/// their color's best stack, ignoring burial depth. Cheaper than the full
/// admissible estimate and used only to order exploration.
pub struct DeepeningHeuristic;

impl Heuristic for DeepeningHeuristic {
    fn estimate(&self, state: &State) -> f64 {
        let best = best_stacks(state);
        let mut misplaced = 0u32;
        for (idx, stack) in state.stacks().iter().enumerate() {
            for &token in stack {
                if best[&token] != idx {
                    misplaced += 1;
                }
            }
        }
        misplaced as f64
    }
}

/// Disjoint pattern-database estimate: the sum of per-group table lookups.
///
/// If any group's reduced key is absent (partial build or `max_states`
/// cap), the whole state falls back to [`admissible_estimate`] rather than
/// guessing from a partial sum.
pub struct PatternDbHeuristic<'a> {
    pdb: &'a DisjointPatternDatabase,
}

impl<'a> PatternDbHeuristic<'a> {
    pub fn new(pdb: &'a DisjointPatternDatabase) -> Self {
        PatternDbHeuristic { pdb }
    }
}

impl Heuristic for PatternDbHeuristic<'_> {
    fn estimate(&self, state: &State) -> f64 {
        match self.pdb.estimate(state) {
            Some(value) => value as f64,
            None => admissible_estimate(state) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{random_state_with_seed, scrambled_state_with_seed};
    use crate::utils::{bfs_shortest_solution, state_from_str_array};

    #[test]
    fn test_goal_states_estimate_zero() {
        let goal = state_from_str_array(&["1111", "2222", "3333", ""]).unwrap();
        assert_eq!(AdmissibleHeuristic.estimate(&goal), 0.0);
        assert_eq!(WeightedHeuristic { weight: 2.0 }.estimate(&goal), 0.0);
        assert_eq!(DeepeningHeuristic.estimate(&goal), 0.0);
    }

    #[test]
    fn test_admissible_counts_misplaced_and_buried() {
        // The stray 1 on stack 2 needs one move.
        let one = state_from_str_array(&["111", "2222", "1", ""]).unwrap();
        assert_eq!(admissible_estimate(&one), 1);

        // The 2 on stack 0 must leave, and the 1 on stack 2 must come home.
        let two = state_from_str_array(&["1112", "222", "1", ""]).unwrap();
        assert_eq!(admissible_estimate(&two), 2);
    }

    #[test]
    fn test_admissible_on_mutually_buried_tokens() {
        // True optimum is 2: move the 2 onto its pile, then the 1 onto
        // its pile. A per-buried-token blocker sum would claim 3.
        let state = state_from_str_array(&["12", "111", "222", ""]).unwrap();
        assert_eq!(bfs_shortest_solution(&state, 10), Some(2));
        assert_eq!(admissible_estimate(&state), 2);
    }

    #[test]
    fn test_admissible_on_split_color_with_buried_tokens() {
        // Color 1 is split 2/2 and both tokens on stack 0 are buried over
        // a 3. Charging the displaced count and the buried count of the
        // same color separately would claim 5; the true optimum is 3
        // (two 1s onto stack 1, the freed 3 onto stack 2).
        let state = state_from_str_array(&["311", "11", "333", "2222"]).unwrap();
        assert_eq!(bfs_shortest_solution(&state, 10), Some(3));
        assert_eq!(admissible_estimate(&state), 3);
    }

    #[test]
    fn test_admissible_never_overestimates() {
        for seed in 0..200 {
            let state = random_state_with_seed(4, 3, seed).unwrap();
            let optimal = match bfs_shortest_solution(&state, 40) {
                Some(d) => d,
                None => continue, // unreachable goal, nothing to bound
            };
            let estimate = admissible_estimate(&state);
            assert!(
                estimate <= optimal,
                "seed {}: estimate {} exceeds optimal {}",
                seed,
                estimate,
                optimal
            );
        }
    }

    #[test]
    fn test_admissible_never_overestimates_on_larger_config() {
        // Exhaustive search from arbitrary 5-stack instances is out of
        // reach, so scramble backward from the goal to keep the optimum
        // small and checkable.
        for seed in 0..50 {
            let state = scrambled_state_with_seed(5, 4, 6, seed).unwrap();
            let optimal = bfs_shortest_solution(&state, 6)
                .expect("scrambled instance solves within its step count");
            let estimate = admissible_estimate(&state);
            assert!(
                estimate <= optimal,
                "seed {}: estimate {} exceeds optimal {}",
                seed,
                estimate,
                optimal
            );
        }
    }

    #[test]
    fn test_deepening_is_below_admissible() {
        for seed in 0..10 {
            let state = random_state_with_seed(5, 4, seed).unwrap();
            assert!(DeepeningHeuristic.estimate(&state) <= AdmissibleHeuristic.estimate(&state));
        }
    }

    #[test]
    fn test_weighted_reduces_to_admissible_at_weight_one() {
        for seed in 0..10 {
            let state = random_state_with_seed(5, 4, seed).unwrap();
            let weighted = WeightedHeuristic { weight: 1.0 }.estimate(&state);
            assert_eq!(weighted, AdmissibleHeuristic.estimate(&state));
        }
    }

    #[test]
    fn test_weighted_adds_penalties_above_weight_one() {
        // Mixed stacks and split colors both draw penalties.
        let state = state_from_str_array(&["1122", "2211", "3333", ""]).unwrap();
        let base = AdmissibleHeuristic.estimate(&state);
        let weighted = WeightedHeuristic { weight: 1.5 }.estimate(&state);
        assert!(weighted > base);
    }

    #[test]
    fn test_pattern_db_heuristic_falls_back_when_unbuilt() {
        let pdb = DisjointPatternDatabase::new(4, 3);
        let state = state_from_str_array(&["1112", "222", "1", ""]).unwrap();
        let h = PatternDbHeuristic::new(&pdb);
        assert_eq!(h.estimate(&state), admissible_estimate(&state) as f64);
    }
}
