use crate::engine::{successors, Color, Move, State, STACK_CAPACITY};
use crate::error::SolverError;
use std::collections::{HashSet, VecDeque};

/// Parses an array of string slices into a [`State`].
///
/// Each string slice is one stack, bottom token first; each character is a
/// color digit `'1'..='8'`. An empty string is an empty stack.
///
/// # Errors
/// Returns [`SolverError::Parse`] if a stack string is longer than
/// [`STACK_CAPACITY`] or contains a character outside `'1'..='8'`.
///
/// # Examples
/// ```
/// use stacksort_solver::utils::state_from_str_array;
///
/// let state = state_from_str_array(&["12", "21", "3333", ""]).unwrap();
/// assert_eq!(state.num_stacks(), 4);
/// assert_eq!(state.top_token(0), Some(2));
/// assert!(state.is_stack_empty(3));
///
/// assert!(state_from_str_array(&["1x"]).is_err());
/// assert!(state_from_str_array(&["11111"]).is_err());
/// ```
pub fn state_from_str_array(s: &[&str]) -> Result<State, SolverError> {
    let mut stacks = Vec::with_capacity(s.len());

    for (idx, stack_str) in s.iter().enumerate() {
        if stack_str.chars().count() > STACK_CAPACITY {
            return Err(SolverError::Parse(format!(
                "stack {} has {} tokens (capacity {})",
                idx,
                stack_str.chars().count(),
                STACK_CAPACITY
            )));
        }

        let mut stack = Vec::with_capacity(STACK_CAPACITY);
        for token_char in stack_str.chars() {
            match token_char {
                '1'..='8' => stack.push(token_char as Color - b'0'),
                _ => {
                    return Err(SolverError::Parse(format!(
                        "unrecognized token '{}' in stack {}",
                        token_char, idx
                    )))
                }
            }
        }
        stacks.push(stack);
    }

    Ok(State::new(stacks))
}

/// Replays a move list from `initial`, returning the full state sequence
/// (the initial state first, the state after the last move last).
///
/// # Panics
/// Panics if a move pops an empty stack; callers pass move lists produced
/// by a search over the same instance.
pub fn apply_moves(initial: &State, moves: &[Move]) -> Vec<State> {
    let mut sequence = Vec::with_capacity(moves.len() + 1);
    sequence.push(initial.clone());
    for &mv in moves {
        let next = sequence.last().expect("sequence is never empty").apply(mv);
        sequence.push(next);
    }
    sequence
}

/// Brute-force breadth-first search: the exact optimal move count from
/// `initial` to a goal state, or `None` if no goal is reachable within
/// `max_depth` moves.
///
/// Exponential; intended as ground truth for small instances (at most a
/// handful of stacks and colors) in tests and admissibility checks.
pub fn bfs_shortest_solution(initial: &State, max_depth: u32) -> Option<u32> {
    if initial.is_goal() {
        return Some(0);
    }

    let mut visited = HashSet::new();
    visited.insert(initial.clone());
    let mut queue = VecDeque::new();
    queue.push_back((initial.clone(), 0u32));

    while let Some((state, depth)) = queue.pop_front() {
        if depth == max_depth {
            continue;
        }
        for (_, child) in successors(&state) {
            if visited.contains(&child) {
                continue;
            }
            if child.is_goal() {
                return Some(depth + 1);
            }
            visited.insert(child.clone());
            queue.push_back((child, depth + 1));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Move;

    #[test]
    fn test_state_from_str_array_valid() {
        let state = state_from_str_array(&["1234", "", "88"]).unwrap();
        assert_eq!(state.stack(0), &[1, 2, 3, 4]);
        assert!(state.is_stack_empty(1));
        assert_eq!(state.stack(2), &[8, 8]);
    }

    #[test]
    fn test_state_from_str_array_invalid_char() {
        let result = state_from_str_array(&["120"]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unrecognized token '0'"));
    }

    #[test]
    fn test_state_from_str_array_over_capacity() {
        let result = state_from_str_array(&["11111"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("capacity"));
    }

    #[test]
    fn test_state_from_str_array_empty_input() {
        let state = state_from_str_array(&[]).unwrap();
        assert_eq!(state.num_stacks(), 0);
        assert!(state.is_goal());
    }

    #[test]
    fn test_apply_moves_sequence() {
        let initial = state_from_str_array(&["1112", "222", "1", ""]).unwrap();
        let moves = [Move { from: 0, to: 1 }, Move { from: 2, to: 0 }];
        let sequence = apply_moves(&initial, &moves);

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence[0], initial);
        assert_eq!(sequence[1].stack(1), &[2, 2, 2, 2]);
        assert!(sequence[2].is_goal());
    }

    #[test]
    fn test_bfs_ground_truth() {
        // One move: drop the stray 1 onto its pile.
        let one = state_from_str_array(&["111", "2222", "1", ""]).unwrap();
        assert_eq!(bfs_shortest_solution(&one, 10), Some(1));

        // Two moves: complete the 2s, then the 1s.
        let two = state_from_str_array(&["1112", "222", "1", ""]).unwrap();
        assert_eq!(bfs_shortest_solution(&two, 10), Some(2));

        // Already solved.
        let goal = state_from_str_array(&["1111", ""]).unwrap();
        assert_eq!(bfs_shortest_solution(&goal, 10), Some(0));

        // Colors 1 and 2 have two tokens each: no stack can ever become
        // full and monochrome for them, so no goal is reachable.
        let unsolvable = state_from_str_array(&["12", "21", "3333", ""]).unwrap();
        assert_eq!(bfs_shortest_solution(&unsolvable, 20), None);
    }
}
