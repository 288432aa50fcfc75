//! Depth-first searches with explicit work stacks: bounded iterative
//! deepening and IDA*.
//!
//! Both run repeated depth-first passes from scratch, holding memory
//! proportional to the current path instead of the explored frontier.
//! Neither recurses; deep puzzle instances must not be able to overflow
//! the call stack. As with [`crate::astar`], the goal test and move
//! generator are injected parameters.
use crate::engine::{Move, State};
use crate::heuristics::Heuristic;
use crate::node::{NodeArena, SearchOutcome, SearchStats};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

fn empty_outcome(arena: NodeArena, stats: SearchStats) -> SearchOutcome {
    SearchOutcome {
        goal: None,
        arena,
        stats,
    }
}

/// Iterative deepening search: depth-limited DFS at limits `1..=max_depth`,
/// restarting from scratch each iteration.
///
/// The heuristic only orders exploration (children with the lowest
/// estimate are tried first); it never prunes, so any goal within
/// `max_depth` moves is found. Solutions are not guaranteed optimal.
/// Within one iteration a state is re-expanded only when rediscovered at
/// a strictly shallower depth.
pub fn iterative_deepening_search<G, S>(
    initial: &State,
    is_goal: G,
    successors_fn: S,
    heuristic: &dyn Heuristic,
    max_depth: u32,
) -> SearchOutcome
where
    G: Fn(&State) -> bool,
    S: Fn(&State) -> Vec<(Move, State)>,
{
    let mut stats = SearchStats::default();

    if is_goal(initial) {
        let mut arena = NodeArena::new();
        let root = arena.push(initial.clone(), None, 0, None);
        stats.iterations = 1;
        return SearchOutcome {
            goal: Some(root),
            arena,
            stats,
        };
    }

    for limit in 1..=max_depth {
        stats.iterations += 1;
        let expanded_before = stats.nodes_expanded;
        debug!(limit, "starting deepening iteration");

        let mut arena = NodeArena::new();
        let root = arena.push(initial.clone(), None, 0, None);
        // Best depth each state was reached at, this iteration.
        let mut seen: HashMap<State, u32> = HashMap::new();
        seen.insert(initial.clone(), 0);

        let mut work = vec![root];
        let mut pruned = false;

        while let Some(idx) = work.pop() {
            let (state, g) = {
                let node = arena.get(idx);
                (node.state.clone(), node.g)
            };
            stats.max_depth_reached = stats.max_depth_reached.max(g);

            if g == limit {
                pruned = true;
                continue;
            }
            stats.nodes_expanded += 1;

            let mut children = successors_fn(&state);
            // Descending estimate so the most promising child ends up on
            // top of the work stack.
            children.sort_by(|(_, a), (_, b)| {
                heuristic.estimate(b).total_cmp(&heuristic.estimate(a))
            });

            for (mv, child_state) in children {
                let child_g = g + 1;
                if let Some(&known) = seen.get(&child_state) {
                    if known <= child_g {
                        continue;
                    }
                }
                seen.insert(child_state.clone(), child_g);

                if is_goal(&child_state) {
                    let goal = arena.push(child_state, Some(idx), child_g, Some(mv));
                    stats.nodes_generated += 1;
                    stats.max_depth_reached = stats.max_depth_reached.max(child_g);
                    info!(
                        cost = child_g,
                        iterations = stats.iterations,
                        expanded = stats.nodes_expanded,
                        "goal reached"
                    );
                    return SearchOutcome {
                        goal: Some(goal),
                        arena,
                        stats,
                    };
                }

                let child = arena.push(child_state, Some(idx), child_g, Some(mv));
                stats.nodes_generated += 1;
                work.push(child);
            }
        }

        stats
            .iteration_expansions
            .push(stats.nodes_expanded - expanded_before);

        if !pruned {
            // Nothing was cut off by the limit: the reachable space is
            // exhausted and deeper passes cannot find more.
            debug!(limit, "search space exhausted below the depth limit");
            return empty_outcome(NodeArena::new(), stats);
        }
    }

    info!(max_depth, "no goal within the depth bound");
    empty_outcome(NodeArena::new(), stats)
}

struct Frame {
    node: usize,
    children: Vec<(Move, State)>,
    next: usize,
}

/// IDA*: depth-first contour search with an increasing `f = g + h` bound.
///
/// Each pass explores only nodes with `f <= f_limit`; the next bound is
/// the smallest `f` that overflowed the previous one. With an admissible
/// heuristic the first goal found is optimal. Fails when the bound would
/// exceed `max_depth` or when a pass overflows nothing (space exhausted).
pub fn ida_star_search<G, S>(
    initial: &State,
    is_goal: G,
    successors_fn: S,
    heuristic: &dyn Heuristic,
    max_depth: u32,
) -> SearchOutcome
where
    G: Fn(&State) -> bool,
    S: Fn(&State) -> Vec<(Move, State)>,
{
    let mut stats = SearchStats::default();
    let mut f_limit = heuristic.estimate(initial);

    loop {
        if f_limit > max_depth as f64 {
            info!(max_depth, "next bound exceeds the depth cap");
            return empty_outcome(NodeArena::new(), stats);
        }
        stats.iterations += 1;
        let expanded_before = stats.nodes_expanded;
        debug!(f_limit, "starting contour");

        let mut arena = NodeArena::new();
        let root = arena.push(initial.clone(), None, 0, None);
        if is_goal(initial) {
            return SearchOutcome {
                goal: Some(root),
                arena,
                stats,
            };
        }

        // States on the current DFS path; revisiting one would only cycle.
        let mut on_path: HashSet<State> = HashSet::new();
        on_path.insert(initial.clone());

        let mut min_overflow: Option<f64> = None;
        let mut frames = vec![Frame {
            node: root,
            children: ordered_successors(initial, &successors_fn, heuristic),
            next: 0,
        }];
        stats.nodes_expanded += 1;

        while let Some(top) = frames.len().checked_sub(1) {
            if frames[top].next >= frames[top].children.len() {
                let node = frames[top].node;
                on_path.remove(&arena.get(node).state);
                frames.pop();
                continue;
            }

            let pick = frames[top].next;
            frames[top].next += 1;
            let parent = frames[top].node;
            let (mv, child_state) = frames[top].children[pick].clone();

            let child_g = arena.get(parent).g + 1;
            let f = child_g as f64 + heuristic.estimate(&child_state);
            if f > f_limit {
                min_overflow = Some(match min_overflow {
                    Some(current) => current.min(f),
                    None => f,
                });
                continue;
            }
            if on_path.contains(&child_state) {
                continue;
            }

            stats.nodes_generated += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(child_g);

            if is_goal(&child_state) {
                let goal = arena.push(child_state, Some(parent), child_g, Some(mv));
                info!(
                    cost = child_g,
                    iterations = stats.iterations,
                    expanded = stats.nodes_expanded,
                    "goal reached"
                );
                return SearchOutcome {
                    goal: Some(goal),
                    arena,
                    stats,
                };
            }

            let children = ordered_successors(&child_state, &successors_fn, heuristic);
            on_path.insert(child_state.clone());
            let child = arena.push(child_state, Some(parent), child_g, Some(mv));
            stats.nodes_expanded += 1;
            frames.push(Frame {
                node: child,
                children,
                next: 0,
            });
        }

        stats
            .iteration_expansions
            .push(stats.nodes_expanded - expanded_before);

        match min_overflow {
            Some(next) => f_limit = next,
            None => {
                debug!(f_limit, "no node overflowed the bound; space exhausted");
                return empty_outcome(NodeArena::new(), stats);
            }
        }
    }
}

/// Successors sorted by heuristic value ascending, so the most promising
/// child is tried first.
fn ordered_successors<S>(
    state: &State,
    successors_fn: &S,
    heuristic: &dyn Heuristic,
) -> Vec<(Move, State)>
where
    S: Fn(&State) -> Vec<(Move, State)>,
{
    let mut children = successors_fn(state);
    children.sort_by(|(_, a), (_, b)| heuristic.estimate(a).total_cmp(&heuristic.estimate(b)));
    children
}
