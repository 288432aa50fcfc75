//! Search nodes, node arena, statistics, and solution extraction.
//!
//! Nodes live in an index-based arena and hold only a child-to-parent
//! back-reference; traversal is always from a goal node upward. Multiple
//! nodes may wrap equal state values when the graph is reached via
//! different paths; deduplication by state value is the search's job.
use crate::engine::{Move, State};

/// One node of the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: State,
    /// Arena index of the parent, `None` for the root.
    pub parent: Option<usize>,
    /// Path cost: number of moves from the root.
    pub g: u32,
    /// The move that produced this state from the parent, `None` for the root.
    pub mv: Option<Move>,
}

/// Flat arena of search nodes addressed by index.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Appends a node and returns its index.
    pub fn push(
        &mut self,
        state: State,
        parent: Option<usize>,
        g: u32,
        mv: Option<Move>,
    ) -> usize {
        self.nodes.push(SearchNode {
            state,
            parent,
            g,
            mv,
        });
        self.nodes.len() - 1
    }

    pub fn get(&self, idx: usize) -> &SearchNode {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The state sequence from the root to `goal`, by walking parent links
    /// and reversing.
    pub fn path(&self, goal: usize) -> Vec<State> {
        let mut path = Vec::new();
        let mut current = Some(goal);
        while let Some(idx) = current {
            let node = self.get(idx);
            path.push(node.state.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// The move sequence from the root to `goal`, in playing order.
    pub fn moves(&self, goal: usize) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut current = Some(goal);
        while let Some(idx) = current {
            let node = self.get(idx);
            if let Some(mv) = node.mv {
                moves.push(mv);
            }
            current = node.parent;
        }
        moves.reverse();
        moves
    }
}

/// Diagnostics every search reports alongside its result.
///
/// Not optional telemetry: tests validate search behavior through these
/// counters (for example, that deepening iterations grow and that a goal
/// initial state is returned without any expansion).
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// States expanded (popped and had successors generated).
    pub nodes_expanded: u64,
    /// Child nodes created.
    pub nodes_generated: u64,
    /// Deepest depth reached during the search.
    pub max_depth_reached: u32,
    /// Deepening iterations run (1 for single-pass searches).
    pub iterations: u32,
    /// Expansion count of each *completed* (goal-free) iteration, for the
    /// iterative searches.
    pub iteration_expansions: Vec<u64>,
}

/// Result of one search invocation: the goal node (if any), the arena it
/// lives in, and the run's statistics.
#[derive(Debug)]
pub struct SearchOutcome {
    pub goal: Option<usize>,
    pub arena: NodeArena,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        self.goal.is_some()
    }

    /// Optimal-path cost (`g` of the goal node), if a goal was reached.
    pub fn cost(&self) -> Option<u32> {
        self.goal.map(|idx| self.arena.get(idx).g)
    }

    /// States from the initial state to the goal, if a goal was reached.
    pub fn path(&self) -> Option<Vec<State>> {
        self.goal.map(|idx| self.arena.path(idx))
    }

    /// Moves from the initial state to the goal, if a goal was reached.
    pub fn moves(&self) -> Option<Vec<Move>> {
        self.goal.map(|idx| self.arena.moves(idx))
    }
}
