//! # Stack-Sort Solver Library
//!
//! This library provides the state model and search algorithms for the
//! stack-sorting token puzzle: a row of capacity-limited stacks of colored
//! tokens, where a move transfers one top token onto an empty stack or a
//! matching top, and the goal is every color gathered into its own full
//! stack.
//!
//! It is used by two binaries:
//! - `solve`: Takes a puzzle file and a strategy, then outputs the move
//!   sequence and search statistics.
//! - `pdb_builder`: Builds and persists the disjoint pattern databases for
//!   a puzzle configuration.
//!
//! ## Modules
//! - `engine`: State representation, goal test, forward and backward move
//!   generation, random instance generation, and validation.
//! - `heuristics`: The `Heuristic` trait and its four variants (admissible,
//!   weighted, fast approximate, pattern-database).
//! - `node`: Search-node arena, statistics, and solution extraction.
//! - `astar`: A* and weighted best-first search.
//! - `deepening`: Iterative deepening and IDA*, both with explicit work
//!   stacks.
//! - `pattern_db`: Disjoint pattern databases with on-disk caching.
//! - `utils`: Fixture parsing, move replay, and a brute-force reference
//!   solver for tests.

pub mod astar;
pub mod deepening;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod node;
pub mod pattern_db;
pub mod utils;
