//! Disjoint pattern databases with on-disk caching.
//!
//! Each database covers one group of colors. It is built by a backward
//! breadth-first walk from a canonical goal, recording for every *reduced*
//! state (the stacks projected onto the group's colors) the number of
//! backward moves at which that reduction was first seen. At solve time the
//! per-group lookups are summed into one estimate.
//!
//! Reductions collapse many full states into one key, so a recorded
//! distance is the cost of *some* state with that reduction, not
//! necessarily the cheapest one. The estimate is a strong guide, not a
//! proven lower bound.
use crate::engine::{canonical_goal, Color, State};
use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A state projected onto one color group: per stack, the group's tokens
/// in their original order.
pub type ReducedKey = Vec<Vec<Color>>;

/// On-disk representation of one built database.
#[derive(Serialize, Deserialize)]
struct CacheFile {
    num_stacks: usize,
    num_colors: usize,
    group_index: usize,
    colors: Vec<Color>,
    entries: Vec<(ReducedKey, u32)>,
}

/// Splits colors `1..=num_colors` into disjoint groups: singletons up to
/// three colors, two halves up to six, three parts beyond that. Smaller
/// groups keep each table's key space tractable.
pub fn color_groups(num_colors: usize) -> Vec<Vec<Color>> {
    let colors: Vec<Color> = (1..=num_colors as Color).collect();
    if num_colors <= 3 {
        colors.iter().map(|&c| vec![c]).collect()
    } else if num_colors <= 6 {
        let half = num_colors / 2;
        vec![colors[..half].to_vec(), colors[half..].to_vec()]
    } else {
        let third = num_colors / 3;
        vec![
            colors[..third].to_vec(),
            colors[third..2 * third].to_vec(),
            colors[2 * third..].to_vec(),
        ]
    }
}

/// A single-group pattern database.
pub struct PatternDatabase {
    group_index: usize,
    colors: Vec<Color>,
    num_stacks: usize,
    num_colors: usize,
    table: HashMap<ReducedKey, u32>,
}

impl PatternDatabase {
    pub fn new(group_index: usize, colors: Vec<Color>, num_stacks: usize, num_colors: usize) -> Self {
        PatternDatabase {
            group_index,
            colors,
            num_stacks,
            num_colors,
            table: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Projects a full state onto this database's color group.
    pub fn reduced_key(&self, state: &State) -> ReducedKey {
        state
            .stacks()
            .iter()
            .map(|stack| {
                stack
                    .iter()
                    .copied()
                    .filter(|token| self.colors.contains(token))
                    .collect()
            })
            .collect()
    }

    /// Looks up the stored distance for a state's reduction, if built.
    pub fn lookup(&self, state: &State) -> Option<u32> {
        self.table.get(&self.reduced_key(state)).copied()
    }

    /// Builds the table by backward breadth-first search from the canonical
    /// goal, walking `predecessors_fn` and deduplicating by reduced key.
    /// Stops once `max_states` entries exist; returns the entry count.
    pub fn build<F>(&mut self, predecessors_fn: F, max_states: usize) -> usize
    where
        F: Fn(&State) -> Vec<State>,
    {
        self.table.clear();
        let goal = canonical_goal(self.num_stacks, self.num_colors);
        self.table.insert(self.reduced_key(&goal), 0);

        let mut queue = VecDeque::new();
        queue.push_back((goal, 0u32));

        while let Some((state, depth)) = queue.pop_front() {
            if self.table.len() >= max_states {
                debug!(
                    group = self.group_index,
                    entries = self.table.len(),
                    "entry cap reached, stopping early"
                );
                break;
            }
            for parent in predecessors_fn(&state) {
                let key = self.reduced_key(&parent);
                if self.table.contains_key(&key) {
                    continue;
                }
                self.table.insert(key, depth + 1);
                if self.table.len() % 10_000 == 0 {
                    info!(
                        group = self.group_index,
                        entries = self.table.len(),
                        depth = depth + 1,
                        "building pattern database"
                    );
                }
                queue.push_back((parent, depth + 1));
            }
        }

        info!(
            group = self.group_index,
            entries = self.table.len(),
            "pattern database built"
        );
        self.table.len()
    }

    fn cache_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "pdb_g{}_s{}_c{}.json",
            self.group_index, self.num_stacks, self.num_colors
        ))
    }

    /// Loads this database from its cache file under `dir`.
    ///
    /// Returns `false` (after a warning) when the file is missing,
    /// unreadable, or describes a different configuration; a stale cache
    /// must never poison a solve, so loading never hard-fails.
    pub fn load(&mut self, dir: &Path) -> bool {
        let path = self.cache_path(dir);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "pattern database cache unavailable");
                return false;
            }
        };
        let cache: CacheFile = match serde_json::from_str(&text) {
            Ok(cache) => cache,
            Err(err) => {
                warn!(path = %path.display(), %err, "pattern database cache unreadable");
                return false;
            }
        };
        if cache.num_stacks != self.num_stacks
            || cache.num_colors != self.num_colors
            || cache.group_index != self.group_index
            || cache.colors != self.colors
        {
            warn!(
                path = %path.display(),
                "pattern database cache was built for a different configuration"
            );
            return false;
        }

        self.table = cache.entries.into_iter().collect();
        debug!(
            group = self.group_index,
            entries = self.table.len(),
            "pattern database loaded from cache"
        );
        true
    }

    /// Writes this database's cache file under `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<(), SolverError> {
        fs::create_dir_all(dir)?;
        let cache = CacheFile {
            num_stacks: self.num_stacks,
            num_colors: self.num_colors,
            group_index: self.group_index,
            colors: self.colors.clone(),
            entries: self.table.iter().map(|(k, &d)| (k.clone(), d)).collect(),
        };
        let path = self.cache_path(dir);
        fs::write(&path, serde_json::to_string(&cache)?)?;
        debug!(path = %path.display(), entries = self.table.len(), "pattern database saved");
        Ok(())
    }
}

/// The full set of per-group databases for one puzzle configuration.
pub struct DisjointPatternDatabase {
    num_stacks: usize,
    num_colors: usize,
    databases: Vec<PatternDatabase>,
}

impl DisjointPatternDatabase {
    pub fn new(num_stacks: usize, num_colors: usize) -> Self {
        let databases = color_groups(num_colors)
            .into_iter()
            .enumerate()
            .map(|(idx, colors)| PatternDatabase::new(idx, colors, num_stacks, num_colors))
            .collect();
        DisjointPatternDatabase {
            num_stacks,
            num_colors,
            databases,
        }
    }

    pub fn num_stacks(&self) -> usize {
        self.num_stacks
    }

    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    pub fn databases(&self) -> &[PatternDatabase] {
        &self.databases
    }

    /// Builds every group database; returns the total entry count.
    pub fn build_all<F>(&mut self, predecessors_fn: F, max_states: usize) -> usize
    where
        F: Fn(&State) -> Vec<State>,
    {
        self.databases
            .iter_mut()
            .map(|db| db.build(&predecessors_fn, max_states))
            .sum()
    }

    /// Loads every group database from `dir`; `true` only if all loaded.
    pub fn load_all(&mut self, dir: &Path) -> bool {
        let mut all = true;
        for db in &mut self.databases {
            all &= db.load(dir);
        }
        all
    }

    /// Saves every group database under `dir`.
    pub fn save_all(&self, dir: &Path) -> Result<(), SolverError> {
        for db in &self.databases {
            db.save(dir)?;
        }
        Ok(())
    }

    /// Sums the per-group distances for `state`. `None` if any group has
    /// no entry for its reduction; callers fall back to an analytic
    /// estimate rather than trusting a partial sum.
    pub fn estimate(&self, state: &State) -> Option<u32> {
        let mut total = 0u32;
        for db in &self.databases {
            total += db.lookup(state)?;
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::predecessors;
    use crate::utils::{bfs_shortest_solution, state_from_str_array};

    fn temp_cache_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stacksort_pdb_{}_{}", tag, std::process::id()))
    }

    #[test]
    fn test_color_groups_partitions() {
        assert_eq!(color_groups(3), vec![vec![1], vec![2], vec![3]]);
        assert_eq!(color_groups(5), vec![vec![1, 2], vec![3, 4, 5]]);
        assert_eq!(
            color_groups(8),
            vec![vec![1, 2], vec![3, 4], vec![5, 6, 7, 8]]
        );

        // Every color lands in exactly one group.
        for n in 3..=8 {
            let mut all: Vec<Color> = color_groups(n).concat();
            all.sort_unstable();
            assert_eq!(all, (1..=n as Color).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_goal_reduction_has_distance_zero() {
        let mut db = PatternDatabase::new(0, vec![1], 4, 3);
        db.build(predecessors, 500);
        let goal = state_from_str_array(&["1111", "2222", "3333", ""]).unwrap();
        assert_eq!(db.lookup(&goal), Some(0));
    }

    #[test]
    fn test_full_group_distances_bound_true_cost() {
        // With every color in one group the reduction is the state itself,
        // so each entry's distance is an actual path to the canonical goal
        // and the true optimum (to any goal) cannot exceed it.
        let mut db = PatternDatabase::new(0, vec![1, 2, 3], 4, 3);
        db.build(predecessors, 2_000);

        let mut checked = 0;
        for (key, &distance) in &db.table {
            if distance > 4 || checked >= 40 {
                continue;
            }
            let state = State::new(key.clone());
            let optimal = bfs_shortest_solution(&state, distance)
                .expect("entry state must solve within its recorded distance");
            assert!(optimal <= distance);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_estimate_requires_every_group() {
        let mut pdb = DisjointPatternDatabase::new(4, 3);
        // One backward step from the canonical goal.
        let near = state_from_str_array(&["111", "2222", "3333", "1"]).unwrap();
        assert_eq!(pdb.estimate(&near), None);

        pdb.build_all(predecessors, 50_000);
        assert_eq!(pdb.estimate(&near), Some(1));

        let goal = state_from_str_array(&["1111", "2222", "3333", ""]).unwrap();
        assert_eq!(pdb.estimate(&goal), Some(0));
    }

    #[test]
    fn test_entry_cap_stops_build() {
        let mut db = PatternDatabase::new(0, vec![1], 4, 3);
        let entries = db.build(predecessors, 1);
        assert_eq!(entries, 1);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = temp_cache_dir("round_trip");
        let mut built = DisjointPatternDatabase::new(4, 3);
        built.build_all(predecessors, 10_000);
        built.save_all(&dir).unwrap();

        let mut loaded = DisjointPatternDatabase::new(4, 3);
        assert!(loaded.load_all(&dir));

        let state = state_from_str_array(&["111", "2222", "3333", "1"]).unwrap();
        assert_eq!(loaded.estimate(&state), built.estimate(&state));
        assert!(loaded.estimate(&state).is_some());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_missing_and_corrupt_cache() {
        let dir = temp_cache_dir("corrupt");
        let mut db = PatternDatabase::new(0, vec![1], 4, 3);
        assert!(!db.load(&dir));

        fs::create_dir_all(&dir).unwrap();
        fs::write(db.cache_path(&dir), "not a cache file").unwrap();
        assert!(!db.load(&dir));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_mismatched_configuration() {
        let dir = temp_cache_dir("mismatch");
        let mut built = PatternDatabase::new(0, vec![1], 4, 3);
        built.build(predecessors, 500);
        built.save(&dir).unwrap();

        // Same file name, different color group.
        let mut other = PatternDatabase::new(0, vec![2], 4, 3);
        assert!(!other.load(&dir));

        fs::remove_dir_all(&dir).unwrap();
    }
}
