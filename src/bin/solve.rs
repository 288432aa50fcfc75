use clap::{Parser, ValueEnum};
use stacksort_solver::astar::astar_search;
use stacksort_solver::deepening::{ida_star_search, iterative_deepening_search};
use stacksort_solver::engine::{successors, validate_state, State};
use stacksort_solver::heuristics::{
    AdmissibleHeuristic, DeepeningHeuristic, PatternDbHeuristic, WeightedHeuristic,
};
use stacksort_solver::node::SearchOutcome;
use stacksort_solver::pattern_db::DisjointPatternDatabase;
use stacksort_solver::utils::state_from_str_array;
use std::fs;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    /// A* with the admissible heuristic (optimal solutions)
    Astar,
    /// Weighted A* (faster, may be suboptimal)
    Weighted,
    /// Iterative deepening depth-first search
    Ids,
    /// IDA* with the admissible heuristic (optimal, low memory)
    Idastar,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm to run
    #[clap(short, long, value_enum, default_value_t = Algorithm::Astar)]
    algorithm: Algorithm,

    /// Heuristic weight for weighted search
    #[clap(short, long, default_value_t = 1.5)]
    weight: f64,

    /// Depth bound for the iterative searches
    #[clap(short, long, default_value_t = 50)]
    max_depth: u32,

    /// Directory holding pattern database caches; when given, A* uses the
    /// pattern database heuristic instead of the analytic one
    #[clap(long)]
    pdb_dir: Option<PathBuf>,

    /// Path to the puzzle file (one stack per line, bottom token first,
    /// color digits 1-8; a blank line or "-" is an empty stack)
    puzzle_file: PathBuf,
}

fn read_puzzle_file(path: &PathBuf) -> Result<State, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .map(|s| if s == "-" { "" } else { s })
        .collect();

    let state =
        state_from_str_array(&lines).map_err(|e| format!("Invalid puzzle format: {}", e))?;
    validate_state(&state).map_err(|e| format!("Invalid puzzle: {}", e))?;
    Ok(state)
}

fn run_search(args: &Args, initial: &State) -> SearchOutcome {
    match args.algorithm {
        Algorithm::Astar => match &args.pdb_dir {
            Some(dir) => {
                let mut pdb =
                    DisjointPatternDatabase::new(initial.num_stacks(), initial.colors().len());
                if !pdb.load_all(dir) {
                    warn!(
                        dir = %dir.display(),
                        "pattern databases incomplete; missing reductions fall back to the analytic estimate"
                    );
                }
                astar_search(
                    initial,
                    State::is_goal,
                    successors,
                    &PatternDbHeuristic::new(&pdb),
                    1.0,
                )
            }
            None => astar_search(initial, State::is_goal, successors, &AdmissibleHeuristic, 1.0),
        },
        Algorithm::Weighted => astar_search(
            initial,
            State::is_goal,
            successors,
            &WeightedHeuristic {
                weight: args.weight,
            },
            args.weight,
        ),
        Algorithm::Ids => iterative_deepening_search(
            initial,
            State::is_goal,
            successors,
            &DeepeningHeuristic,
            args.max_depth,
        ),
        Algorithm::Idastar => ida_star_search(
            initial,
            State::is_goal,
            successors,
            &AdmissibleHeuristic,
            args.max_depth,
        ),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let initial = read_puzzle_file(&args.puzzle_file)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", args.puzzle_file.display(), e));
    println!("Loaded puzzle from {}\n", args.puzzle_file.display());
    println!("Initial state:\n{}\n", initial);

    let outcome = run_search(&args, &initial);
    let stats = &outcome.stats;

    if let (Some(moves), Some(path)) = (outcome.moves(), outcome.path()) {
        println!("Solution found:\n");
        println!("Moves ({}):", moves.len());
        if moves.is_empty() {
            println!("  Already solved.");
        } else {
            for (i, mv) in moves.iter().enumerate() {
                println!("  Move {}: {}", i + 1, mv);
            }
        }
        println!("\nFinal state:\n{}\n", path.last().expect("path is never empty"));
    } else {
        println!("No solution found.\n");
    }

    println!(
        "Expanded {} nodes, generated {}, deepest depth {}, {} iteration(s).",
        stats.nodes_expanded, stats.nodes_generated, stats.max_depth_reached, stats.iterations
    );
}
