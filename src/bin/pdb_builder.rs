use clap::Parser;
use stacksort_solver::engine::{predecessors, validate_config};
use stacksort_solver::pattern_db::DisjointPatternDatabase;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of stacks in the puzzle configuration
    #[clap(short, long)]
    stacks: usize,

    /// Number of colors in the puzzle configuration
    #[clap(short, long)]
    colors: usize,

    /// Entry cap per group database
    #[clap(long, default_value_t = 1_000_000)]
    max_states: usize,

    /// Directory to write cache files into
    #[clap(long, default_value = "cache")]
    cache_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    validate_config(args.stacks, args.colors)
        .unwrap_or_else(|e| panic!("Rejected configuration: {}", e));

    println!(
        "Building pattern databases for {} stacks, {} colors (cap {} entries per group)...\n",
        args.stacks, args.colors, args.max_states
    );

    let mut pdb = DisjointPatternDatabase::new(args.stacks, args.colors);
    let total = pdb.build_all(predecessors, args.max_states);
    pdb.save_all(&args.cache_dir)
        .unwrap_or_else(|e| panic!("Failed to write cache files: {}", e));

    println!(
        "Built {} group database(s) with {} entries total.",
        pdb.databases().len(),
        total
    );
    println!("Cache files written to {}.", args.cache_dir.display());
}
