use thiserror::Error;

/// Error type for puzzle construction, parsing, and cache persistence.
///
/// Search failure (no goal found within bounds) is deliberately *not* an
/// error: the search functions return an empty outcome and callers branch
/// on it.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Puzzle configuration rejected before reaching the search core.
    #[error("invalid puzzle configuration: {0}")]
    Config(String),

    /// A text fixture could not be parsed into a state.
    #[error("failed to parse state: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
