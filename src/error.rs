use thiserror::Error;

/// Failures surfaced by graph construction and playlist requests.
///
/// Record-level variants (`MalformedEdgeRecord`, `MalformedSimilarityRecord`,
/// `UnresolvedSeed`) are recovered from locally: the loaders log them and keep
/// going. Everything else aborts the current request.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("malformed edge record on line {line}: {reason}")]
    MalformedEdgeRecord { line: usize, reason: String },

    #[error("malformed similarity record for '{source_id}': {reason}")]
    MalformedSimilarityRecord { source_id: String, reason: String },

    #[error("seed '{0}' not found in catalog")]
    UnresolvedSeed(String),

    #[error("none of the requested seeds could be resolved")]
    NoSeeds,

    #[error("power iteration failed to converge in {iterations} iterations (residual {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("community {community} has no members")]
    EmptyCommunity { community: usize },

    #[error("partition does not match graph: {0}")]
    PartitionMismatch(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
