//! Error types for the SurveyClust engine.

use thiserror::Error;

/// Core error type for clustering operations.
///
/// `NumericParse` and `EmptyCluster` conditions from the design notes are
/// deliberately not variants here: they are recovered internally (imputed,
/// re-seeded) and only ever reach a `tracing::warn!` call, never a caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("no respondents supplied")]
    NoRespondents,

    #[error("unknown algorithm tag: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("clustering cancelled")]
    Cancelled,
}

/// Result type alias for SurveyClust operations.
pub type Result<T> = std::result::Result<T, EngineError>;
