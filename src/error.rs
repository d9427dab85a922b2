/// Centralized error types for project-qa using thiserror
///
/// Per-file indexing problems (unsupported language, parse failure) are not
/// errors: they are recorded in `IndexResult` and the build continues, so a
/// partially indexable project still produces a usable index.
use thiserror::Error;

/// Result alias for fallible core operations
pub type QaResult<T> = std::result::Result<T, QaError>;

/// Main error type for the indexing and retrieval core
#[derive(Error, Debug)]
pub enum QaError {
    /// Query text was empty or whitespace-only; an empty query has no
    /// defensible ranking, so the call fails instead of returning everything.
    #[error("invalid query: question text is empty")]
    InvalidQuery,

    /// A build for the same project id is already in progress. The first
    /// writer wins; the losing call is rejected rather than queued.
    #[error("a build is already in progress for project '{0}'")]
    BuildConflict(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
