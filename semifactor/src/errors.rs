/// Error types for the factoring pipeline.
///
/// Only failures that stop a run are errors. A search that finds no divisor
/// is a normal outcome and is reported through
/// [`FactorResult::found`](crate::results::FactorResult), never through
/// [`FactorError`].
///
/// ```rust,ignore
/// match semifactor::run(&config) {
///     Ok(report) if report.result.found => // print the pair,
///     Ok(_) => // "no factors found", exit code 1,
///     Err(FactorError::AllocationFailure { .. }) => // fatal, exit code 2,
///     Err(e) => // other fatal error,
/// }
/// ```
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, FactorError>;

/// Errors that can stop a factoring run
#[derive(Error, Debug)]
pub enum FactorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Allocation failure: could not reserve {len} entries for the {what}")]
    AllocationFailure { what: &'static str, len: u64 },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FactorError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn allocation_failure(what: &'static str, len: u64) -> Self {
        Self::AllocationFailure { what, len }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the error is the fatal out-of-memory case
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

impl From<::config::ConfigError> for FactorError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
