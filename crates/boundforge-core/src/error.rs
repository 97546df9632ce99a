//! Error types for BoundForge

use thiserror::Error;

/// Main error type for BoundForge operations.
///
/// Only setup-time failures surface through this type. Per-node failures
/// during a search are absorbed by the engine and never reach the caller.
#[derive(Debug, Error)]
pub enum BoundForgeError {
    /// Error in engine configuration (bad direction, malformed policy, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The problem instance failed its own validation
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),
}

/// Result type alias for BoundForge operations
pub type Result<T> = std::result::Result<T, BoundForgeError>;

/// A relaxation backend failed for reasons unrelated to the problem itself.
///
/// Infeasibility is not a backend error; it is reported as
/// [`Outcome::Infeasible`](crate::oracle::Outcome::Infeasible).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Numerical breakdown (ill-conditioning, NaN, failed factorization)
    #[error("Numerical failure: {0}")]
    Numerical(String),

    /// Resource exhaustion inside the backend (memory, iteration cap)
    #[error("Resource exhausted: {0}")]
    Resource(String),

    /// Any other backend failure
    #[error("Backend failure: {0}")]
    Other(String),
}

/// A branch could not be turned into a child node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchError {
    /// The branch adds no fixing, so the child would equal its parent
    #[error("branch adds no new fixing")]
    Empty,

    /// The branch re-fixes a variable that the parent already fixes
    #[error("variable {0} is already fixed by the parent node")]
    AlreadyFixed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoundForgeError::Config("unknown sense 'up'".into());
        assert_eq!(err.to_string(), "Configuration error: unknown sense 'up'");

        let err = BoundForgeError::InvalidInstance("item 0 has non-positive profit -3".into());
        assert_eq!(err.to_string(), "Invalid instance: item 0 has non-positive profit -3");

        let err = BackendError::Numerical("singular basis".into());
        assert_eq!(err.to_string(), "Numerical failure: singular basis");

        let err = BranchError::AlreadyFixed("3".into());
        assert_eq!(
            err.to_string(),
            "variable 3 is already fixed by the parent node"
        );
    }
}
