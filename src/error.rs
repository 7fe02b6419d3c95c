//! Error taxonomy for stratum-data

use thiserror::Error;

/// Data errors produced by `DataSource` and `Repository` operations.
///
/// This is a closed set at the core level (spec §3, §7). Backends that need
/// to carry a domain-specific cause wrap it in [`DataError::Other`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The requested entity does not exist at this source.
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity was found but rejected by a validator (e.g. stale data).
    #[error("not valid: {0}")]
    NotValid(String),

    /// Caller passed an argument a backend cannot accept.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The `Query` variant is not recognized by this backend.
    #[error("query not supported: {0}")]
    QueryNotSupported(String),

    /// The backend does not implement this capability.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Catch-all for backend-originated failures.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// True for the two error kinds that trigger `StorageSync` read fallback
    /// to the network tier (spec §4.3, §7).
    pub fn triggers_network_fallback(&self) -> bool {
        matches!(self, DataError::NotFound(_) | DataError::NotValid(_))
    }
}

/// Crate-wide result alias for data errors.
pub type Result<T> = std::result::Result<T, DataError>;
