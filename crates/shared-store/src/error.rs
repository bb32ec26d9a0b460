//! Store error type shared by every port.

use thiserror::Error;

/// Errors surfaced by durable store adapters.
///
/// Callers treat these as transient I/O failures: loops log and skip the
/// unit of work (the next tick retries), the audit pipeline falls back to
/// file persistence, and the retention purger aborts its run.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Aggregate name, e.g. `"proposal"`.
        entity: &'static str,
        /// Identifier that missed.
        id: String,
    },

    /// A uniqueness or integrity constraint rejected the write.
    #[error("constraint violated: {0}")]
    Conflict(String),

    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True when retrying the same operation later could succeed.
    ///
    /// `NotFound` and `Conflict` are stable outcomes; retrying them
    /// without a state change is pointless.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
