//! Closed error surface for the graph core.

use uuid::Uuid;

/// Errors raised by [`crate::GraphStore`] operations.
///
/// Every variant is raised synchronously by exactly the operations named in
/// its documentation; the core never retries and never partially commits a
/// failed operation.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// Raised by `insert_node`/`insert_edge` on an empty label/relationship
    /// or a non-string property key.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// Raised by `delete_node`/`delete_edge` on a non-existent identifier.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// Raised by `insert_edge` when `source_id` or `target_id` is not
    /// currently live.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(Uuid),

    /// Raised by `rollback`/`rollback_to_timestamp` when the request exceeds
    /// the recorded history.
    #[error("out of history: requested {requested} steps, only {available} available")]
    OutOfHistory { requested: usize, available: usize },

    /// Reserved for a host reporting a cancellation that happened before the
    /// call reached the core. The core never raises this itself.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type used throughout the graph core.
pub type Result<T> = std::result::Result<T, CoreError>;
