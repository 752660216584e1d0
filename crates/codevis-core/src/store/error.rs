//! Graph store error types.

use thiserror::Error;

/// Errors returned by a [`GraphStore`](super::GraphStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or authenticated against.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement was rejected or failed while executing.
    #[error("Query error: {0}")]
    Query(String),

    /// An edge referenced a node that is not in the store.
    #[error("Edge endpoint not found: {0}")]
    EndpointNotFound(String),

    /// Failure injected by a test store.
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}
