//! Graph store boundary.
//!
//! The snapshot writer only needs two calls from a store: execute one
//! statement, and ensure one index exists. [`SurrealStore`] talks to a real
//! SurrealDB instance; [`MemoryStore`] keeps the graph in memory for tests.

mod error;
mod memory;
mod statement;
mod surreal;

pub use error::StoreError;
pub use memory::{MemoryStore, StoredEdge, StoredNode};
pub use statement::{escape, render_properties, IndexSpec, Statement, MISSING_ENDPOINT};
pub use surreal::SurrealStore;

use async_trait::async_trait;

/// A graph-oriented store that accepts snapshot statements.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Execute a single statement.
    async fn execute(&self, statement: &Statement) -> Result<(), StoreError>;

    /// Create the index if it does not exist yet.
    async fn ensure_index(&self, index: &IndexSpec) -> Result<(), StoreError>;
}
