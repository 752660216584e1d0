//! SurrealDB-backed graph store.

use async_trait::async_trait;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info};

use super::{GraphStore, IndexSpec, Statement, StoreError, MISSING_ENDPOINT};
use crate::config::StoreConfig;

/// Session against a SurrealDB endpoint.
///
/// Acquired once per process with [`SurrealStore::connect`] and released with
/// [`SurrealStore::close`] (or on drop).
pub struct SurrealStore {
    db: Surreal<Any>,
    address: String,
}

impl SurrealStore {
    /// Connect, authenticate (remote endpoints only) and select the
    /// namespace/database from `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = any::connect(config.address.as_str())
            .await
            .map_err(|e| StoreError::Connection(format!("{}: {}", config.address, e)))?;

        if is_remote(&config.address) {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StoreError::Connection(format!("sign-in failed: {}", e)))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!(address = %config.address, "connected to graph store");
        Ok(Self {
            db,
            address: config.address.clone(),
        })
    }

    /// Release the session.
    pub fn close(self) {
        debug!(address = %self.address, "closing graph store session");
        drop(self.db);
    }

    /// Count records in a table (node label or relation kind).
    pub async fn count(&self, table: &str) -> Result<usize, StoreError> {
        #[derive(serde::Deserialize)]
        struct CountResult {
            count: i64,
        }

        let result: Option<CountResult> = self
            .db
            .query("SELECT count() FROM type::table($table) GROUP ALL")
            .bind(("table", table.to_string()))
            .await?
            .take(0)?;

        Ok(result
            .and_then(|r| usize::try_from(r.count).ok())
            .unwrap_or(0))
    }

    async fn run(&self, query: String) -> Result<(), StoreError> {
        self.db.query(query).await?.check()?;
        Ok(())
    }
}

fn is_remote(address: &str) -> bool {
    ["ws://", "wss://", "http://", "https://"]
        .iter()
        .any(|scheme| address.starts_with(scheme))
}

#[async_trait]
impl GraphStore for SurrealStore {
    async fn execute(&self, statement: &Statement) -> Result<(), StoreError> {
        self.run(statement.render()).await.map_err(|e| match e {
            StoreError::Query(message) if message.contains(MISSING_ENDPOINT) => {
                StoreError::EndpointNotFound(message)
            }
            other => other,
        })
    }

    async fn ensure_index(&self, index: &IndexSpec) -> Result<(), StoreError> {
        self.run(index.render()).await
    }
}
