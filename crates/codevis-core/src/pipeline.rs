//! End-to-end sync run: facts → nodes → graph → store.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::facts::{normalize, AnalysisFacts, ClassificationError, FactError};
use crate::graph::{assemble, Graph};
use crate::store::{GraphStore, StoreError, SurrealStore};
use crate::sync::{sync_snapshot, SyncOptions, SyncReport};

/// Errors that stop a run before any write happens.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Facts(#[from] FactError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An assembled graph ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedSnapshot {
    pub graph: Graph,
    /// Facts dropped during normalization.
    pub rejected: Vec<ClassificationError>,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub rejected: Vec<String>,
    pub sync: SyncReport,
}

impl RunReport {
    /// No dropped facts and no failed writes.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.sync.is_clean()
    }
}

/// A configured sync pipeline.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Validate `config` and build the pipeline.
    pub fn new(config: Config) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build a pipeline that only prepares graphs; store settings are not
    /// checked.
    pub fn offline(config: Config) -> Result<Self, PipelineError> {
        config.validate_analysis()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load, normalize and assemble without touching the store.
    pub fn prepare(&self) -> Result<PreparedSnapshot, PipelineError> {
        let source = self.config.analysis.facts_source();
        info!(source = %source.display(), "loading analyzer facts");

        let facts = AnalysisFacts::load(&source)?;
        Ok(self.prepare_facts(facts))
    }

    /// Normalize and assemble already-loaded facts.
    pub fn prepare_facts(&self, facts: AnalysisFacts) -> PreparedSnapshot {
        let mut normalized = normalize(facts);
        let rejected = std::mem::take(&mut normalized.rejected);
        let graph = assemble(self.config.analysis.program_name(), normalized);
        PreparedSnapshot { graph, rejected }
    }

    /// Write a prepared snapshot into `store`.
    pub async fn write<S: GraphStore + ?Sized>(&self, store: &S, prepared: PreparedSnapshot) -> RunReport {
        let options = SyncOptions::from(&self.config.sync);
        let sync = sync_snapshot(store, &prepared.graph, &options).await;
        RunReport {
            rejected: prepared.rejected.iter().map(ToString::to_string).collect(),
            sync,
        }
    }

    /// Prepare and write into `store`.
    pub async fn run<S: GraphStore + ?Sized>(&self, store: &S) -> Result<RunReport, PipelineError> {
        let prepared = self.prepare()?;
        Ok(self.write(store, prepared).await)
    }

    /// Prepare, connect to the configured SurrealDB store, write, disconnect.
    pub async fn run_surreal(&self) -> Result<RunReport, PipelineError> {
        self.config.validate_store()?;
        let prepared = self.prepare()?;
        let store = SurrealStore::connect(&self.config.store).await?;
        let report = self.write(&store, prepared).await;
        store.close();
        Ok(report)
    }
}
