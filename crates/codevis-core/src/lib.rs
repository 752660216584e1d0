//! codevis: materialize a program's structure as a property graph snapshot.
//!
//! - [`facts`] - analyzer input documents and their normalization
//! - [`graph`] - node/edge model, assembler, immutable [`Graph`]
//! - [`store`] - statement builder and store clients
//! - [`sync`] - snapshot writer and throughput monitor
//! - [`pipeline`] - end-to-end run wiring

pub mod config;
pub mod facts;
pub mod graph;
pub mod pipeline;
pub mod store;
pub mod sync;

pub use config::{AnalysisConfig, Config, ConfigError, StoreConfig, SyncConfig};
pub use facts::{AnalysisFacts, ClassificationError, FactError, NormalizedFacts};
pub use graph::{assemble, Edge, Element, Graph, GraphStats, Node, NodeId, NodeLabel, RelationKind};
pub use pipeline::{Pipeline, PipelineError, PreparedSnapshot, RunReport};
pub use store::{GraphStore, MemoryStore, StoreError, SurrealStore};
pub use sync::{sync_snapshot, SyncOptions, SyncReport, WriteReport};
