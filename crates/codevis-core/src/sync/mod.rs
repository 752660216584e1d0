//! Snapshot synchronization: the writer plus its throughput monitor.

mod monitor;
mod writer;

pub use monitor::{FinalCounts, ThroughputMonitor, ThroughputSummary, WriteCounter};
pub use writer::{SnapshotWriter, WriteFailure, WritePhase, WriteReport};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{SyncConfig, DEFAULT_REPORT_INTERVAL_MS};
use crate::graph::Graph;
use crate::store::GraphStore;

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub report_interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_millis(DEFAULT_REPORT_INTERVAL_MS),
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            report_interval: config.report_interval(),
        }
    }
}

/// Outcome of writing one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub program: String,
    pub started_at: DateTime<Utc>,
    /// Id-independent shape hash of the written graph.
    pub fingerprint: String,
    pub write: WriteReport,
    pub throughput: ThroughputSummary,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.write.is_clean()
    }
}

/// Write `graph` into `store` while a monitor reports throughput.
///
/// The monitor's final summary is produced only after the last edge write
/// has returned.
pub async fn sync_snapshot<S: GraphStore + ?Sized>(
    store: &S,
    graph: &Graph,
    options: &SyncOptions,
) -> SyncReport {
    let started_at = Utc::now();
    let counter = WriteCounter::new();
    let monitor = ThroughputMonitor::spawn(counter.clone(), options.report_interval);

    let write = SnapshotWriter::new(store, counter).write(graph).await;

    let throughput = monitor
        .stop(FinalCounts {
            nodes: graph.nodes().len(),
            edges: graph.edges().len(),
        })
        .await;

    if write.is_clean() {
        info!(program = %graph.root().name, "snapshot replaced");
    } else {
        warn!(
            program = %graph.root().name,
            failures = write.failures.len(),
            nodes_written = write.nodes_written,
            edges_written = write.edges_written,
            "snapshot written with failures"
        );
    }

    SyncReport {
        program: graph.root().name.clone(),
        started_at,
        fingerprint: graph.fingerprint(),
        write,
        throughput,
    }
}
