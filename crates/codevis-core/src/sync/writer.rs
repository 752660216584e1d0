//! Snapshot replacement: delete the old graph, write the new one.
//!
//! The protocol is sequential and best-effort. No statement failure stops
//! the run and nothing is retried, so the store can end up with a partial
//! snapshot. Every failure is recorded in the [`WriteReport`].

use serde::Serialize;
use tracing::{info, warn};

use super::monitor::WriteCounter;
use crate::graph::Graph;
use crate::store::{GraphStore, IndexSpec, Statement, StoreError};

/// Step of the protocol a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePhase {
    Delete,
    Node,
    Index,
    Edge,
}

/// A single failed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub phase: WritePhase,
    /// What was being written (node id, edge, index name or program name).
    pub target: String,
    pub error: String,
}

/// Attempted versus confirmed writes of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub snapshot_cleared: bool,
    pub nodes_attempted: usize,
    pub nodes_written: usize,
    pub indexes_attempted: usize,
    pub indexes_created: usize,
    pub edges_attempted: usize,
    pub edges_written: usize,
    pub failures: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_in(&self, phase: WritePhase) -> usize {
        self.failures.iter().filter(|f| f.phase == phase).count()
    }

    fn fail(&mut self, phase: WritePhase, target: String, error: &StoreError) {
        warn!("{:?} write failed for {}: {}", phase, target, error);
        self.failures.push(WriteFailure {
            phase,
            target,
            error: error.to_string(),
        });
    }
}

/// Writes one graph into a store, counting node and edge writes.
pub struct SnapshotWriter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    counter: WriteCounter,
}

impl<'a, S: GraphStore + ?Sized> SnapshotWriter<'a, S> {
    pub fn new(store: &'a S, counter: WriteCounter) -> Self {
        Self { store, counter }
    }

    /// Replace the stored snapshot of `graph`'s program with `graph`.
    pub async fn write(&self, graph: &Graph) -> WriteReport {
        let mut report = WriteReport::default();
        let program = graph.root().name.as_str();

        match self.store.execute(&Statement::delete_snapshot(program)).await {
            Ok(()) => report.snapshot_cleared = true,
            Err(e) => report.fail(WritePhase::Delete, program.to_string(), &e),
        }

        info!("start save node ...");
        for node in graph.nodes() {
            self.counter.increment();
            report.nodes_attempted += 1;
            match self.store.execute(&Statement::create_node(node)).await {
                Ok(()) => report.nodes_written += 1,
                Err(e) => report.fail(WritePhase::Node, format!("{}:{}", node.label(), node.id()), &e),
            }
        }

        for index in IndexSpec::all() {
            report.indexes_attempted += 1;
            match self.store.ensure_index(&index).await {
                Ok(()) => report.indexes_created += 1,
                Err(e) => report.fail(WritePhase::Index, index.name(), &e),
            }
        }

        info!("start save edge ...");
        for edge in graph.edges() {
            self.counter.increment();
            report.edges_attempted += 1;
            match self.store.execute(&Statement::create_edge(edge)).await {
                Ok(()) => report.edges_written += 1,
                Err(e) => report.fail(WritePhase::Edge, edge.to_string(), &e),
            }
        }

        report
    }
}
