use std::collections::HashSet;
use std::time::Duration;

use codevis_core::facts::{normalize, AnalysisFacts, ElementFact, FileFact, PackageFact};
use codevis_core::graph::{Node, NodeLabel, RelationKind};
use codevis_core::store::{GraphStore, IndexSpec, Statement};
use codevis_core::sync::{SnapshotWriter, WriteCounter, WritePhase};
use codevis_core::{assemble, sync_snapshot, Graph, MemoryStore, SyncOptions};

fn facts(function: &str) -> AnalysisFacts {
    AnalysisFacts {
        files: vec![FileFact {
            path: "a.go".into(),
            lines: 3,
            imports: vec![],
        }],
        packages: vec![PackageFact {
            name: "pkg".into(),
            path: "pkg".into(),
            scopes: vec!["a.go".into()],
        }],
        elements: vec![ElementFact {
            kind: "function".into(),
            name: function.into(),
            package: "pkg".into(),
            file: "a.go".into(),
            line: 1,
            column: 6,
            signature: Some("func()".into()),
            ..Default::default()
        }],
        calls: vec![],
    }
}

fn graph(program: &str, function: &str) -> Graph {
    assemble(program, normalize(facts(function)))
}

fn options() -> SyncOptions {
    SyncOptions {
        report_interval: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_write_full_snapshot() {
    let store = MemoryStore::new();
    let graph = graph("app", "F");

    let report = sync_snapshot(&store, &graph, &options()).await;

    assert!(report.is_clean());
    assert!(report.write.snapshot_cleared);
    assert_eq!(report.write.nodes_attempted, 4);
    assert_eq!(report.write.nodes_written, 4);
    assert_eq!(report.write.edges_attempted, 6);
    assert_eq!(report.write.edges_written, 6);
    assert_eq!(report.write.indexes_created, IndexSpec::all().len());
    assert_eq!(report.throughput.total_writes, 10);
    assert_eq!(report.throughput.nodes, 4);
    assert_eq!(report.throughput.edges, 6);
    assert_eq!(report.fingerprint, graph.fingerprint());

    assert_eq!(store.node_count().await, 4);
    assert_eq!(store.edge_count().await, 6);
    // delete + 4 nodes + 6 edges
    assert_eq!(store.statement_count().await, 11);
}

#[tokio::test]
async fn test_properties_reach_the_store() {
    let store = MemoryStore::new();
    let graph = graph("app", "F");
    sync_snapshot(&store, &graph, &options()).await;

    let functions = store.nodes_labeled(NodeLabel::Function).await;
    assert_eq!(functions.len(), 1);
    let function = &functions[0];
    assert_eq!(function.text("name"), Some("F"));
    assert_eq!(function.text("pkg"), Some("pkg"));
    assert_eq!(function.text("sign"), Some("func()"));
    assert_eq!(function.text("file"), Some("a.go"));
    assert_eq!(function.text("pos"), Some("1:6"));
    assert_eq!(function.text("uuid"), Some(function.id.to_string().as_str()));

    let roots = store.nodes_labeled(NodeLabel::Program).await;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].text("name"), Some("app"));
}

#[tokio::test]
async fn test_resync_replaces_previous_snapshot() {
    let store = MemoryStore::new();
    let first = graph("app", "Old");
    let second = graph("app", "New");

    sync_snapshot(&store, &first, &options()).await;
    let report = sync_snapshot(&store, &second, &options()).await;
    assert!(report.is_clean());

    let stored: HashSet<_> = store.nodes().await.into_iter().map(|n| n.id).collect();
    let expected: HashSet<_> = second.nodes().iter().map(Node::id).collect();
    assert_eq!(stored, expected);
    assert_eq!(store.edge_count().await, second.edges().len());

    let functions = store.nodes_labeled(NodeLabel::Function).await;
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].text("name"), Some("New"));
}

#[tokio::test]
async fn test_other_programs_survive_resync() {
    let store = MemoryStore::new();
    let other = graph("other", "Keep");

    sync_snapshot(&store, &other, &options()).await;
    sync_snapshot(&store, &graph("app", "F"), &options()).await;
    sync_snapshot(&store, &graph("app", "G"), &options()).await;

    assert_eq!(store.node_count().await, 8);
    for node in other.nodes() {
        assert!(store.node(node.id()).await.is_some());
    }
}

#[tokio::test]
async fn test_failed_node_drops_its_edges() {
    let store = MemoryStore::new().with_statement_fault(|statement| {
        matches!(
            statement,
            Statement::CreateNode {
                label: NodeLabel::File,
                ..
            }
        )
    });
    let graph = graph("app", "F");

    let report = sync_snapshot(&store, &graph, &options()).await;

    assert!(!report.is_clean());
    assert_eq!(report.write.nodes_attempted, 4);
    assert_eq!(report.write.nodes_written, 3);
    assert_eq!(report.write.failures_in(WritePhase::Node), 1);
    // Contains(pkg->file), Declare(file->fn) and Belong(root->file) lose an endpoint.
    assert_eq!(report.write.failures_in(WritePhase::Edge), 3);
    assert_eq!(report.write.edges_written, 3);

    let edges = store.edges().await;
    assert_eq!(edges.len(), 3);
    assert!(edges.iter().all(|e| e.kind != RelationKind::Declare));
}

#[tokio::test]
async fn test_failed_delete_still_writes_snapshot() {
    let store = MemoryStore::new()
        .with_statement_fault(|statement| matches!(statement, Statement::DeleteSnapshot { .. }));
    let graph = graph("app", "F");

    let report = sync_snapshot(&store, &graph, &options()).await;

    assert!(!report.write.snapshot_cleared);
    assert_eq!(report.write.failures_in(WritePhase::Delete), 1);
    assert_eq!(report.write.nodes_written, 4);
    assert_eq!(report.write.edges_written, 6);
}

#[tokio::test]
async fn test_failed_index_does_not_stop_edges() {
    let store = MemoryStore::new().with_index_fault(|index| index.label == NodeLabel::Function);
    let graph = graph("app", "F");

    let report = sync_snapshot(&store, &graph, &options()).await;

    let function_fields = NodeLabel::Function.index_fields().len();
    assert_eq!(report.write.failures_in(WritePhase::Index), function_fields);
    assert_eq!(
        report.write.indexes_created,
        IndexSpec::all().len() - function_fields
    );
    assert_eq!(report.write.edges_written, 6);
    assert!(store
        .indexes()
        .await
        .iter()
        .all(|index| index.label != NodeLabel::Function));
}

#[tokio::test]
async fn test_writer_counts_every_attempt() {
    let store = MemoryStore::new().with_statement_fault(|statement| {
        matches!(statement, Statement::CreateEdge { kind: RelationKind::Belong, .. })
    });
    let graph = graph("app", "F");
    let counter = WriteCounter::new();

    let report = SnapshotWriter::new(&store, counter.clone()).write(&graph).await;

    assert_eq!(counter.get(), 10);
    assert_eq!(report.edges_attempted, 6);
    assert_eq!(report.edges_written, 3);
    assert_eq!(report.failures.len(), 3);
}

#[tokio::test]
async fn test_edge_with_missing_endpoint_is_rejected() {
    let store = MemoryStore::new();
    let graph = graph("app", "F");
    let edge = graph.edges()[0];

    let result = store.execute(&Statement::create_edge(&edge)).await;
    assert!(result.is_err());
    assert_eq!(store.edge_count().await, 0);
}
