use std::fs;

use codevis_core::graph::NodeLabel;
use codevis_core::{Config, MemoryStore, Pipeline, PipelineError};
use tempfile::TempDir;

const FACTS: &str = r#"{
    "files": [
        { "path": "a.go", "lines": 3 },
        { "path": "b.go", "lines": 9 }
    ],
    "packages": [{ "name": "pkg", "path": "pkg", "scopes": ["a.go", "b.go"] }],
    "elements": [
        { "kind": "function", "name": "F", "package": "pkg", "file": "a.go",
          "line": 1, "column": 6, "signature": "func()" },
        { "kind": "const", "name": "Limit", "package": "pkg", "file": "b.go",
          "type": "int", "value": "10" },
        { "kind": "label", "name": "retry" }
    ]
}"#;

fn workspace(facts: &str) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("facts.json"), facts).unwrap();

    let mut config = Config::default();
    config.analysis.dir = dir.path().to_string_lossy().into_owned();
    config.analysis.program = Some("app".into());
    config.sync.report_interval_ms = 10;
    (dir, config)
}

#[test]
fn test_offline_prepare() {
    let (_dir, config) = workspace(FACTS);
    let pipeline = Pipeline::offline(config).unwrap();

    let prepared = pipeline.prepare().unwrap();
    assert_eq!(prepared.graph.root().name, "app");
    // F, Limit, two files, one package, root
    assert_eq!(prepared.graph.nodes().len(), 6);
    assert_eq!(prepared.rejected.len(), 1);
}

#[test]
fn test_new_requires_store_credentials() {
    let (_dir, config) = workspace(FACTS);
    assert!(matches!(
        Pipeline::new(config),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn test_missing_facts_fail_before_writing() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.analysis.dir = dir.path().to_string_lossy().into_owned();
    let pipeline = Pipeline::offline(config).unwrap();

    assert!(matches!(pipeline.prepare(), Err(PipelineError::Facts(_))));
}

#[tokio::test]
async fn test_run_into_memory_store() {
    let (_dir, config) = workspace(FACTS);
    let pipeline = Pipeline::offline(config).unwrap();
    let store = MemoryStore::new();

    let report = pipeline.run(&store).await.unwrap();

    assert!(report.sync.is_clean());
    assert!(!report.is_clean());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.sync.program, "app");
    assert_eq!(report.sync.write.nodes_written, 6);
    assert_eq!(store.node_count().await, 6);
    assert_eq!(store.nodes_labeled(NodeLabel::Const).await.len(), 1);
}

#[tokio::test]
async fn test_rerun_keeps_one_snapshot() {
    let (_dir, config) = workspace(FACTS);
    let pipeline = Pipeline::offline(config).unwrap();
    let store = MemoryStore::new();

    let first = pipeline.run(&store).await.unwrap();
    let second = pipeline.run(&store).await.unwrap();

    assert_eq!(first.sync.fingerprint, second.sync.fingerprint);
    assert_eq!(store.node_count().await, 6);
    assert_eq!(store.nodes_labeled(NodeLabel::Program).await.len(), 1);
    assert_eq!(store.edge_count().await, second.sync.write.edges_written);
}
