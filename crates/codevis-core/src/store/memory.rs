//! In-memory graph store.
//!
//! Interprets statements structurally instead of parsing SurrealQL, which
//! keeps it usable as a drop-in substitute wherever a [`GraphStore`] is
//! expected.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{GraphStore, IndexSpec, Statement, StoreError};
use crate::graph::{NodeId, NodeLabel, PropertyValue, RelationKind};

type StatementFault = Box<dyn Fn(&Statement) -> bool + Send + Sync>;
type IndexFault = Box<dyn Fn(&IndexSpec) -> bool + Send + Sync>;

/// A node record held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub id: NodeId,
    pub label: NodeLabel,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl StoredNode {
    /// Text value of a property.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(PropertyValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// An edge record held by [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredEdge {
    pub kind: RelationKind,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Default)]
struct MemoryState {
    nodes: HashMap<NodeId, StoredNode>,
    edges: Vec<StoredEdge>,
    indexes: BTreeSet<IndexSpec>,
    statements: usize,
}

/// Graph store backed by in-process collections.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    statement_fault: Option<StatementFault>,
    index_fault: Option<IndexFault>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every statement matching `predicate`.
    pub fn with_statement_fault(
        mut self,
        predicate: impl Fn(&Statement) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.statement_fault = Some(Box::new(predicate));
        self
    }

    /// Fail every index creation matching `predicate`.
    pub fn with_index_fault(
        mut self,
        predicate: impl Fn(&IndexSpec) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.index_fault = Some(Box::new(predicate));
        self
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.state.read().await.edges.len()
    }

    /// Number of statements that reached the store, failed ones included.
    pub async fn statement_count(&self) -> usize {
        self.state.read().await.statements
    }

    pub async fn node(&self, id: NodeId) -> Option<StoredNode> {
        self.state.read().await.nodes.get(&id).cloned()
    }

    pub async fn nodes(&self) -> Vec<StoredNode> {
        let state = self.state.read().await;
        let mut nodes: Vec<StoredNode> = state.nodes.values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    pub async fn nodes_labeled(&self, label: NodeLabel) -> Vec<StoredNode> {
        self.nodes()
            .await
            .into_iter()
            .filter(|n| n.label == label)
            .collect()
    }

    pub async fn edges(&self) -> Vec<StoredEdge> {
        self.state.read().await.edges.clone()
    }

    pub async fn indexes(&self) -> BTreeSet<IndexSpec> {
        self.state.read().await.indexes.clone()
    }

    fn delete_snapshot(state: &mut MemoryState, program: &str) {
        let roots: HashSet<NodeId> = state
            .nodes
            .values()
            .filter(|n| n.label == NodeLabel::Program && n.text("name") == Some(program))
            .map(|n| n.id)
            .collect();

        let mut doomed: HashSet<NodeId> = state
            .edges
            .iter()
            .filter(|e| e.kind == RelationKind::Belong && roots.contains(&e.from))
            .map(|e| e.to)
            .collect();
        doomed.extend(roots);

        state.nodes.retain(|id, _| !doomed.contains(id));
        state
            .edges
            .retain(|e| !doomed.contains(&e.from) && !doomed.contains(&e.to));
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn execute(&self, statement: &Statement) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.statements += 1;

        if self.statement_fault.as_ref().is_some_and(|f| f(statement)) {
            return Err(StoreError::Injected(statement.render()));
        }

        match statement {
            Statement::DeleteSnapshot { program } => {
                Self::delete_snapshot(&mut state, program);
            }
            Statement::CreateNode {
                label,
                id,
                properties,
            } => {
                if state.nodes.contains_key(id) {
                    return Err(StoreError::Query(format!("record {}:{} already exists", label, id)));
                }
                let properties = properties
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                state.nodes.insert(
                    *id,
                    StoredNode {
                        id: *id,
                        label: *label,
                        properties,
                    },
                );
            }
            Statement::CreateEdge { kind, from, to } => {
                let exists = |endpoint: &crate::graph::Endpoint| {
                    state
                        .nodes
                        .get(&endpoint.id)
                        .is_some_and(|n| n.label == endpoint.label)
                };
                if !exists(from) || !exists(to) {
                    return Err(StoreError::EndpointNotFound(format!("{} -> {}", from.id, to.id)));
                }
                state.edges.push(StoredEdge {
                    kind: *kind,
                    from: from.id,
                    to: to.id,
                });
            }
        }
        Ok(())
    }

    async fn ensure_index(&self, index: &IndexSpec) -> Result<(), StoreError> {
        if self.index_fault.as_ref().is_some_and(|f| f(index)) {
            return Err(StoreError::Injected(index.render()));
        }
        self.state.write().await.indexes.insert(*index);
        Ok(())
    }
}
