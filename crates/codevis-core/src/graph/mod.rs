//! The program graph: typed nodes, typed edges, and the immutable aggregate
//! a sync run persists.
//!
//! # Components
//!
//! - [`NodeId`] - identity assigned once at node construction
//! - [`Node`] / [`Element`] - the seven node variants
//! - [`Edge`] / [`RelationKind`] - directed relationships
//! - [`assemble`] - derives edges from normalized facts
//! - [`Graph`] - root, nodes and edges of one snapshot

mod assembler;
mod edges;
mod id;
mod nodes;

pub use assembler::assemble;
pub use edges::{Edge, Endpoint, RelationKind};
pub use id::NodeId;
pub use nodes::{
    Const, Element, File, Function, Global, Node, NodeLabel, Package, Position, Program,
    Properties, PropertyValue, TypeDecl,
};

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

/// One program snapshot. Never mutated after assembly.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    root: Program,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(crate) fn from_parts(root: Program, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { root, nodes, edges }
    }

    pub fn root(&self) -> &Program {
        &self.root
    }

    /// All nodes, root included (last).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Node counts per label and edge counts per kind.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in &self.nodes {
            *stats.nodes.entry(node.label()).or_default() += 1;
        }
        for edge in &self.edges {
            *stats.edges.entry(edge.kind).or_default() += 1;
        }
        stats
    }

    /// SHA-256 over the graph's shape with identifiers erased.
    ///
    /// Two graphs built from the same facts have equal fingerprints even
    /// though every id differs.
    pub fn fingerprint(&self) -> String {
        let keys: HashMap<NodeId, String> = self
            .nodes
            .iter()
            .map(|node| (node.id(), shape_key(node)))
            .collect();

        let mut lines: Vec<String> = keys.values().cloned().collect();
        lines.extend(self.edges.iter().map(|edge| {
            let from = keys.get(&edge.from.id).map(String::as_str).unwrap_or("?");
            let to = keys.get(&edge.to.id).map(String::as_str).unwrap_or("?");
            format!("{}|{}|{}", edge.kind, from, to)
        }));
        lines.sort();

        let mut hasher = Sha256::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Label plus every property except `uuid`.
fn shape_key(node: &Node) -> String {
    let props: Vec<String> = node
        .properties()
        .into_iter()
        .filter(|(key, _)| *key != "uuid")
        .map(|(key, value)| format!("{}={:?}", key, value))
        .collect();
    format!("{}{{{}}}", node.label(), props.join(","))
}

/// Summary counts of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: BTreeMap<NodeLabel, usize>,
    pub edges: BTreeMap<RelationKind, usize>,
}

impl GraphStats {
    pub fn node_count(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().sum()
    }
}
