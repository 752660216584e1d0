//! SurrealQL statement builder.
//!
//! Statements are built from typed graph values and rendered
//! deterministically. Every string literal goes through [`escape`], so
//! property values can never terminate their literal early.

use std::fmt;

use crate::graph::{Edge, Endpoint, Node, NodeId, NodeLabel, Properties, PropertyValue, RelationKind};

/// Marker thrown by an edge statement whose endpoint is missing.
pub const MISSING_ENDPOINT: &str = "edge endpoint not found";

/// Escape a raw string for use inside a single-quoted SurrealQL literal.
///
/// Double quotes pass through: they cannot close a single-quoted string, and
/// SurrealQL rejects `\"` as an escape there.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

fn literal(raw: &str) -> String {
    format!("'{}'", escape(raw))
}

fn ident(name: &str) -> String {
    format!("`{}`", name)
}

fn record(label: NodeLabel, id: NodeId) -> String {
    format!("type::thing({}, {})", literal(label.as_str()), literal(&id.to_string()))
}

fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Text(s) => literal(s),
        PropertyValue::Integer(n) => n.to_string(),
        PropertyValue::List(items) => {
            let items: Vec<String> = items.iter().map(|s| literal(s)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Render a property set as `{key: 'value', ...}`.
pub fn render_properties(properties: &Properties) -> String {
    let pairs: Vec<String> = properties
        .iter()
        .map(|(key, value)| format!("{}: {}", key, render_value(value)))
        .collect();
    format!("{{ {} }}", pairs.join(", "))
}

/// One write against the graph store.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Detach-delete the root named `program` and every node belonging to it.
    DeleteSnapshot { program: String },

    /// Create one node record.
    CreateNode {
        label: NodeLabel,
        id: NodeId,
        properties: Properties,
    },

    /// Look up both endpoints by id, then relate them.
    CreateEdge {
        kind: RelationKind,
        from: Endpoint,
        to: Endpoint,
    },
}

impl Statement {
    pub fn delete_snapshot(program: impl Into<String>) -> Self {
        Self::DeleteSnapshot {
            program: program.into(),
        }
    }

    pub fn create_node(node: &Node) -> Self {
        Self::CreateNode {
            label: node.label(),
            id: node.id(),
            properties: node.properties(),
        }
    }

    pub fn create_edge(edge: &Edge) -> Self {
        Self::CreateEdge {
            kind: edge.kind,
            from: edge.from,
            to: edge.to,
        }
    }

    /// Render as SurrealQL text.
    pub fn render(&self) -> String {
        match self {
            Self::DeleteSnapshot { program } => {
                let root = ident(NodeLabel::Program.as_str());
                let belong = ident(RelationKind::Belong.as_str());
                let name = literal(program);
                format!(
                    "LET $members = array::flatten((SELECT VALUE ->{belong}->? FROM {root} WHERE name = {name})); \
                     DELETE $members; \
                     DELETE {root} WHERE name = {name};"
                )
            }
            Self::CreateNode {
                label,
                id,
                properties,
            } => format!(
                "CREATE {} CONTENT {};",
                record(*label, *id),
                render_properties(properties)
            ),
            Self::CreateEdge { kind, from, to } => format!(
                "LET $from = {}; LET $to = {}; \
                 IF (SELECT VALUE id FROM $from) = [] OR (SELECT VALUE id FROM $to) = [] {{ THROW {}; }}; \
                 RELATE $from->{}->$to;",
                record(from.label, from.id),
                record(to.label, to.id),
                literal(&format!("{}: {} -> {}", MISSING_ENDPOINT, from.id, to.id)),
                ident(kind.as_str()),
            ),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A lookup index on one field of one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexSpec {
    pub label: NodeLabel,
    pub field: &'static str,
}

impl IndexSpec {
    pub fn new(label: NodeLabel, field: &'static str) -> Self {
        Self { label, field }
    }

    /// The fixed index set: every natural-key field of every label.
    pub fn all() -> Vec<IndexSpec> {
        NodeLabel::ALL
            .into_iter()
            .flat_map(|label| {
                label
                    .index_fields()
                    .iter()
                    .map(move |field| IndexSpec::new(label, *field))
            })
            .collect()
    }

    pub fn name(&self) -> String {
        format!("idx_{}_{}", self.label.as_str().to_lowercase(), self.field)
    }

    pub fn render(&self) -> String {
        format!(
            "DEFINE INDEX IF NOT EXISTS {} ON TABLE {} FIELDS {};",
            ident(&self.name()),
            ident(self.label.as_str()),
            ident(self.field)
        )
    }
}
