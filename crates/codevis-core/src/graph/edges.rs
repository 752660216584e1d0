//! Edge types (relationships) for the program graph.
//!
//! - **Contains**: Package → File, Package → Element
//! - **Declare**: File → Element
//! - **Belong**: Program → every other node
//! - **Call**: Function → Function
//! - **Import**: File → Package
//! - **Receive**: Type → Function (method receiver)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use super::nodes::{Element, File, Function, Node, NodeLabel, Package, Program, TypeDecl};

/// Relationship kind. Doubles as the store's relation table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    Contains,
    Declare,
    Call,
    Import,
    Receive,
    Belong,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::Contains,
        RelationKind::Declare,
        RelationKind::Call,
        RelationKind::Import,
        RelationKind::Receive,
        RelationKind::Belong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "Contains",
            Self::Declare => "Declare",
            Self::Call => "Call",
            Self::Import => "Import",
            Self::Receive => "Receive",
            Self::Belong => "Belong",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of an edge. The label is carried so the store can address the
/// record without a lookup by id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: NodeId,
    pub label: NodeLabel,
}

impl Endpoint {
    pub fn new(id: NodeId, label: NodeLabel) -> Self {
        Self { id, label }
    }
}

impl From<&Node> for Endpoint {
    fn from(node: &Node) -> Self {
        Self::new(node.id(), node.label())
    }
}

impl From<&Element> for Endpoint {
    fn from(element: &Element) -> Self {
        Self::new(element.id(), element.label())
    }
}

impl From<&Program> for Endpoint {
    fn from(program: &Program) -> Self {
        Self::new(program.id, NodeLabel::Program)
    }
}

impl From<&Package> for Endpoint {
    fn from(package: &Package) -> Self {
        Self::new(package.id, NodeLabel::Package)
    }
}

impl From<&File> for Endpoint {
    fn from(file: &File) -> Self {
        Self::new(file.id, NodeLabel::File)
    }
}

impl From<&Function> for Endpoint {
    fn from(function: &Function) -> Self {
        Self::new(function.id, NodeLabel::Function)
    }
}

impl From<&TypeDecl> for Endpoint {
    fn from(ty: &TypeDecl) -> Self {
        Self::new(ty.id, NodeLabel::Type)
    }
}

/// A directed relationship between two nodes.
///
/// Constructors take the concrete endpoint types so an edge of a given kind
/// can only connect the node kinds it is defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub kind: RelationKind,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Edge {
    /// Package owns a file.
    pub fn contains_file(package: &Package, file: &File) -> Self {
        Self::new(RelationKind::Contains, package.into(), file.into())
    }

    /// Package owns a declared element.
    pub fn contains_element(package: &Package, element: &Element) -> Self {
        Self::new(RelationKind::Contains, package.into(), element.into())
    }

    /// File is the declaration site of an element.
    pub fn declare(file: &File, element: &Element) -> Self {
        Self::new(RelationKind::Declare, file.into(), element.into())
    }

    /// Node belongs to the snapshot root.
    pub fn belong(root: &Program, node: &Node) -> Self {
        Self::new(RelationKind::Belong, root.into(), node.into())
    }

    pub fn call(caller: &Function, callee: &Function) -> Self {
        Self::new(RelationKind::Call, caller.into(), callee.into())
    }

    pub fn import(file: &File, package: &Package) -> Self {
        Self::new(RelationKind::Import, file.into(), package.into())
    }

    /// Type is the receiver of a method.
    pub fn receive(receiver: &TypeDecl, method: &Function) -> Self {
        Self::new(RelationKind::Receive, receiver.into(), method.into())
    }

    fn new(kind: RelationKind, from: Endpoint, to: Endpoint) -> Self {
        Self { kind, from, to }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}->{}", self.from.id, self.kind, self.to.id)
    }
}
