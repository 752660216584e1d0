//! Node types for the program graph.
//!
//! A node is one of seven variants. Functions, globals, constants and types
//! form the [`Element`] subset: things a package owns and a file declares.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::NodeId;

// =============================================================================
// LABELS AND PROPERTIES
// =============================================================================

/// Variant tag of a node. Doubles as the store table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Program,
    Package,
    File,
    Function,
    Global,
    Const,
    Type,
}

impl NodeLabel {
    /// Every label.
    pub const ALL: [NodeLabel; 7] = [
        NodeLabel::Program,
        NodeLabel::Package,
        NodeLabel::File,
        NodeLabel::Global,
        NodeLabel::Const,
        NodeLabel::Function,
        NodeLabel::Type,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::Package => "Package",
            Self::File => "File",
            Self::Function => "Function",
            Self::Global => "Global",
            Self::Const => "Const",
            Self::Type => "Type",
        }
    }

    /// Natural-key fields that get a lookup index for this label.
    pub fn index_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Program => &["name", "uuid"],
            Self::Package => &["name", "path", "uuid"],
            Self::File => &["name", "path", "pkg", "uuid"],
            Self::Function | Self::Global | Self::Const | Self::Type => {
                &["name", "file", "pkg", "uuid"]
            }
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stored property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<&str>> for PropertyValue {
    fn from(value: Option<&str>) -> Self {
        Self::Text(value.unwrap_or_default().to_string())
    }
}

/// Ordered key/value property set, as written to the store.
pub type Properties = Vec<(&'static str, PropertyValue)>;

/// Source position of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// =============================================================================
// STRUCTURE NODES
// =============================================================================

/// The root every other node of a snapshot belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: NodeId,
    pub name: String,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
        }
    }
}

/// A package, keyed by its import path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: NodeId,
    pub name: String,
    pub path: String,
}

impl Package {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A source file, keyed by its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: NodeId,
    /// Base name of `path`.
    pub name: String,
    pub path: String,
    /// Import path of the owning package, when one claimed this file.
    pub package: Option<String>,
    pub lines: u32,
}

impl File {
    pub fn new(path: impl Into<String>, package: Option<String>, lines: u32) -> Self {
        let path = path.into();
        let name = std::path::Path::new(&path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&path)
            .to_string();

        Self {
            id: NodeId::new(),
            name,
            path,
            package,
            lines,
        }
    }
}

// =============================================================================
// ELEMENT NODES
// =============================================================================

/// A package-level function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: NodeId,
    pub name: String,
    pub package: Option<String>,
    /// Rendered type signature, e.g. `func(x int) error`.
    pub signature: String,
    pub file: Option<String>,
    pub position: Position,
    /// Name of the receiver type for methods. Not stored as a property;
    /// it only drives `Receive` edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

/// A package-level variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Global {
    pub id: NodeId,
    pub name: String,
    pub package: Option<String>,
    pub type_name: String,
    pub file: Option<String>,
    pub position: Position,
}

/// A named constant with its literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Const {
    pub id: NodeId,
    pub name: String,
    pub package: Option<String>,
    pub type_name: String,
    pub file: Option<String>,
    pub value: String,
    pub position: Position,
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: NodeId,
    pub name: String,
    pub package: Option<String>,
    /// Description of the underlying type, e.g. `struct{A int}`.
    pub underlying: String,
    pub file: Option<String>,
    /// `name:type` per struct field, in declaration order.
    pub fields: Vec<String>,
    pub methods: Vec<String>,
    pub position: Position,
}

/// The element subset of nodes: owned by a package, declared in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Function(Function),
    Global(Global),
    Const(Const),
    Type(TypeDecl),
}

impl Element {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Function(f) => f.id,
            Self::Global(g) => g.id,
            Self::Const(c) => c.id,
            Self::Type(t) => t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Function(f) => &f.name,
            Self::Global(g) => &g.name,
            Self::Const(c) => &c.name,
            Self::Type(t) => &t.name,
        }
    }

    pub fn label(&self) -> NodeLabel {
        match self {
            Self::Function(_) => NodeLabel::Function,
            Self::Global(_) => NodeLabel::Global,
            Self::Const(_) => NodeLabel::Const,
            Self::Type(_) => NodeLabel::Type,
        }
    }

    /// Import path of the owning package, if known.
    pub fn package_path(&self) -> Option<&str> {
        let package = match self {
            Self::Function(f) => &f.package,
            Self::Global(g) => &g.package,
            Self::Const(c) => &c.package,
            Self::Type(t) => &t.package,
        };
        package.as_deref()
    }

    /// Path of the file this element is declared in, if known.
    pub fn declaring_file(&self) -> Option<&str> {
        let file = match self {
            Self::Function(f) => &f.file,
            Self::Global(g) => &g.file,
            Self::Const(c) => &c.file,
            Self::Type(t) => &t.file,
        };
        file.as_deref()
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Function(f) => f.position,
            Self::Global(g) => g.position,
            Self::Const(c) => c.position,
            Self::Type(t) => t.position,
        }
    }

    fn properties(&self) -> Properties {
        let pkg = PropertyValue::from(self.package_path());
        let file = PropertyValue::from(self.declaring_file());
        let pos = PropertyValue::from(self.position().to_string());
        let name = PropertyValue::from(self.name());
        let uuid = PropertyValue::from(self.id().to_string());

        match self {
            Self::Function(f) => vec![
                ("name", name),
                ("pkg", pkg),
                ("sign", f.signature.as_str().into()),
                ("file", file),
                ("pos", pos),
                ("uuid", uuid),
            ],
            Self::Global(g) => vec![
                ("name", name),
                ("pkg", pkg),
                ("typ", g.type_name.as_str().into()),
                ("file", file),
                ("pos", pos),
                ("uuid", uuid),
            ],
            Self::Const(c) => vec![
                ("name", name),
                ("pkg", pkg),
                ("typ", c.type_name.as_str().into()),
                ("file", file),
                ("value", c.value.as_str().into()),
                ("pos", pos),
                ("uuid", uuid),
            ],
            Self::Type(t) => vec![
                ("name", name),
                ("pkg", pkg),
                ("underlying", t.underlying.as_str().into()),
                ("file", file),
                ("fields", PropertyValue::List(t.fields.clone())),
                ("methods", PropertyValue::List(t.methods.clone())),
                ("pos", pos),
                ("uuid", uuid),
            ],
        }
    }
}

// =============================================================================
// UNIFIED NODE
// =============================================================================

/// Any node of the program graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Program(Program),
    Package(Package),
    File(File),
    Element(Element),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Program(p) => p.id,
            Self::Package(p) => p.id,
            Self::File(f) => f.id,
            Self::Element(e) => e.id(),
        }
    }

    pub fn label(&self) -> NodeLabel {
        match self {
            Self::Program(_) => NodeLabel::Program,
            Self::Package(_) => NodeLabel::Package,
            Self::File(_) => NodeLabel::File,
            Self::Element(e) => e.label(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Properties in storage order. `uuid` is always last.
    pub fn properties(&self) -> Properties {
        match self {
            Self::Program(p) => vec![
                ("name", p.name.as_str().into()),
                ("uuid", p.id.to_string().into()),
            ],
            Self::Package(p) => vec![
                ("name", p.name.as_str().into()),
                ("path", p.path.as_str().into()),
                ("uuid", p.id.to_string().into()),
            ],
            Self::File(f) => vec![
                ("name", f.name.as_str().into()),
                ("path", f.path.as_str().into()),
                ("pkg", f.package.as_deref().into()),
                ("lines", PropertyValue::Integer(i64::from(f.lines))),
                ("uuid", f.id.to_string().into()),
            ],
            Self::Element(e) => e.properties(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Program> for Node {
    fn from(program: Program) -> Self {
        Self::Program(program)
    }
}

impl From<Package> for Node {
    fn from(package: Package) -> Self {
        Self::Package(package)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}
