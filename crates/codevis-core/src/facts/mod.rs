//! Analyzer facts: the raw input of a sync run.
//!
//! The upstream analyzer writes one or more JSON documents describing the
//! files, packages and declared elements of a program. A document looks like:
//!
//! ```json
//! {
//!   "files": [{ "path": "/src/app/a.go", "lines": 3 }],
//!   "packages": [{ "name": "app", "path": "example.com/app", "scopes": ["/src/app/a.go"] }],
//!   "elements": [{ "kind": "function", "name": "F", "package": "example.com/app",
//!                  "file": "/src/app/a.go", "line": 1, "column": 6, "signature": "func()" }],
//!   "calls": []
//! }
//! ```

mod error;
mod normalizer;

pub use error::{ClassificationError, FactError};
pub use normalizer::{normalize, NormalizedFacts};

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of facts documents when loading from a directory.
pub const FACTS_SUFFIX: &str = ".facts.json";

/// A complete set of analyzer facts for one program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisFacts {
    pub files: Vec<FileFact>,
    pub packages: Vec<PackageFact>,
    pub elements: Vec<ElementFact>,
    pub calls: Vec<CallFact>,
}

/// A source file and its line count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileFact {
    pub path: String,
    #[serde(default)]
    pub lines: u32,
    /// Import paths of packages this file imports.
    #[serde(default)]
    pub imports: Vec<String>,
}

/// A package and the file scopes it owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageFact {
    pub name: String,
    pub path: String,
    /// Child-scope identifiers; each resolves to a file path.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// A declared package member. `kind` selects which payload fields apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementFact {
    pub kind: String,
    pub name: String,
    pub package: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Function signature.
    pub signature: Option<String>,
    /// Declared type of a global or constant.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Literal value of a constant.
    pub value: Option<String>,
    /// Underlying type description of a named type.
    pub underlying: Option<String>,
    pub fields: Vec<FieldFact>,
    pub methods: Vec<String>,
    /// Receiver type name of a method.
    pub receiver: Option<String>,
}

/// One field of a struct type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldFact {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A caller/callee pair from the call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFact {
    pub caller: SymbolRef,
    pub callee: SymbolRef,
}

/// A package-qualified symbol name. Methods also carry their receiver type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolRef {
    pub package: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl SymbolRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            receiver: None,
        }
    }

    /// A method `name` on `receiver` (`T` or `*T`).
    pub fn method(
        package: impl Into<String>,
        receiver: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            receiver: Some(receiver.into()),
            ..Self::new(package, name)
        }
    }
}

impl AnalysisFacts {
    /// Load facts from a document, or from every `*.facts.json` under a directory.
    pub fn load(path: &Path) -> Result<Self, FactError> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Parse a single facts document.
    pub fn from_file(path: &Path) -> Result<Self, FactError> {
        let content = std::fs::read_to_string(path).map_err(|e| FactError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| FactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge every facts document found under `dir`, in path order.
    pub fn load_dir(dir: &Path) -> Result<Self, FactError> {
        let mut documents: Vec<PathBuf> = Vec::new();

        for entry in WalkBuilder::new(dir).build() {
            let entry = entry.map_err(|e| FactError::Walk {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let is_facts = entry
                .file_name()
                .to_str()
                .map(|n| n.ends_with(FACTS_SUFFIX))
                .unwrap_or(false);

            if is_file && is_facts {
                documents.push(entry.into_path());
            }
        }

        if documents.is_empty() {
            return Err(FactError::NoFacts(dir.to_path_buf()));
        }
        documents.sort();

        let mut merged = Self::default();
        for document in &documents {
            debug!(path = %document.display(), "loading facts document");
            merged.merge(Self::from_file(document)?);
        }
        Ok(merged)
    }

    /// Append every fact of `other`.
    pub fn merge(&mut self, other: AnalysisFacts) {
        self.files.extend(other.files);
        self.packages.extend(other.packages);
        self.elements.extend(other.elements);
        self.calls.extend(other.calls);
    }
}
