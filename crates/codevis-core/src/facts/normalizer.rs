//! Converts raw analyzer facts into typed graph nodes.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::{AnalysisFacts, CallFact, ClassificationError, ElementFact};
use crate::graph::{Const, Element, File, Function, Global, Node, NodeId, Package, Position, TypeDecl};

/// Typed nodes keyed the way the assembler looks them up.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFacts {
    /// Files keyed by path.
    pub files: BTreeMap<String, File>,
    /// Packages keyed by import path.
    pub packages: BTreeMap<String, Package>,
    /// Declared elements in input order.
    pub elements: Vec<Element>,
    /// `(file path, imported package path)` pairs.
    pub imports: Vec<(String, String)>,
    pub calls: Vec<CallFact>,
    /// Facts that were dropped.
    pub rejected: Vec<ClassificationError>,
}

impl NormalizedFacts {
    /// Every normalized node: elements, then files, then packages.
    pub fn nodes(&self) -> Vec<Node> {
        self.elements
            .iter()
            .cloned()
            .map(Node::from)
            .chain(self.files.values().cloned().map(Node::from))
            .chain(self.packages.values().cloned().map(Node::from))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.elements.len() + self.files.len() + self.packages.len()
    }
}

struct PendingFile {
    lines: u32,
    package: Option<String>,
}

/// Normalize analyzer facts. Facts that cannot be classified are reported
/// in [`NormalizedFacts::rejected`] and excluded from the output.
pub fn normalize(facts: AnalysisFacts) -> NormalizedFacts {
    let mut out = NormalizedFacts::default();
    let mut pending: BTreeMap<String, PendingFile> = BTreeMap::new();

    for file in facts.files {
        if pending.contains_key(&file.path) {
            out.rejected.push(ClassificationError::DuplicateFile(file.path));
            continue;
        }
        out.imports
            .extend(file.imports.into_iter().map(|import| (file.path.clone(), import)));
        pending.insert(
            file.path,
            PendingFile {
                lines: file.lines,
                package: None,
            },
        );
    }

    for package in facts.packages {
        if out.packages.contains_key(&package.path) {
            out.rejected
                .push(ClassificationError::DuplicatePackage(package.path));
            continue;
        }

        for scope in &package.scopes {
            match pending.get_mut(scope) {
                Some(file) if file.package.is_none() => file.package = Some(package.path.clone()),
                Some(file) => debug!(
                    file = %scope,
                    owner = ?file.package,
                    claimed_by = %package.path,
                    "file already owned by another package"
                ),
                None => out.rejected.push(ClassificationError::UnknownScope {
                    package: package.path.clone(),
                    scope: scope.clone(),
                }),
            }
        }

        out.packages.insert(
            package.path.clone(),
            Package::new(package.name, package.path),
        );
    }

    out.files = pending
        .into_iter()
        .map(|(path, file)| {
            let node = File::new(path.clone(), file.package, file.lines);
            (path, node)
        })
        .collect();

    for fact in facts.elements {
        match classify(fact) {
            Ok(element) => out.elements.push(element),
            Err(e) => out.rejected.push(e),
        }
    }

    out.calls = facts.calls;

    for rejected in &out.rejected {
        warn!("Dropped fact: {}", rejected);
    }
    info!(
        files = out.files.len(),
        packages = out.packages.len(),
        elements = out.elements.len(),
        rejected = out.rejected.len(),
        "normalized analyzer facts"
    );

    out
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Whether an underlying type description denotes a struct.
fn is_product_type(underlying: &str) -> bool {
    underlying.trim_start().starts_with("struct")
}

fn classify(fact: ElementFact) -> Result<Element, ClassificationError> {
    let position = Position::new(fact.line, fact.column);
    let package = non_empty(fact.package);
    let file = non_empty(fact.file);

    let element = match fact.kind.as_str() {
        "function" | "func" => Element::Function(Function {
            id: NodeId::new(),
            name: fact.name,
            package,
            signature: fact.signature.unwrap_or_default(),
            file,
            position,
            receiver: fact.receiver.and_then(non_empty),
        }),
        "global" | "var" => Element::Global(Global {
            id: NodeId::new(),
            name: fact.name,
            package,
            type_name: fact.type_name.unwrap_or_default(),
            file,
            position,
        }),
        "const" => Element::Const(Const {
            id: NodeId::new(),
            name: fact.name,
            package,
            type_name: fact.type_name.unwrap_or_default(),
            file,
            value: fact.value.unwrap_or_default(),
            position,
        }),
        "type" => {
            let underlying = fact.underlying.unwrap_or_default();
            let fields = if is_product_type(&underlying) {
                fact.fields
                    .into_iter()
                    .map(|f| format!("{}:{}", f.name, f.type_name))
                    .collect()
            } else {
                Vec::new()
            };

            Element::Type(TypeDecl {
                id: NodeId::new(),
                name: fact.name,
                package,
                underlying,
                file,
                fields,
                methods: fact.methods,
                position,
            })
        }
        _ => {
            return Err(ClassificationError::UnknownKind {
                kind: fact.kind,
                name: fact.name,
            })
        }
    };

    Ok(element)
}
