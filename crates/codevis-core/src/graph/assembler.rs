//! Derives relationship edges from normalized facts and builds the graph.

use std::collections::HashMap;

use tracing::{debug, info};

use super::{Edge, Element, Function, Graph, Node, Program, TypeDecl};
use crate::facts::{NormalizedFacts, SymbolRef};

/// Assemble the snapshot graph for `program`.
///
/// Total on well-formed input: links whose endpoints cannot be resolved are
/// dropped rather than reported, so every edge references a node in the
/// returned graph.
pub fn assemble(program: impl Into<String>, facts: NormalizedFacts) -> Graph {
    let NormalizedFacts {
        files,
        packages,
        elements,
        imports,
        calls,
        ..
    } = facts;

    let mut edges = Vec::new();

    for element in &elements {
        if let Some(file) = element.declaring_file().and_then(|path| files.get(path)) {
            edges.push(Edge::declare(file, element));
        }
        if let Some(package) = element.package_path().and_then(|path| packages.get(path)) {
            edges.push(Edge::contains_element(package, element));
        }
    }

    for file in files.values() {
        if let Some(package) = file.package.as_deref().and_then(|path| packages.get(path)) {
            edges.push(Edge::contains_file(package, file));
        }
    }

    // Extension links: imports, calls and method receivers.
    for (path, import) in &imports {
        match (files.get(path), packages.get(import)) {
            (Some(file), Some(package)) => edges.push(Edge::import(file, package)),
            _ => debug!(file = %path, import = %import, "unresolved import"),
        }
    }

    let functions = function_index(&elements);

    for call in &calls {
        let caller = resolve(&functions, &call.caller);
        let callee = resolve(&functions, &call.callee);
        match (caller, callee) {
            (Some(caller), Some(callee)) => edges.push(Edge::call(caller, callee)),
            _ => debug!(caller = ?call.caller, callee = ?call.callee, "unresolved call"),
        }
    }

    let types: HashMap<(&str, &str), &TypeDecl> = elements
        .iter()
        .filter_map(|e| match e {
            Element::Type(t) => Some(((t.package.as_deref().unwrap_or(""), t.name.as_str()), t)),
            _ => None,
        })
        .collect();

    for element in &elements {
        let Element::Function(function) = element else {
            continue;
        };
        let Some(receiver) = function.receiver.as_deref() else {
            continue;
        };
        let key = (
            function.package.as_deref().unwrap_or(""),
            base_type(receiver),
        );
        match types.get(&key) {
            Some(ty) => edges.push(Edge::receive(ty, function)),
            None => debug!(method = %function.name, receiver = %receiver, "unresolved receiver"),
        }
    }

    let mut nodes: Vec<Node> = elements
        .into_iter()
        .map(Node::from)
        .chain(files.into_values().map(Node::from))
        .chain(packages.into_values().map(Node::from))
        .collect();

    let root = Program::new(program);
    edges.extend(nodes.iter().map(|node| Edge::belong(&root, node)));
    nodes.push(Node::from(root.clone()));

    info!(
        program = %root.name,
        nodes = nodes.len(),
        edges = edges.len(),
        "assembled program graph"
    );

    Graph::from_parts(root, nodes, edges)
}

/// `(package, receiver type, name)`; the receiver is empty for plain functions.
type FunctionKey<'a> = (&'a str, &'a str, &'a str);

fn base_type(receiver: &str) -> &str {
    receiver.trim_start_matches('*')
}

/// Functions by call key. A key shared by several functions maps to `None`.
fn function_index(elements: &[Element]) -> HashMap<FunctionKey<'_>, Option<&Function>> {
    let mut index: HashMap<FunctionKey<'_>, Option<&Function>> = HashMap::new();
    for element in elements {
        let Element::Function(function) = element else {
            continue;
        };
        let key = (
            function.package.as_deref().unwrap_or(""),
            function.receiver.as_deref().map(base_type).unwrap_or(""),
            function.name.as_str(),
        );
        index
            .entry(key)
            .and_modify(|slot| {
                debug!(package = key.0, receiver = key.1, name = key.2, "ambiguous function key");
                *slot = None;
            })
            .or_insert(Some(function));
    }
    index
}

fn resolve<'a>(
    index: &HashMap<FunctionKey<'_>, Option<&'a Function>>,
    symbol: &SymbolRef,
) -> Option<&'a Function> {
    let key = (
        symbol.package.as_str(),
        symbol.receiver.as_deref().map(base_type).unwrap_or(""),
        symbol.name.as_str(),
    );
    index.get(&key).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{normalize, AnalysisFacts, CallFact, ElementFact, FileFact, PackageFact, SymbolRef};
    use crate::graph::RelationKind;

    fn function(name: &str, receiver: Option<&str>) -> ElementFact {
        ElementFact {
            kind: "function".into(),
            name: name.into(),
            package: "pkg".into(),
            file: "a.go".into(),
            signature: Some("func()".into()),
            receiver: receiver.map(String::from),
            ..Default::default()
        }
    }

    fn count(graph: &Graph, kind: RelationKind) -> usize {
        graph.edges().iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn test_extension_edges() {
        let facts = AnalysisFacts {
            files: vec![FileFact {
                path: "a.go".into(),
                lines: 10,
                imports: vec!["fmt".into(), "not/loaded".into()],
            }],
            packages: vec![
                PackageFact {
                    name: "pkg".into(),
                    path: "pkg".into(),
                    scopes: vec!["a.go".into()],
                },
                PackageFact {
                    name: "fmt".into(),
                    path: "fmt".into(),
                    scopes: vec![],
                },
            ],
            elements: vec![
                function("Run", None),
                function("Close", Some("*Server")),
                ElementFact {
                    kind: "type".into(),
                    name: "Server".into(),
                    package: "pkg".into(),
                    file: "a.go".into(),
                    underlying: Some("struct{}".into()),
                    ..Default::default()
                },
            ],
            calls: vec![
                CallFact {
                    caller: SymbolRef::new("pkg", "Run"),
                    callee: SymbolRef::method("pkg", "*Server", "Close"),
                },
                CallFact {
                    caller: SymbolRef::new("pkg", "Run"),
                    callee: SymbolRef::new("fmt", "Println"),
                },
            ],
        };

        let graph = assemble("app", normalize(facts));
        assert_eq!(count(&graph, RelationKind::Import), 1);
        assert_eq!(count(&graph, RelationKind::Call), 1);
        assert_eq!(count(&graph, RelationKind::Receive), 1);
    }

    fn server_and_client() -> AnalysisFacts {
        let ty = |name: &str| ElementFact {
            kind: "type".into(),
            name: name.into(),
            package: "pkg".into(),
            file: "a.go".into(),
            underlying: Some("struct{}".into()),
            ..Default::default()
        };
        AnalysisFacts {
            files: vec![FileFact {
                path: "a.go".into(),
                lines: 30,
                imports: vec![],
            }],
            packages: vec![PackageFact {
                name: "pkg".into(),
                path: "pkg".into(),
                scopes: vec!["a.go".into()],
            }],
            elements: vec![
                function("Run", None),
                function("Close", Some("*Server")),
                function("Close", Some("*Client")),
                ty("Server"),
                ty("Client"),
            ],
            calls: vec![],
        }
    }

    fn function_id(graph: &Graph, name: &str, receiver: &str) -> crate::graph::NodeId {
        graph
            .nodes()
            .iter()
            .find_map(|n| match n.as_element() {
                Some(Element::Function(f)) if f.name == name && f.receiver.as_deref() == Some(receiver) => {
                    Some(f.id)
                }
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_calls_resolve_methods_by_receiver() {
        let mut facts = server_and_client();
        facts.calls = vec![
            CallFact {
                caller: SymbolRef::new("pkg", "Run"),
                callee: SymbolRef::method("pkg", "*Client", "Close"),
            },
            CallFact {
                caller: SymbolRef::new("pkg", "Run"),
                callee: SymbolRef::method("pkg", "Server", "Close"),
            },
            // A bare name does not pick one of the methods.
            CallFact {
                caller: SymbolRef::new("pkg", "Run"),
                callee: SymbolRef::new("pkg", "Close"),
            },
        ];

        let graph = assemble("app", normalize(facts));
        let targets: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == RelationKind::Call)
            .map(|e| e.to.id)
            .collect();

        assert_eq!(
            targets,
            vec![
                function_id(&graph, "Close", "*Client"),
                function_id(&graph, "Close", "*Server"),
            ]
        );
        assert_eq!(count(&graph, RelationKind::Receive), 2);
    }

    #[test]
    fn test_ambiguous_function_key_is_not_linked() {
        let mut facts = server_and_client();
        facts.elements.push(function("Run", None));
        facts.calls = vec![
            CallFact {
                caller: SymbolRef::new("pkg", "Run"),
                callee: SymbolRef::method("pkg", "*Server", "Close"),
            },
            CallFact {
                caller: SymbolRef::method("pkg", "*Server", "Close"),
                callee: SymbolRef::new("pkg", "Run"),
            },
        ];

        let graph = assemble("app", normalize(facts));
        assert_eq!(count(&graph, RelationKind::Call), 0);
    }

    #[test]
    fn test_root_is_last_node() {
        let graph = assemble("app", NormalizedFacts::default());
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.nodes()[0].id(), graph.root().id);
    }
}
