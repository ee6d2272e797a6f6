use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use std::collections::HashMap;

/// Where a `$ref` points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget<'a> {
    /// JSON pointer into the same document (`#/components/...`), without the `#`
    Internal(&'a str),
    /// http(s) URL
    Remote(&'a str),
    /// Another file, optionally with a fragment
    File(&'a str),
}

impl<'a> RefTarget<'a> {
    pub fn parse(reference: &'a str) -> Self {
        if let Some(pointer) = reference.strip_prefix('#') {
            RefTarget::Internal(pointer)
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            RefTarget::Remote(reference)
        } else {
            RefTarget::File(reference)
        }
    }
}

/// The `$ref` string of a reference object, if `node` is one
pub fn ref_of(node: &Value) -> Option<&str> {
    node.as_object()?.get("$ref")?.as_str()
}

/// Look up an internal JSON pointer (already stripped of `#`)
pub fn lookup_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }
    root.pointer(pointer)
        .or_else(|| root.pointer(&percent_decode(pointer)))
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(byte) = text
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Outcome of inlining every internal reference
#[derive(Debug, Clone)]
pub struct Resolution {
    pub value: Value,
    /// Internal pointers that could not be found
    pub broken: Vec<String>,
}

/// Inline internal `$ref`s. Remote and file references stay as markers.
///
/// A reference back into a target that is already being expanded is left in
/// place, so cyclic schemas are expanded exactly once.
pub fn resolve_refs(root: &Value) -> Resolution {
    let mut resolver = Resolver {
        root,
        stack: Vec::new(),
        broken: Vec::new(),
    };
    let value = resolver.resolve(root);
    Resolution {
        value,
        broken: resolver.broken,
    }
}

struct Resolver<'a> {
    root: &'a Value,
    stack: Vec<String>,
    broken: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, node: &Value) -> Value {
        if let Some(reference) = ref_of(node) {
            let RefTarget::Internal(pointer) = RefTarget::parse(reference) else {
                return node.clone();
            };
            if self.stack.iter().any(|p| p == pointer) {
                tracing::debug!(reference, "circular reference left unexpanded");
                return node.clone();
            }
            let Some(target) = lookup_pointer(self.root, pointer) else {
                if !self.broken.iter().any(|b| b == reference) {
                    tracing::warn!(reference, "reference target not found");
                    self.broken.push(reference.to_string());
                }
                return node.clone();
            };
            self.stack.push(pointer.to_string());
            let resolved = self.resolve(target);
            self.stack.pop();
            return resolved;
        }

        match node {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), self.resolve(child)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.resolve(item)).collect()),
            other => other.clone(),
        }
    }
}

fn collect_internal_refs<'a>(node: &'a Value, out: &mut Vec<&'a str>) {
    if let Some(reference) = ref_of(node)
        && let RefTarget::Internal(pointer) = RefTarget::parse(reference)
    {
        out.push(pointer);
    }
    match node {
        Value::Object(map) => map.values().for_each(|child| collect_internal_refs(child, out)),
        Value::Array(items) => items.iter().for_each(|child| collect_internal_refs(child, out)),
        _ => {}
    }
}

/// Internal reference targets that take part in a reference cycle, as sorted
/// `#` pointers.
pub fn circular_refs(root: &Value) -> Vec<String> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    let mut pending = Vec::new();
    collect_internal_refs(root, &mut pending);

    let mut seen_order = Vec::new();
    while let Some(pointer) = pending.pop() {
        if nodes.contains_key(pointer) {
            continue;
        }
        let index = graph.add_node(pointer.to_string());
        nodes.insert(pointer.to_string(), index);
        seen_order.push(pointer.to_string());
        if let Some(target) = lookup_pointer(root, pointer) {
            let mut inner = Vec::new();
            collect_internal_refs(target, &mut inner);
            pending.extend(inner);
        }
    }

    for pointer in &seen_order {
        let Some(target) = lookup_pointer(root, pointer) else {
            continue;
        };
        let mut inner = Vec::new();
        collect_internal_refs(target, &mut inner);
        for next in inner {
            if let (Some(&from), Some(&to)) = (nodes.get(pointer.as_str()), nodes.get(next)) {
                graph.update_edge(from, to, ());
            }
        }
    }

    let mut circular: Vec<String> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .flatten()
        .map(|index| format!("#{}", graph[index]))
        .collect();
    circular.sort();
    circular
}
