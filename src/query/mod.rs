//! Node selection over a document tree.
//!
//! A [`Selector`] is a JSONPath-like expression compiled once into a list of
//! [`Step`]s and then interpreted against any number of documents. Selection
//! is deterministic: nodes come back in document order, descendants in
//! pre-order.
//!
//! ```text
//! $.paths[*][?(@key == 'get')].responses
//! $.paths.*~
//! $..parameters[?(@.in == 'header')]
//! $.paths[*][*].responses[?(@key =~ /^[45]\d\d$/)]
//! ```

mod ast;
mod parser;

pub use ast::{Candidate, CompareOp, Expr, Operand, Step, is_truthy};

use crate::error::Result;
use crate::models::path::{DocPath, PathSegment};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A compiled selector expression
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    steps: Vec<Step>,
}

/// A node picked by a selector, with its absolute path
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<'a> {
    pub value: Cow<'a, Value>,
    pub path: DocPath,
}

/// Intermediate selection state. Keys produced by `~` are leaves.
enum Cursor<'a> {
    Node(&'a Value, DocPath),
    Key(String, DocPath),
}

impl Selector {
    /// Compile a selector; malformed expressions are configuration errors
    pub fn parse(source: &str) -> Result<Self> {
        let steps = parser::Parser::new(source).parse()?;
        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Evaluate against `root`. No match yields an empty list.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<Selected<'a>> {
        let mut cursors = vec![Cursor::Node(root, Vec::new())];
        for step in &self.steps {
            cursors = cursors
                .into_iter()
                .flat_map(|cursor| apply_step(step, cursor))
                .collect();
            if cursors.is_empty() {
                break;
            }
        }
        cursors
            .into_iter()
            .map(|cursor| match cursor {
                Cursor::Node(value, path) => Selected {
                    value: Cow::Borrowed(value),
                    path,
                },
                Cursor::Key(key, path) => Selected {
                    value: Cow::Owned(Value::String(key)),
                    path,
                },
            })
            .collect()
    }
}

impl FromStr for Selector {
    type Err = crate::error::LintError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn child_path(path: &[PathSegment], segment: PathSegment) -> DocPath {
    let mut child = path.to_vec();
    child.push(segment);
    child
}

fn apply_step<'a>(step: &Step, cursor: Cursor<'a>) -> Vec<Cursor<'a>> {
    let (node, path) = match cursor {
        Cursor::Node(node, path) => (node, path),
        // nothing lives below a key
        Cursor::Key(..) => return Vec::new(),
    };

    match step {
        Step::Member(name) => node
            .as_object()
            .and_then(|map| map.get(name))
            .map(|child| vec![Cursor::Node(child, child_path(&path, name.as_str().into()))])
            .unwrap_or_default(),
        Step::Index(index) => node
            .as_array()
            .and_then(|items| items.get(*index))
            .map(|child| vec![Cursor::Node(child, child_path(&path, PathSegment::Index(*index)))])
            .unwrap_or_default(),
        Step::Wildcard => children(node, &path)
            .into_iter()
            .map(|(_, child, child_path)| Cursor::Node(child, child_path))
            .collect(),
        Step::Filter(expr) => children(node, &path)
            .into_iter()
            .filter(|(key, child, _)| {
                expr.eval(&Candidate {
                    key: key.as_str(),
                    value: child,
                })
            })
            .map(|(_, child, child_path)| Cursor::Node(child, child_path))
            .collect(),
        Step::Keys => match path.last() {
            Some(segment) => vec![Cursor::Key(segment.to_string(), path)],
            None => Vec::new(),
        },
        Step::Descendant(inner) => {
            let mut nodes = Vec::new();
            collect_descendants(node, path, &mut nodes);
            nodes
                .into_iter()
                .flat_map(|(node, path)| apply_step(inner, Cursor::Node(node, path)))
                .collect()
        }
    }
}

fn children<'a>(node: &'a Value, path: &[PathSegment]) -> Vec<(String, &'a Value, DocPath)> {
    match node {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| (key.clone(), child, child_path(path, key.as_str().into())))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, child)| (i.to_string(), child, child_path(path, PathSegment::Index(i))))
            .collect(),
        _ => Vec::new(),
    }
}

/// The node itself followed by all descendants in pre-order
fn collect_descendants<'a>(node: &'a Value, path: DocPath, out: &mut Vec<(&'a Value, DocPath)>) {
    let kids = children(node, &path);
    out.push((node, path));
    for (_, child, child_path) in kids {
        collect_descendants(child, child_path, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::path::doc_path;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "paths": {
                "/users": {
                    "parameters": [{"name": "X-Trace", "in": "header"}],
                    "get": {
                        "parameters": [
                            {"name": "max", "in": "query"},
                            {"name": "offset", "in": "query"}
                        ],
                        "responses": {"200": {"description": "OK"}, "404": {"description": "Not Found"}}
                    },
                    "post": {
                        "deprecated": true,
                        "responses": {"201": {"description": "Created"}}
                    }
                },
                "/users/{id}": {
                    "delete": {"responses": {"204": {"description": "No Content"}}}
                }
            }
        })
    }

    fn paths_of(selector: &str, root: &Value) -> Vec<Vec<String>> {
        Selector::parse(selector)
            .unwrap()
            .select(root)
            .into_iter()
            .map(|s| s.path.iter().map(|p| p.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_member_and_wildcard() {
        let root = doc();
        let found = paths_of("$.paths[*][*].responses", &root);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], vec!["paths", "/users", "get", "responses"]);
        assert_eq!(found[1], vec!["paths", "/users", "post", "responses"]);
        assert_eq!(found[2], vec!["paths", "/users/{id}", "delete", "responses"]);
    }

    #[test]
    fn test_filter_on_key() {
        let root = doc();
        let found = paths_of("$.paths.*[?(@key == 'get')].responses", &root);
        assert_eq!(found, vec![vec!["paths", "/users", "get", "responses"]]);

        let spectral_style = paths_of("$.paths.*[?(@property === 'post')]", &root);
        assert_eq!(spectral_style, vec![vec!["paths", "/users", "post"]]);
    }

    #[test]
    fn test_filter_on_status_pattern() {
        let root = doc();
        let found = paths_of("$.paths[*][*].responses[?(@key =~ /^[45]\\d\\d$/)]", &root);
        assert_eq!(found, vec![vec!["paths", "/users", "get", "responses", "404"]]);
    }

    #[test]
    fn test_filter_on_nested_truthy() {
        let root = doc();
        let found = paths_of("$.paths[*][?(@.deprecated)]", &root);
        assert_eq!(found, vec![vec!["paths", "/users", "post"]]);

        let negated = paths_of("$.paths[*][?(!@.deprecated && @key != 'parameters')]", &root);
        assert_eq!(
            negated,
            vec![
                vec!["paths", "/users", "get"],
                vec!["paths", "/users/{id}", "delete"]
            ]
        );
    }

    #[test]
    fn test_filter_in_list_and_sequence_items() {
        let root = doc();
        let found = paths_of("$.paths[*][*].parameters[?(@.name in ['max', 'limit'])]", &root);
        assert_eq!(found, vec![vec!["paths", "/users", "get", "parameters", "0"]]);
    }

    #[test]
    fn test_keys_yield_key_strings() {
        let root = doc();
        let selected = Selector::parse("$.paths.*~").unwrap().select(&root);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].value.as_ref(), &json!("/users"));
        assert_eq!(selected[0].path, doc_path(["paths", "/users"]));
        assert_eq!(selected[1].value.as_ref(), &json!("/users/{id}"));
    }

    #[test]
    fn test_recursive_descent_preorder() {
        let root = doc();
        let found = paths_of("$..parameters", &root);
        assert_eq!(
            found,
            vec![
                vec!["paths", "/users", "parameters"],
                vec!["paths", "/users", "get", "parameters"]
            ]
        );
        let headers = paths_of("$..parameters[?(@.in == 'header')]", &root);
        assert_eq!(headers, vec![vec!["paths", "/users", "parameters", "0"]]);
    }

    #[test]
    fn test_index_and_quoted_member() {
        let root = doc();
        let found = paths_of("$.paths['/users'].get.parameters[1].name", &root);
        assert_eq!(found, vec![vec!["paths", "/users", "get", "parameters", "1", "name"]]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let root = doc();
        assert!(paths_of("$.components.schemas[*]", &root).is_empty());
        assert!(paths_of("$.paths.*~.get", &root).is_empty());
    }

    #[test]
    fn test_root_selector() {
        let root = doc();
        let selected = Selector::parse("$").unwrap().select(&root);
        assert_eq!(selected.len(), 1);
        assert!(selected[0].path.is_empty());
    }

    #[test]
    fn test_malformed_selectors() {
        for bad in [
            "paths",
            "$.paths[",
            "$.paths[?(@key == )]",
            "$.paths[?(@key =~ /[/)]",
            "$.paths[?(@key == 'get']",
            "$.paths[?(foo)]",
            "$.",
        ] {
            assert!(Selector::parse(bad).is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_selection_is_repeatable() {
        let root = doc();
        let selector = Selector::parse("$..responses[*]").unwrap();
        assert_eq!(selector.select(&root), selector.select(&root));
    }
}
