use crate::models::path::{DocPath, PathSegment};
use serde_json::Value;

/// One hop taken by the walker below the schema it started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStep<'a> {
    /// A named property, reached through `properties`
    Field(&'a str),
    /// The structural hop into an array's `items`
    Items,
}

/// A named field reached during a walk
#[derive(Debug, Clone)]
pub struct FieldVisit<'a> {
    pub name: &'a str,
    pub schema: &'a Value,
    /// Hops from the walk root down to and including this field
    pub steps: Vec<SchemaStep<'a>>,
}

impl FieldVisit<'_> {
    /// Path of the field relative to the walk root, using the schema's own
    /// keys (`properties`, `<name>`, `items`)
    pub fn relative_path(&self) -> DocPath {
        let mut path = Vec::with_capacity(self.steps.len() * 2);
        for step in &self.steps {
            match step {
                SchemaStep::Field(name) => {
                    path.push(PathSegment::from("properties"));
                    path.push(PathSegment::from(*name));
                }
                SchemaStep::Items => path.push(PathSegment::from("items")),
            }
        }
        path
    }

    pub fn schema_type(&self) -> Option<&str> {
        schema_type(self.schema)
    }
}

pub fn schema_type(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

/// Depth-first pre-order walk over the named fields below `root`.
///
/// Objects are entered through `properties` (an untyped schema with
/// `properties` counts as an object); arrays only when their `items` are
/// themselves object or array typed. The root is never visited, and the
/// `items` hop is taken without a visit.
pub fn walk<'a, F>(root: &'a Value, mut visit: F)
where
    F: FnMut(&FieldVisit<'a>),
{
    let mut steps = Vec::new();
    descend(root, &mut steps, &mut visit);
}

fn descend<'a, F>(node: &'a Value, steps: &mut Vec<SchemaStep<'a>>, visit: &mut F)
where
    F: FnMut(&FieldVisit<'a>),
{
    match schema_type(node) {
        Some("object") | None => {
            let Some(properties) = node.get("properties").and_then(Value::as_object) else {
                return;
            };
            for (name, child) in properties {
                steps.push(SchemaStep::Field(name));
                visit(&FieldVisit {
                    name,
                    schema: child,
                    steps: steps.clone(),
                });
                descend(child, steps, visit);
                steps.pop();
            }
        }
        Some("array") => {
            let Some(items) = node.get("items") else {
                return;
            };
            if matches!(schema_type(items), Some("object") | Some("array")) {
                steps.push(SchemaStep::Items);
                descend(items, steps, visit);
                steps.pop();
            }
        }
        Some(_) => {}
    }
}
