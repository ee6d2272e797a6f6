use super::{FunctionContext, RuleFunction, Violation};
use crate::loader::{RefTarget, lookup_pointer, ref_of};
use crate::models::path::{DocPath, PathSegment};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BrokenRefsOptions {
    /// Only check `$ref`s that share their mapping with other keys
    pub siblings_only: bool,
}

impl Default for BrokenRefsOptions {
    fn default() -> Self {
        Self { siblings_only: true }
    }
}

/// Scans the unresolved tree for internal `$ref`s whose target is missing.
///
/// Bind it with `resolved: false`: after resolution a broken reference is
/// indistinguishable from a remote one.
pub struct BrokenRefs(pub BrokenRefsOptions);

impl BrokenRefs {
    fn scan(&self, node: &Value, path: &mut DocPath, ctx: &FunctionContext<'_>, out: &mut Vec<Violation>) {
        match node {
            Value::Object(map) => {
                if let Some(reference) = ref_of(node)
                    && (!self.0.siblings_only || map.len() > 1)
                {
                    self.check_reference(reference, path, ctx, out);
                }
                for (key, child) in map {
                    path.push(PathSegment::Key(key.clone()));
                    self.scan(child, path, ctx, out);
                    path.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    self.scan(child, path, ctx, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }

    fn check_reference(
        &self,
        reference: &str,
        path: &[PathSegment],
        ctx: &FunctionContext<'_>,
        out: &mut Vec<Violation>,
    ) {
        match RefTarget::parse(reference) {
            RefTarget::Internal(pointer) => {
                if lookup_pointer(ctx.document, pointer).is_none() {
                    out.push(Violation::at(
                        format!("`$ref` target `{}` does not exist", reference),
                        path.to_vec(),
                    ));
                }
            }
            RefTarget::Remote(_) => {}
            RefTarget::File(file) => {
                tracing::debug!(rule = ctx.rule, reference = file, "skipping file reference");
            }
        }
    }
}

impl RuleFunction for BrokenRefs {
    fn name(&self) -> &'static str {
        "brokenRefs"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut path = ctx.path.to_vec();
        self.scan(target, &mut path, ctx, &mut violations);
        violations
    }
}
