use super::{FunctionContext, RuleFunction, Violation};
use crate::models::format::SpecFormat;
use crate::schema::{nested_key_if_exists, properties_oas_agnostic};
use serde_json::Value;

/// Require one of `names` among the (envelope-unwrapped) body properties of
/// an error response. A response without a properties bag is itself reported.
fn require_property(target: &Value, ctx: &FunctionContext<'_>, names: &[&str]) -> Vec<Violation> {
    if !target.is_object() {
        return Vec::new();
    }
    let wanted = names
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(" or ");
    let Some(properties) = properties_oas_agnostic(target, ctx.format) else {
        let location = match ctx.format {
            SpecFormat::Oas2 => "schema.properties",
            SpecFormat::Oas3 => "content.application/json.schema.properties",
        };
        return vec![Violation::new(format!(
            "expected {} with a {} property, but the response body has no properties",
            location, wanted
        ))];
    };
    let body = nested_key_if_exists(properties, &ctx.vocabulary.envelope_keys);
    if body.has_key_ignore_case(names) {
        return Vec::new();
    }
    vec![Violation::new(format!(
        "error response body must contain a {} property",
        wanted
    ))]
}

pub struct ErrorMessagePresence;

impl RuleFunction for ErrorMessagePresence {
    fn name(&self) -> &'static str {
        "errorMessagePresence"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        require_property(target, ctx, &["message", "messages"])
    }
}

pub struct ErrorIdentifierPresence;

impl RuleFunction for ErrorIdentifierPresence {
    fn name(&self) -> &'static str {
        "errorIdentifierPresence"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        require_property(target, ctx, &["trackingId", "code"])
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{build, run};
    use crate::models::format::SpecFormat;
    use crate::models::path::doc_path;
    use serde_json::{Value, json};

    fn oas3_response(schema: Value) -> Value {
        json!({"r": {"description": "Bad Request", "content": {"application/json": {"schema": schema}}}})
    }

    #[test]
    fn test_message_at_top_level() {
        let doc = oas3_response(json!({"type": "object", "properties": {"Message": {"type": "string"}}}));
        let function = build("errorMessagePresence", json!(null));
        assert!(run(function.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas3).is_empty());
    }

    #[test]
    fn test_message_inside_envelope() {
        let doc = oas3_response(json!({
            "type": "object",
            "properties": {
                "error": {"type": "object", "properties": {"messages": {"type": "array"}, "code": {}}}
            }
        }));
        let message = build("errorMessagePresence", json!(null));
        let identifier = build("errorIdentifierPresence", json!(null));
        assert!(run(message.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas3).is_empty());
        assert!(run(identifier.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas3).is_empty());
    }

    #[test]
    fn test_envelope_hides_top_level_keys() {
        let doc = oas3_response(json!({
            "type": "object",
            "properties": {
                "trackingId": {"type": "string"},
                "data": {"type": "object", "properties": {"id": {}}}
            }
        }));
        let identifier = build("errorIdentifierPresence", json!(null));
        let found = run(identifier.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas3);
        assert_eq!(
            found[0].message,
            "error response body must contain a `trackingId` or `code` property"
        );
    }

    #[test]
    fn test_missing_body_is_reported() {
        let doc = json!({"r": {"description": "Not Found"}});
        let function = build("errorMessagePresence", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas2);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.starts_with("expected schema.properties"));
    }

    #[test]
    fn test_oas2_layout() {
        let doc = json!({"r": {"schema": {"type": "object", "properties": {"code": {}, "message": {}}}}});
        let identifier = build("errorIdentifierPresence", json!(null));
        assert!(run(identifier.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas2).is_empty());
        assert_eq!(run(identifier.as_ref(), &doc, &doc_path(["r"]), SpecFormat::Oas3).len(), 1);
    }
}
