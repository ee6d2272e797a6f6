use super::{FunctionContext, RuleFunction, Violation};
use crate::models::path::join_path;
use crate::schema::{Confidence, operation_parameters, response_headers, response_is_collection};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionPaginationOptions {
    pub confidence: Confidence,
}

/// Operations whose `200` response returns a collection must page it with
/// `max`/`offset` query parameters and a `Link` header.
pub struct CollectionPagination(pub CollectionPaginationOptions);

fn has_query_parameter(parameters: &[&Value], name: &str) -> bool {
    parameters.iter().any(|parameter| {
        parameter.get("in").and_then(Value::as_str) == Some("query")
            && parameter
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}

impl RuleFunction for CollectionPagination {
    fn name(&self) -> &'static str {
        "collectionPagination"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(response) = target.get("responses").and_then(|r| r.get("200")) else {
            return Vec::new();
        };
        if !response_is_collection(response, ctx.format, self.0.confidence) {
            return Vec::new();
        }

        let parameters = operation_parameters(ctx.ancestor(1), target);
        let mut violations = Vec::new();
        if !has_query_parameter(&parameters, "max") {
            violations.push(Violation::new(
                "collection response is missing a `max` query parameter",
            ));
        }
        if self.0.confidence == Confidence::Possible && !has_query_parameter(&parameters, "offset")
        {
            violations.push(Violation::new(
                "collection response is missing an `offset` query parameter",
            ));
        }
        let has_link = response_headers(response)
            .is_some_and(|headers| headers.keys().any(|h| h.eq_ignore_ascii_case("Link")));
        if !has_link {
            violations.push(Violation::at(
                "collection response is missing a `Link` header",
                join_path(ctx.path, ["responses", "200"]),
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{build, run};
    use crate::models::format::SpecFormat;
    use crate::models::path::doc_path;
    use serde_json::{Value, json};

    fn document(parameters: Value, headers: Value) -> Value {
        json!({"paths": {"/users": {
            "parameters": [{"name": "offset", "in": "query"}],
            "get": {
                "parameters": parameters,
                "responses": {
                    "200": {
                        "description": "OK",
                        "headers": headers,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "properties": {"users": {"type": "array"}, "total": {"type": "integer"}}
                        }}}
                    },
                    "404": {"description": "Not Found"}
                }
            }
        }}})
    }

    fn path() -> Vec<crate::models::path::PathSegment> {
        doc_path(["paths", "/users", "get"])
    }

    #[test]
    fn test_paginated_collection_passes() {
        let doc = document(json!([{"name": "max", "in": "query"}]), json!({"Link": {}}));
        let function = build("collectionPagination", json!(null));
        assert!(run(function.as_ref(), &doc, &path(), SpecFormat::Oas3).is_empty());
    }

    #[test]
    fn test_each_missing_piece_is_reported() {
        let doc = json!({"paths": {"/users": {"get": {"responses": {"200": {
            "content": {"application/json": {"schema": {"type": "array", "items": {}}}}
        }}}}}});
        let function = build("collectionPagination", json!(null));
        let found = run(function.as_ref(), &doc, &path(), SpecFormat::Oas3);
        assert_eq!(found.len(), 3);
        assert_eq!(found[2].path, Some(doc_path(["paths", "/users", "get", "responses", "200"])));

        let likely = build("collectionPagination", json!({"confidence": "likely"}));
        assert_eq!(run(likely.as_ref(), &doc, &path(), SpecFormat::Oas3).len(), 2);
    }

    #[test]
    fn test_max_must_be_a_query_parameter() {
        let doc = document(json!([{"name": "max", "in": "header"}]), json!({"link": {}}));
        let function = build("collectionPagination", json!(null));
        let found = run(function.as_ref(), &doc, &path(), SpecFormat::Oas3);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("`max`"));
    }

    #[test]
    fn test_non_collection_is_ignored() {
        let doc = json!({"paths": {"/users": {"get": {"responses": {
            "200": {"content": {"application/json": {"schema": {
                "type": "object", "properties": {"name": {"type": "string"}}
            }}}},
            "206": {"content": {"application/json": {"schema": {"type": "array"}}}}
        }}}}});
        let function = build("collectionPagination", json!(null));
        assert!(run(function.as_ref(), &doc, &path(), SpecFormat::Oas3).is_empty());
    }
}
