use super::{FunctionContext, RuleFunction, Violation, display_value};
use crate::casing::split_words;
use crate::models::path::{DocPath, PathSegment, join_path};
use crate::schema::{FieldVisit, schema_type, walk};
use crate::vocabulary::Vocabulary;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?$").expect("static semver regex"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNameOptions {
    /// Names accepted regardless of casing
    pub exceptions: Vec<String>,
}

impl Default for FieldNameOptions {
    fn default() -> Self {
        Self {
            exceptions: vec!["_id".to_string(), "X-HTTP-Method-Override".to_string()],
        }
    }
}

/// Parameter names and schema property names must be PasCamelCase.
///
/// The target is either a parameter object (header parameters are exempt) or
/// a schema. Schemas are followed through `properties`, `items`,
/// `additionalProperties` and the `allOf`/`anyOf`/`oneOf` branches only, so
/// `example`, `default` and `enum` payloads are never read as field names.
pub struct FieldNamePasCamelCase(pub FieldNameOptions);

const SCHEMA_BRANCHES: [&str; 3] = ["allOf", "anyOf", "oneOf"];

impl FieldNamePasCamelCase {
    fn accepts(&self, name: &str, ctx: &FunctionContext<'_>) -> bool {
        name.is_empty()
            || self.0.exceptions.iter().any(|exception| exception == name)
            || ctx.classifier.is_acceptable(name)
    }

    fn message(name: &str) -> String {
        format!("field name `{}` is not PascalCase or camelCase", name)
    }

    fn check_schema(
        &self,
        schema: &Value,
        path: &mut DocPath,
        ctx: &FunctionContext<'_>,
        out: &mut Vec<Violation>,
    ) {
        let Some(map) = schema.as_object() else {
            return;
        };
        if let Some(properties) = map.get("properties").and_then(Value::as_object) {
            path.push(PathSegment::Key("properties".to_string()));
            for (name, property) in properties {
                path.push(PathSegment::Key(name.clone()));
                if !self.accepts(name, ctx) {
                    out.push(Violation::at(Self::message(name), path.clone()));
                }
                self.check_schema(property, path, ctx, out);
                path.pop();
            }
            path.pop();
        }
        for key in ["items", "additionalProperties"] {
            if let Some(child) = map.get(key) {
                path.push(PathSegment::Key(key.to_string()));
                self.check_schema(child, path, ctx, out);
                path.pop();
            }
        }
        for key in SCHEMA_BRANCHES {
            if let Some(branches) = map.get(key).and_then(Value::as_array) {
                path.push(PathSegment::Key(key.to_string()));
                for (index, branch) in branches.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    self.check_schema(branch, path, ctx, out);
                    path.pop();
                }
                path.pop();
            }
        }
    }
}

impl RuleFunction for FieldNamePasCamelCase {
    fn name(&self) -> &'static str {
        "fieldNamePasCamelCase"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        if let (Some(name), Some(location)) = (
            target.get("name").and_then(Value::as_str),
            target.get("in").and_then(Value::as_str),
        ) {
            if location.eq_ignore_ascii_case("header") || self.accepts(name, ctx) {
                return Vec::new();
            }
            return vec![Violation::at(
                Self::message(name),
                join_path(ctx.path, ["name"]),
            )];
        }

        let mut violations = Vec::new();
        let mut path = ctx.path.to_vec();
        self.check_schema(target, &mut path, ctx, &mut violations);
        violations
    }
}

/// Whether the last word of a field name reads as a plural noun
pub(crate) fn is_plural(name: &str, vocabulary: &Vocabulary) -> bool {
    let Some(word) = split_words(name).pop() else {
        return true;
    };
    let word = word.to_lowercase();
    let listed = |list: &[String]| list.iter().any(|entry| entry.eq_ignore_ascii_case(&word));
    if listed(&vocabulary.irregular_plurals) || listed(&vocabulary.uncountable_nouns) {
        return true;
    }
    word.ends_with('s') && !["ss", "us", "is"].iter().any(|suffix| word.ends_with(suffix))
}

/// Array-typed fields must have plural names
pub struct PluralArrayFields;

impl RuleFunction for PluralArrayFields {
    fn name(&self) -> &'static str {
        "pluralArrayFields"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        walk(target, |field| {
            if field.schema_type() == Some("array") && !is_plural(field.name, ctx.vocabulary) {
                violations.push(Violation::at(
                    format!("array field `{}` should have a plural name", field.name),
                    join_path(ctx.path, field.relative_path()),
                ));
            }
        });
        violations
    }
}

fn is_date_time(schema: &Value) -> bool {
    schema_type(schema) == Some("string")
        && schema.get("format").and_then(Value::as_str) == Some("date-time")
}

fn looks_like_date(name: &str, vocabulary: &Vocabulary) -> bool {
    vocabulary.date_field_names.iter().any(|exact| exact == name)
        || split_words(name).iter().any(|word| {
            vocabulary
                .date_words
                .iter()
                .any(|date| date.eq_ignore_ascii_case(word))
        })
}

fn declared_as_date_time(field: &FieldVisit<'_>) -> bool {
    match field.schema_type() {
        Some("array") => field.schema.get("items").is_some_and(is_date_time),
        _ => is_date_time(field.schema),
    }
}

/// Date-like fields must be `string` with `format: date-time`
pub struct DateFields;

impl RuleFunction for DateFields {
    fn name(&self) -> &'static str {
        "dateFields"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        walk(target, |field| {
            if looks_like_date(field.name, ctx.vocabulary) && !declared_as_date_time(field) {
                violations.push(Violation::at(
                    format!(
                        "field `{}` looks like a date; declare it as type string with format date-time",
                        field.name
                    ),
                    join_path(ctx.path, field.relative_path()),
                ));
            }
        });
        violations
    }
}

/// `info.version` must read `MAJOR.MINOR[.PATCH]`
pub struct SemverVersion;

impl RuleFunction for SemverVersion {
    fn name(&self) -> &'static str {
        "semverVersion"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        if target.is_null() || target.is_object() || target.is_array() {
            return Vec::new();
        }
        let version = display_value(target);
        if SEMVER_RE.is_match(&version) {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "version `{}` is not in MAJOR.MINOR[.PATCH] form",
            version
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{VOCABULARY, build, run, run_on};
    use super::*;
    use crate::models::format::SpecFormat;
    use crate::models::path::doc_path;
    use serde_json::json;

    #[test]
    fn test_field_names_on_parameters() {
        let function = build("fieldNamePasCamelCase", json!(null));
        assert!(run_on(function.as_ref(), &json!({"name": "pageSize", "in": "query"})).is_empty());
        assert!(run_on(function.as_ref(), &json!({"name": "X-Trace_Id", "in": "header"})).is_empty());
        let found = run_on(function.as_ref(), &json!({"name": "page_size", "in": "query"}));
        assert_eq!(found[0].message, "field name `page_size` is not PascalCase or camelCase");
    }

    #[test]
    fn test_field_names_on_properties() {
        let doc = json!({"s": {"type": "object", "properties": {
            "_id": {}, "deviceID": {}, "created_at": {}, "THISISALLCAPS": {}
        }}});
        let function = build("fieldNamePasCamelCase", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["s"]), SpecFormat::Oas3);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, Some(doc_path(["s", "properties", "created_at"])));

        let custom = build("fieldNamePasCamelCase", json!({"exceptions": ["created_at"]}));
        assert_eq!(run(custom.as_ref(), &doc, &doc_path(["s"]), SpecFormat::Oas3).len(), 2);
    }

    #[test]
    fn test_field_names_follow_schema_keywords_only() {
        let doc = json!({"Job": {
            "type": "object",
            "example": {"properties": {"Snake_Key": 1}},
            "properties": {
                "parameters": {"type": "object", "description": "Free form job parameters."},
                "sample": {
                    "type": "object",
                    "default": {"bad_default": true},
                    "examples": [{"properties": {"Other_Key": 2}}]
                },
                "steps": {"type": "array", "items": {"allOf": [
                    {"properties": {"step_name": {"type": "string"}}}
                ]}}
            }
        }});
        let function = build("fieldNamePasCamelCase", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["Job"]), SpecFormat::Oas3);
        assert_eq!(found.len(), 1);
        let mut expected = doc_path(["Job", "properties", "steps", "items", "allOf"]);
        expected.push(PathSegment::Index(0));
        expected.extend(doc_path(["properties", "step_name"]));
        assert_eq!(found[0].path, Some(expected));
    }

    #[test]
    fn test_bare_strings_are_not_field_names() {
        let function = build("fieldNamePasCamelCase", json!(null));
        assert!(run_on(function.as_ref(), &json!("Free form job parameters.")).is_empty());
    }

    #[test]
    fn test_is_plural() {
        for plural in ["users", "userIDs", "people", "metadata", "childItems", "data"] {
            assert!(is_plural(plural, &VOCABULARY), "{} should be plural", plural);
        }
        for singular in ["user", "status", "address", "analysis", "userList"] {
            assert!(!is_plural(singular, &VOCABULARY), "{} should be singular", singular);
        }
    }

    #[test]
    fn test_plural_array_fields() {
        let doc = json!({"s": {"type": "object", "properties": {
            "tags": {"type": "array", "items": {"type": "string"}},
            "owner": {"type": "array", "items": {
                "type": "object",
                "properties": {"alias": {"type": "array", "items": {"type": "string"}}}
            }},
            "name": {"type": "string"}
        }}});
        let function = build("pluralArrayFields", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["s"]), SpecFormat::Oas3);
        let paths: Vec<_> = found.iter().map(|v| v.path.clone().unwrap()).collect();
        assert_eq!(
            paths,
            vec![
                doc_path(["s", "properties", "owner"]),
                doc_path(["s", "properties", "owner", "items", "properties", "alias"]),
            ]
        );
    }

    #[test]
    fn test_date_fields() {
        let doc = json!({"s": {"type": "object", "properties": {
            "createdAt": {"type": "string", "format": "date-time"},
            "updated": {"type": "integer"},
            "birthDate": {"type": "string", "format": "date"},
            "dates": {"type": "array", "items": {"type": "string", "format": "date-time"}},
            "holidayDates": {"type": "array", "items": {"type": "string"}},
            "update": {"type": "string"},
            "mandate": {"type": "string"}
        }}});
        let function = build("dateFields", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["s"]), SpecFormat::Oas3);
        let names: Vec<_> = found
            .iter()
            .map(|v| v.path.as_ref().unwrap().last().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["updated", "birthDate", "holidayDates"]);
    }

    #[test]
    fn test_semver_version() {
        let function = build("semverVersion", json!(null));
        assert!(run_on(function.as_ref(), &json!("1.2.3")).is_empty());
        assert!(run_on(function.as_ref(), &json!("2.0")).is_empty());
        assert!(run_on(function.as_ref(), &json!(1.0)).is_empty());
        assert_eq!(run_on(function.as_ref(), &json!("v1")).len(), 1);
        assert_eq!(run_on(function.as_ref(), &json!("2024-01-01")).len(), 1);
    }
}
