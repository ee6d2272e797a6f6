use super::oas::response_body_schema;
use super::walker::schema_type;
use crate::models::format::SpecFormat;
use serde::Deserialize;
use serde_json::Value;

/// How sure the heuristic must be before calling a body a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Any array, or an object with at least one array property or an
    /// `items` property
    #[default]
    Possible,
    /// Any array, or an object with exactly one array property or an `items`
    /// property
    Likely,
}

/// Classify a body schema. Every `Likely` collection is also `Possible`.
pub fn is_collection(schema: &Value, confidence: Confidence) -> bool {
    match schema_type(schema) {
        Some("array") => true,
        Some("object") => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return false;
            };
            let arrays = properties
                .values()
                .filter(|property| schema_type(property) == Some("array"))
                .count();
            match confidence {
                Confidence::Possible => arrays > 0 || properties.contains_key("items"),
                Confidence::Likely => arrays == 1 || properties.contains_key("items"),
            }
        }
        _ => false,
    }
}

/// Classify the body of a response object in the document's own layout
pub fn response_is_collection(response: &Value, format: SpecFormat, confidence: Confidence) -> bool {
    response_body_schema(response, format).is_some_and(|schema| is_collection(schema, confidence))
}
