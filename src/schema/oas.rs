use crate::models::format::SpecFormat;
use serde_json::{Map, Value};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Schema of a response body, wherever the document version keeps it.
///
/// OAS2 reads `schema` directly off the response. OAS3 reads
/// `content[mediaType].schema`, preferring `application/json`, then any
/// `+json` media type, then the first one declared.
pub fn response_body_schema(response: &Value, format: SpecFormat) -> Option<&Value> {
    match format {
        SpecFormat::Oas2 => response.get("schema"),
        SpecFormat::Oas3 => {
            let content = response.get("content")?.as_object()?;
            let media = content
                .get(JSON_MEDIA_TYPE)
                .or_else(|| {
                    content
                        .iter()
                        .find(|(name, _)| name.ends_with("json"))
                        .map(|(_, media)| media)
                })
                .or_else(|| content.values().next())?;
            media.get("schema")
        }
    }
}

/// `properties` of a response body schema; `None` if any hop is missing
pub fn properties_oas_agnostic(response: &Value, format: SpecFormat) -> Option<&Map<String, Value>> {
    response_body_schema(response, format)?
        .get("properties")?
        .as_object()
}

/// A response body after envelope unwrapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeBody<'a> {
    /// A plain properties bag
    Properties(&'a Map<String, Value>),
    /// An `allOf`/`anyOf` composition with no direct properties bag
    Composite(&'a Value),
}

impl<'a> EnvelopeBody<'a> {
    /// Property names reachable from the body. For compositions these are
    /// the names declared by each member's `properties`.
    pub fn keys(&self) -> Vec<&'a str> {
        match *self {
            EnvelopeBody::Properties(map) => map.keys().map(String::as_str).collect(),
            EnvelopeBody::Composite(node) => ["allOf", "anyOf", "oneOf"]
                .iter()
                .filter_map(|key| node.get(*key)?.as_array())
                .flatten()
                .filter_map(|member| member.get("properties")?.as_object())
                .flat_map(|properties| properties.keys().map(String::as_str))
                .collect(),
        }
    }

    /// Whether any reachable property name matches one of `names`,
    /// ignoring ASCII case
    pub fn has_key_ignore_case(&self, names: &[&str]) -> bool {
        self.keys()
            .iter()
            .any(|key| names.iter().any(|name| key.eq_ignore_ascii_case(name)))
    }
}

/// Unwrap a top-level envelope key (`data`, `error`, `result`, ...).
///
/// Envelope keys are tried in the given priority order and matched against
/// property names ignoring case. The first one whose value is an object
/// schema with `properties`, or carries `allOf`/`anyOf`, wins; otherwise the
/// bag is returned unchanged.
pub fn nested_key_if_exists<'a>(
    properties: &'a Map<String, Value>,
    envelope_keys: &[String],
) -> EnvelopeBody<'a> {
    for envelope in envelope_keys {
        let Some((_, value)) = properties
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(envelope))
        else {
            continue;
        };
        if value.get("type").and_then(Value::as_str) == Some("object")
            && let Some(nested) = value.get("properties").and_then(Value::as_object)
        {
            return EnvelopeBody::Properties(nested);
        }
        if value.get("allOf").is_some() || value.get("anyOf").is_some() {
            return EnvelopeBody::Composite(value);
        }
    }
    EnvelopeBody::Properties(properties)
}

/// Parameters visible to an operation: its own first, then path-level ones
/// it does not override (same `name` + `in`)
pub fn operation_parameters<'a>(path_item: Option<&'a Value>, operation: &'a Value) -> Vec<&'a Value> {
    let own: Vec<&Value> = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| params.iter().collect())
        .unwrap_or_default();
    let inherited = path_item
        .and_then(|item| item.get("parameters"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|param| {
            !own.iter().any(|mine| {
                mine.get("name") == param.get("name") && mine.get("in") == param.get("in")
            })
        });
    let mut all = own.clone();
    all.extend(inherited);
    all
}

/// Response headers of a response object, if declared
pub fn response_headers(response: &Value) -> Option<&Map<String, Value>> {
    response.get("headers")?.as_object()
}
