use super::{FunctionContext, RuleFunction, Violation};
use crate::error::{LintError, Result};
use crate::models::path::join_path;
use crate::schema::response_headers;
use serde::Deserialize;
use serde_json::{Map, Value};

fn is_extension(key: &str) -> bool {
    key.starts_with("x-")
}

/// Case-insensitive member lookup
fn get_ignore_case<'a>(map: &'a Map<String, Value>, key: &str) -> Option<(&'a str, &'a Value)> {
    map.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(name, value)| (name.as_str(), value))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusCodeRangeOptions {
    /// Inclusive `[start, stop]` pairs
    pub ranges: Vec<[u16; 2]>,
}

/// Every response status must fall in one of the configured ranges
pub struct StatusCodeRange {
    ranges: Vec<[u16; 2]>,
}

impl StatusCodeRange {
    pub fn new(rule: &str, options: StatusCodeRangeOptions) -> Result<Self> {
        if options.ranges.is_empty() {
            return Err(LintError::options(rule, "`ranges` must not be empty"));
        }
        if let Some([start, stop]) = options.ranges.iter().find(|[start, stop]| start > stop) {
            return Err(LintError::options(
                rule,
                format!("range [{}, {}] is inverted", start, stop),
            ));
        }
        Ok(Self {
            ranges: options.ranges,
        })
    }

    fn accepts(&self, key: &str) -> bool {
        if key == "default" {
            return true;
        }
        // OAS3 range keys such as `4XX`
        let upper = key.to_ascii_uppercase();
        let code = match upper.strip_suffix("XX") {
            Some(class) if class.len() == 1 => class.parse::<u16>().ok().map(|c| c * 100),
            _ => key.parse::<u16>().ok(),
        };
        code.is_some_and(|code| {
            self.ranges
                .iter()
                .any(|[start, stop]| (*start..=*stop).contains(&code))
        })
    }
}

impl RuleFunction for StatusCodeRange {
    fn name(&self) -> &'static str {
        "statusCodeRange"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(responses) = target.as_object() else {
            return Vec::new();
        };
        let invalid: Vec<&str> = responses
            .keys()
            .map(String::as_str)
            .filter(|key| !is_extension(key) && !self.accepts(key))
            .collect();
        if invalid.is_empty() {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "status codes out of the allowed ranges: {}",
            invalid.join(", ")
        ))]
    }
}

/// Response codes must be recommended for the operation's method
pub struct MethodStatusCodes;

impl RuleFunction for MethodStatusCodes {
    fn name(&self) -> &'static str {
        "methodStatusCodes"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (Some(responses), Some(method)) = (target.as_object(), ctx.key_back(1)) else {
            return Vec::new();
        };
        let recommended = ctx.vocabulary.recommended_codes(method);
        responses
            .keys()
            .filter(|code| !is_extension(code) && !recommended.contains(&code.as_str()))
            .map(|code| {
                Violation::at(
                    format!(
                        "{} is not a recommended status code for {}",
                        code,
                        method.to_ascii_uppercase()
                    ),
                    join_path(ctx.path, [code.as_str()]),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ReasonPhraseOptions {
    pub case_sensitive: bool,
}

/// A response description must be the canonical reason phrase of its code
pub struct ReasonPhrase(pub ReasonPhraseOptions);

impl RuleFunction for ReasonPhrase {
    fn name(&self) -> &'static str {
        "reasonPhrase"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(description) = target.as_str() else {
            return Vec::new();
        };
        let Some(code) = ctx.key_back(1).and_then(|code| code.parse::<u16>().ok()) else {
            return Vec::new();
        };
        let Some(phrase) = ctx.vocabulary.reason_phrase(code) else {
            return Vec::new();
        };
        let description = description.trim();
        let matches = if self.0.case_sensitive {
            description == phrase
        } else {
            description.eq_ignore_ascii_case(phrase)
        };
        if matches {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "description for {} should be \"{}\"",
            code, phrase
        ))]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExclusiveResponseCodesOptions {
    pub codes: Vec<String>,
    #[serde(default)]
    pub require_one: bool,
}

/// An operation must not declare both of two response codes
pub struct ExclusiveResponseCodes {
    first: String,
    second: String,
    require_one: bool,
}

impl ExclusiveResponseCodes {
    pub fn new(rule: &str, options: ExclusiveResponseCodesOptions) -> Result<Self> {
        match options.codes.as_slice() {
            [first, second] => Ok(Self {
                first: first.clone(),
                second: second.clone(),
                require_one: options.require_one,
            }),
            _ => Err(LintError::options(rule, "`codes` must list exactly two status codes")),
        }
    }
}

impl RuleFunction for ExclusiveResponseCodes {
    fn name(&self) -> &'static str {
        "exclusiveResponseCodes"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(responses) = target.get("responses").and_then(Value::as_object) else {
            return Vec::new();
        };
        let has_first = responses.contains_key(&self.first);
        let has_second = responses.contains_key(&self.second);
        match (has_first, has_second) {
            (true, true) => vec![Violation::new(format!(
                "operation declares both {} and {}; use only one",
                self.first, self.second
            ))],
            (false, false) if self.require_one => vec![Violation::new(format!(
                "operation declares neither {} nor {}",
                self.first, self.second
            ))],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeaderPresenceOptions {
    pub header: String,
    /// Only check responses with these codes
    #[serde(default)]
    pub codes: Option<Vec<String>>,
}

/// A response must declare a header (matched ignoring case)
pub struct HeaderPresence(pub HeaderPresenceOptions);

impl RuleFunction for HeaderPresence {
    fn name(&self) -> &'static str {
        "headerPresence"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        if !target.is_object() {
            return Vec::new();
        }
        if let Some(codes) = &self.0.codes {
            let code = ctx.key_back(0).unwrap_or_default();
            if !codes.iter().any(|c| c == code) {
                return Vec::new();
            }
        }
        let declared = response_headers(target)
            .is_some_and(|headers| get_ignore_case(headers, &self.0.header).is_some());
        if declared {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "response is missing the `{}` header",
            self.0.header
        ))]
    }
}

/// HEAD responses must declare the headers of the matching GET responses
pub struct HeadGetHeaderParity;

impl RuleFunction for HeadGetHeaderParity {
    fn name(&self) -> &'static str {
        "headGetHeaderParity"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(item) = target.as_object() else {
            return Vec::new();
        };
        let responses = |method: &str| {
            get_ignore_case(item, method).and_then(|(key, op)| {
                Some((key, op.get("responses")?.as_object()?))
            })
        };
        let (Some((_, get)), Some((head_key, head))) = (responses("get"), responses("head")) else {
            return Vec::new();
        };

        let mut violations = Vec::new();
        for (code, get_response) in get {
            let Some(head_response) = head.get(code) else {
                continue;
            };
            let Some(get_headers) = response_headers(get_response).filter(|h| !h.is_empty()) else {
                continue;
            };
            let path = join_path(ctx.path, [head_key, "responses", code.as_str()]);
            let Some(head_headers) = response_headers(head_response) else {
                violations.push(Violation::at(
                    format!("HEAD response {} is missing a headers definition", code),
                    path,
                ));
                continue;
            };
            let missing: Vec<&str> = get_headers
                .keys()
                .filter(|name| get_ignore_case(head_headers, name).is_none())
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                violations.push(Violation::at(
                    format!(
                        "HEAD response {} is missing headers declared by GET: {}",
                        code,
                        missing.join(", ")
                    ),
                    path,
                ));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{build, run, run_on};
    use crate::models::format::SpecFormat;
    use crate::models::path::doc_path;
    use serde_json::json;

    #[test]
    fn test_status_code_range_collects_all_violators() {
        let function = build(
            "statusCodeRange",
            json!({"ranges": [[200, 299], [300, 399], [400, 499], [500, 599]]}),
        );
        let responses = json!({
            "99": {}, "100": {}, "204": {}, "401": {}, "782": {}, "default": {}, "x-extra": {}
        });
        let found = run_on(function.as_ref(), &responses);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "status codes out of the allowed ranges: 99, 100, 782");

        assert!(run_on(function.as_ref(), &json!({"4XX": {}, "default": {}})).is_empty());
    }

    #[test]
    fn test_status_code_range_options() {
        let inverted = super::super::build_function("r", "statusCodeRange", &json!({"ranges": [[299, 200]]}));
        assert!(inverted.is_err());
    }

    #[test]
    fn test_method_status_codes() {
        let doc = json!({"paths": {"/a": {
            "get": {"responses": {"200": {}, "201": {}, "204": {}, "418": {}}},
            "post": {"responses": {"201": {}}}
        }}});
        let function = build("methodStatusCodes", json!(null));
        let found = run(
            function.as_ref(),
            &doc,
            &doc_path(["paths", "/a", "get", "responses"]),
            SpecFormat::Oas3,
        );
        let codes: Vec<_> = found
            .iter()
            .map(|v| v.path.as_ref().unwrap().last().unwrap().to_string())
            .collect();
        assert_eq!(codes, vec!["201", "204", "418"]);
        assert_eq!(found[0].message, "201 is not a recommended status code for GET");

        let post = run(
            function.as_ref(),
            &doc,
            &doc_path(["paths", "/a", "post", "responses"]),
            SpecFormat::Oas3,
        );
        assert!(post.is_empty());
    }

    #[test]
    fn test_reason_phrase() {
        let doc = json!({"responses": {
            "404": {"description": "not found"},
            "200": {"description": "Success"},
            "299": {"description": "Whatever"}
        }});
        let relaxed = build("reasonPhrase", json!({}));
        let check = |code: &str| {
            run(
                relaxed.as_ref(),
                &doc,
                &doc_path(["responses", code, "description"]),
                SpecFormat::Oas3,
            )
        };
        assert!(check("404").is_empty());
        assert_eq!(check("200")[0].message, "description for 200 should be \"OK\"");
        assert!(check("299").is_empty());

        let strict = build("reasonPhrase", json!({"caseSensitive": true}));
        let found = run(
            strict.as_ref(),
            &doc,
            &doc_path(["responses", "404", "description"]),
            SpecFormat::Oas3,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_exclusive_response_codes() {
        let function = build("exclusiveResponseCodes", json!({"codes": ["200", "204"]}));
        let both = json!({"responses": {"200": {}, "204": {}}});
        assert_eq!(run_on(function.as_ref(), &both).len(), 1);
        assert!(run_on(function.as_ref(), &json!({"responses": {"200": {}}})).is_empty());
        assert!(run_on(function.as_ref(), &json!({"responses": {"400": {}}})).is_empty());

        let strict = build(
            "exclusiveResponseCodes",
            json!({"codes": ["200", "204"], "requireOne": true}),
        );
        assert_eq!(run_on(strict.as_ref(), &json!({"responses": {"400": {}}})).len(), 1);

        let bad = super::super::build_function("r", "exclusiveResponseCodes", &json!({"codes": ["200"]}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_header_presence() {
        let function = build("headerPresence", json!({"header": "TrackingID"}));
        let with = json!({"headers": {"trackingid": {"schema": {"type": "string"}}}});
        assert!(run_on(function.as_ref(), &with).is_empty());
        let without = json!({"headers": {"Date": {}}});
        let found = run_on(function.as_ref(), &without);
        assert_eq!(found[0].message, "response is missing the `TrackingID` header");
        assert_eq!(run_on(function.as_ref(), &json!({"description": "OK"})).len(), 1);
    }

    #[test]
    fn test_header_presence_code_filter() {
        let doc = json!({"responses": {"429": {"description": "x"}, "200": {"description": "y"}}});
        let function = build("headerPresence", json!({"header": "Retry-After", "codes": ["429", "503"]}));
        let at = |code: &str| run(function.as_ref(), &doc, &doc_path(["responses", code]), SpecFormat::Oas3);
        assert_eq!(at("429").len(), 1);
        assert!(at("200").is_empty());
    }

    #[test]
    fn test_head_get_parity_same_headers_any_order() {
        let doc = json!({"paths": {"/a": {
            "get": {"responses": {"200": {"headers": {"A": {}, "B": {}}}}},
            "head": {"responses": {"200": {"headers": {"b": {}, "A": {}}}}}
        }}});
        let function = build("headGetHeaderParity", json!(null));
        assert!(run(function.as_ref(), &doc, &doc_path(["paths", "/a"]), SpecFormat::Oas3).is_empty());
    }

    #[test]
    fn test_head_get_parity_checks_every_code() {
        let doc = json!({"paths": {"/a": {
            "get": {"responses": {
                "200": {"headers": {"A": {}, "B": {}, "C": {}}},
                "404": {"headers": {"A": {}}},
                "500": {"headers": {"A": {}}}
            }},
            "head": {"responses": {
                "200": {"headers": {"A": {}}},
                "404": {"description": "no headers"},
                "500": {"headers": {"A": {}, "Extra": {}}}
            }}
        }}});
        let function = build("headGetHeaderParity", json!(null));
        let found = run(function.as_ref(), &doc, &doc_path(["paths", "/a"]), SpecFormat::Oas3);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].message, "HEAD response 200 is missing headers declared by GET: B, C");
        assert_eq!(
            found[0].path,
            Some(doc_path(["paths", "/a", "head", "responses", "200"]))
        );
        assert_eq!(found[1].message, "HEAD response 404 is missing a headers definition");
    }
}
