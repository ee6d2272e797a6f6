use super::{FunctionContext, RuleFunction, Violation};
use serde_json::Value;

/// Rejects security schemes that send reusable credentials: HTTP schemes
/// other than bearer, OAuth2 password grants and OAS2 basic auth.
pub struct AcceptableAuthScheme;

fn uses_password_flow(scheme: &Value) -> bool {
    // OAS3 nests flows by grant type, OAS2 names a single flow.
    scheme
        .get("flows")
        .and_then(Value::as_object)
        .is_some_and(|flows| flows.contains_key("password"))
        || scheme.get("flow").and_then(Value::as_str) == Some("password")
}

impl RuleFunction for AcceptableAuthScheme {
    fn name(&self) -> &'static str {
        "acceptableAuthScheme"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(kind) = target.get("type").and_then(Value::as_str) else {
            return Vec::new();
        };
        let problem = match kind {
            "http" => {
                let scheme = target.get("scheme").and_then(Value::as_str).unwrap_or("");
                (!scheme.eq_ignore_ascii_case("bearer"))
                    .then(|| format!("HTTP auth scheme `{}` is not allowed; use bearer", scheme))
            }
            "basic" => Some("basic authentication is not allowed".to_string()),
            "oauth2" if uses_password_flow(target) => {
                Some("the OAuth2 password flow is not allowed".to_string())
            }
            _ => None,
        };
        problem.map(Violation::new).into_iter().collect()
    }
}
