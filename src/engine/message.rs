use crate::models::path::{PathSegment, display_path};
use serde_json::Value;

/// Values substituted into a rule's `message` template
pub struct MessageParts<'a> {
    pub description: Option<&'a str>,
    pub error: &'a str,
    pub path: &'a [PathSegment],
    pub value: &'a Value,
}

impl MessageParts<'_> {
    fn property(&self) -> String {
        self.path.last().map(ToString::to_string).unwrap_or_default()
    }

    fn value(&self) -> String {
        match self.value {
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) => String::new(),
            other => other.to_string(),
        }
    }
}

/// Render `template`, or the default `description: error` layout when the
/// rule has no template. Unknown placeholders are left as written.
pub fn render(template: Option<&str>, parts: &MessageParts<'_>) -> String {
    let Some(template) = template else {
        return match parts.description.filter(|d| !d.is_empty()) {
            Some(description) if !parts.error.is_empty() => {
                format!("{}: {}", description, parts.error)
            }
            Some(description) => description.to_string(),
            None => parts.error.to_string(),
        };
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        match after[..end].trim() {
            "description" => out.push_str(parts.description.unwrap_or_default()),
            "error" => out.push_str(parts.error),
            "path" => out.push_str(&display_path(parts.path)),
            "property" => out.push_str(&parts.property()),
            "value" => out.push_str(&parts.value()),
            _ => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::path::doc_path;
    use serde_json::json;

    fn parts<'a>(path: &'a [PathSegment], value: &'a Value) -> MessageParts<'a> {
        MessageParts {
            description: Some("Responses need a tracking header"),
            error: "response is missing the `TrackingID` header",
            path,
            value,
        }
    }

    #[test]
    fn test_default_layout() {
        let path = doc_path(["a"]);
        let value = json!(null);
        assert_eq!(
            render(None, &parts(&path, &value)),
            "Responses need a tracking header: response is missing the `TrackingID` header"
        );

        let bare = MessageParts {
            description: None,
            error: "boom",
            path: &path,
            value: &value,
        };
        assert_eq!(render(None, &bare), "boom");
    }

    #[test]
    fn test_placeholders() {
        let path = doc_path(["paths", "/users", "get", "responses", "200"]);
        let value = json!("OK");
        let rendered = render(
            Some("{{property}} at {{path}} is '{{value}}' ({{ error }}) {{unknown}}"),
            &parts(&path, &value),
        );
        assert_eq!(
            rendered,
            "200 at paths./users.get.responses.200 is 'OK' (response is missing the `TrackingID` header) {{unknown}}"
        );
    }

    #[test]
    fn test_unterminated_placeholder() {
        let path = doc_path(["x"]);
        let value = json!(1);
        assert_eq!(render(Some("value {{value"), &parts(&path, &value)), "value {{value");
        assert_eq!(render(Some("n={{value}}"), &parts(&path, &value)), "n=1");
    }
}
