use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// OpenAPI major version a document is written against.
///
/// Detected once when the document is loaded and passed explicitly to every
/// rule function; nothing downstream sniffs the tree for version markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFormat {
    Oas2,
    Oas3,
}

impl SpecFormat {
    /// Detect the format from a document root. Only `swagger: 2.x` selects
    /// OAS2; everything else is handled as OAS3.
    pub fn detect(root: &Value) -> Self {
        let swagger = match root.get("swagger") {
            Some(Value::String(version)) => version.clone(),
            Some(Value::Number(version)) => version.to_string(),
            _ => return SpecFormat::Oas3,
        };
        if swagger.starts_with('2') {
            SpecFormat::Oas2
        } else {
            SpecFormat::Oas3
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SpecFormat::Oas2 => "OpenAPI 2.0 (Swagger)",
            SpecFormat::Oas3 => "OpenAPI 3.x",
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
