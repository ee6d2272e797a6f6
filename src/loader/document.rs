use super::resolver::{circular_refs, resolve_refs};
use super::source_map::SourceMap;
use crate::error::{LintError, Result};
use crate::models::format::SpecFormat;
use crate::models::path::PathSegment;
use lsp_types::Range;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A loaded API description, ready to lint
#[derive(Debug, Clone)]
pub struct Document {
    raw: Value,
    resolved: Value,
    format: SpecFormat,
    source_map: SourceMap,
    circular_refs: Vec<String>,
    broken_refs: Vec<String>,
    source: Option<PathBuf>,
}

impl Document {
    /// Parse YAML or JSON text
    pub fn parse(content: &str) -> Result<Self> {
        let raw = parse_tree(content)?;
        let mut document = Self::from_value(raw)?;
        document.source_map = SourceMap::build(content);
        Ok(document)
    }

    /// Wrap an already parsed tree. Ranges fall back to the document start.
    pub fn from_value(raw: Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(LintError::UnsupportedDocument(
                "document root must be a mapping".to_string(),
            ));
        }
        let format = SpecFormat::detect(&raw);
        let resolution = resolve_refs(&raw);
        let circular_refs = circular_refs(&raw);
        if !circular_refs.is_empty() {
            tracing::debug!(count = circular_refs.len(), "document contains circular references");
        }
        Ok(Self {
            resolved: resolution.value,
            broken_refs: resolution.broken,
            raw,
            format,
            source_map: SourceMap::default(),
            circular_refs,
            source: None,
        })
    }

    /// Load a document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LintError::DocumentLoadError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        let mut document = Self::parse(&content).map_err(|e| match e {
            LintError::DocumentLoadError(reason) => {
                LintError::DocumentLoadError(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
        document.source = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            format = %document.format,
            "document loaded"
        );
        Ok(document)
    }

    /// Tree as written, `$ref` objects intact
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Tree with internal references inlined
    pub fn resolved(&self) -> &Value {
        &self.resolved
    }

    pub fn format(&self) -> SpecFormat {
        self.format
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn circular_refs(&self) -> &[String] {
        &self.circular_refs
    }

    pub fn broken_refs(&self) -> &[String] {
        &self.broken_refs
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Source range of `path`, falling back to the closest mapped ancestor
    pub fn range_for(&self, path: &[PathSegment]) -> Range {
        self.source_map.nearest_range(path)
    }
}

impl FromStr for Document {
    type Err = LintError;

    fn from_str(content: &str) -> Result<Self> {
        Self::parse(content)
    }
}

/// Parse YAML (a superset of JSON) into a JSON tree.
///
/// Non-string mapping keys such as `200:` become their string form.
pub fn parse_tree(content: &str) -> Result<Value> {
    let mut yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| LintError::DocumentLoadError(format!("Failed to parse document: {}", e)))?;
    yaml.apply_merge()
        .map_err(|e| LintError::DocumentLoadError(format!("Failed to apply merge keys: {}", e)))?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_string(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_string(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        Yaml::Tagged(tagged) => key_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::path::doc_path;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths:
  /test:
    get:
      responses:
        200:
          $ref: '#/components/responses/Ok'
components:
  responses:
    Ok:
      description: OK
"#;

    #[test]
    fn test_load_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let document = Document::load(file.path()).unwrap();
        assert_eq!(document.format(), SpecFormat::Oas3);
        assert_eq!(document.source(), Some(file.path()));
        assert_eq!(
            document.resolved()["paths"]["/test"]["get"]["responses"]["200"],
            json!({"description": "OK"})
        );
        assert_eq!(
            document.raw()["paths"]["/test"]["get"]["responses"]["200"]["$ref"],
            json!("#/components/responses/Ok")
        );
    }

    #[test]
    fn test_integer_keys_become_strings() {
        let tree = parse_tree("responses:\n  200: {description: OK}\n  true: x\n").unwrap();
        assert!(tree["responses"].get("200").is_some());
        assert!(tree["responses"].get("true").is_some());
    }

    #[test]
    fn test_swagger_detection() {
        let document = Document::parse("swagger: '2.0'\npaths: {}\n").unwrap();
        assert_eq!(document.format(), SpecFormat::Oas2);

        let parsed: Document = "openapi: 3.1.0\npaths: {}\n".parse().unwrap();
        assert_eq!(parsed.format(), SpecFormat::Oas3);
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        assert!(matches!(
            Document::parse("- a\n- b\n"),
            Err(LintError::UnsupportedDocument(_))
        ));
        assert!(matches!(
            Document::parse("paths: [unclosed"),
            Err(LintError::DocumentLoadError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Document::load("/definitely/not/here.yaml");
        assert!(matches!(result, Err(LintError::DocumentLoadError(_))));
    }

    #[test]
    fn test_range_for_resolved_path_uses_raw_ancestor() {
        let document = Document::parse(YAML.trim_start()).unwrap();
        let inlined = doc_path(["paths", "/test", "get", "responses", "200", "description"]);
        let range = document.range_for(&inlined);
        assert_eq!(range.start.line, 8);
        assert_eq!(range.start.character, 8);
    }

    #[test]
    fn test_json_input() {
        let document = Document::parse(r#"{"openapi": "3.1.0", "paths": {"/a": {}}}"#).unwrap();
        assert_eq!(document.format(), SpecFormat::Oas3);
        assert!(document.source_map().range_for(&doc_path(["paths", "/a"])).is_some());
    }
}
