use super::{FunctionContext, RuleFunction, Violation, compile_regex, display_value};
use crate::error::{LintError, Result};
use crate::models::path::{DocPath, join_path};
use crate::query::is_truthy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Optional dotted field below the target
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOptions {
    #[serde(default)]
    pub field: Option<String>,
}

impl FieldOptions {
    /// The checked node (if present), its path and a name for messages
    fn locate<'v>(&self, target: &'v Value, ctx: &FunctionContext<'_>) -> (Option<&'v Value>, DocPath, String) {
        match &self.field {
            None => (
                Some(target),
                ctx.path.to_vec(),
                ctx.key_back(0).unwrap_or("value").to_string(),
            ),
            Some(field) => {
                let segments: Vec<&str> = field.split('.').collect();
                let value = segments
                    .iter()
                    .try_fold(target, |node, key| node.as_object()?.get(*key));
                (value, join_path(ctx.path, segments), field.clone())
            }
        }
    }
}

pub struct Truthy(pub FieldOptions);

impl RuleFunction for Truthy {
    fn name(&self) -> &'static str {
        "truthy"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (value, path, name) = self.0.locate(target, ctx);
        if value.is_some_and(is_truthy) {
            return Vec::new();
        }
        vec![Violation::at(format!("`{}` property must be truthy", name), path)]
    }
}

pub struct Falsy(pub FieldOptions);

impl RuleFunction for Falsy {
    fn name(&self) -> &'static str {
        "falsy"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (value, path, name) = self.0.locate(target, ctx);
        match value {
            Some(v) if is_truthy(v) => {
                vec![Violation::at(format!("`{}` property must be falsy", name), path)]
            }
            _ => Vec::new(),
        }
    }
}

pub struct Defined(pub FieldOptions);

impl RuleFunction for Defined {
    fn name(&self) -> &'static str {
        "defined"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (value, path, name) = self.0.locate(target, ctx);
        if value.is_some() {
            return Vec::new();
        }
        vec![Violation::at(format!("`{}` property must be defined", name), path)]
    }
}

pub struct Undefined(pub FieldOptions);

impl RuleFunction for Undefined {
    fn name(&self) -> &'static str {
        "undefined"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (value, path, name) = self.0.locate(target, ctx);
        if value.is_none() {
            return Vec::new();
        }
        vec![Violation::at(format!("`{}` property must be undefined", name), path)]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatternOptions {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default, rename = "match")]
    pub must_match: Option<String>,
    #[serde(default)]
    pub not_match: Option<String>,
}

/// A compiled pattern, or the reason it failed to compile
type Compiled = std::result::Result<Regex, String>;

pub struct Pattern {
    field: FieldOptions,
    must_match: Option<(String, Compiled)>,
    not_match: Option<(String, Compiled)>,
}

impl Pattern {
    pub fn new(rule: &str, options: PatternOptions) -> Result<Self> {
        if options.must_match.is_none() && options.not_match.is_none() {
            return Err(LintError::options(rule, "pattern needs `match` or `notMatch`"));
        }
        let compile = |source: String| {
            let compiled = compile_regex(&source).map_err(|e| e.to_string());
            (source, compiled)
        };
        Ok(Self {
            field: FieldOptions {
                field: options.field,
            },
            must_match: options.must_match.map(compile),
            not_match: options.not_match.map(compile),
        })
    }
}

impl RuleFunction for Pattern {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let (value, path, _) = self.field.locate(target, ctx);
        let Some(text) = value.and_then(Value::as_str) else {
            return Vec::new();
        };
        let mut violations = Vec::new();
        if let Some((source, compiled)) = &self.must_match {
            match compiled {
                Ok(re) if !re.is_match(text) => violations.push(Violation::at(
                    format!("\"{}\" must match the pattern \"{}\"", text, source),
                    path.clone(),
                )),
                Ok(_) => {}
                Err(reason) => violations.push(Violation::at(
                    format!("failed to parse regex \"{}\": {}", source, reason),
                    path.clone(),
                )),
            }
        }
        if let Some((source, compiled)) = &self.not_match {
            match compiled {
                Ok(re) if re.is_match(text) => violations.push(Violation::at(
                    format!("\"{}\" must not match the pattern \"{}\"", text, source),
                    path.clone(),
                )),
                Ok(_) => {}
                Err(reason) => violations.push(Violation::at(
                    format!("failed to parse regex \"{}\": {}", source, reason),
                    path.clone(),
                )),
            }
        }
        violations
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthOptions {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

pub struct Length(LengthOptions);

impl Length {
    pub fn new(rule: &str, options: LengthOptions) -> Result<Self> {
        match (options.min, options.max) {
            (None, None) => Err(LintError::options(rule, "length needs `min` or `max`")),
            (Some(min), Some(max)) if min > max => {
                Err(LintError::options(rule, "`min` is greater than `max`"))
            }
            _ => Ok(Self(options)),
        }
    }
}

impl RuleFunction for Length {
    fn name(&self) -> &'static str {
        "length"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let field = FieldOptions {
            field: self.0.field.clone(),
        };
        let (value, path, name) = field.locate(target, ctx);
        let size = match value {
            Some(Value::String(s)) => s.chars().count() as f64,
            Some(Value::Array(items)) => items.len() as f64,
            Some(Value::Object(map)) => map.len() as f64,
            Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            _ => return Vec::new(),
        };
        let mut violations = Vec::new();
        if let Some(min) = self.0.min
            && size < min
        {
            violations.push(Violation::at(
                format!("`{}` must not be shorter than {}", name, min),
                path.clone(),
            ));
        }
        if let Some(max) = self.0.max
            && size > max
        {
            violations.push(Violation::at(
                format!("`{}` must not be longer than {}", name, max),
                path,
            ));
        }
        violations
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnumerationOptions {
    pub values: Vec<Value>,
    #[serde(default)]
    pub case_insensitive: bool,
}

pub struct Enumeration(pub EnumerationOptions);

impl RuleFunction for Enumeration {
    fn name(&self) -> &'static str {
        "enumeration"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        if target.is_object() || target.is_array() {
            return Vec::new();
        }
        let allowed = self.0.values.iter().any(|candidate| match (candidate, target) {
            (Value::String(a), Value::String(b)) if self.0.case_insensitive => {
                a.eq_ignore_ascii_case(b)
            }
            (a, b) => a == b,
        });
        if allowed {
            return Vec::new();
        }
        let options: Vec<String> = self.0.values.iter().map(display_value).collect();
        vec![Violation::new(format!(
            "\"{}\" must be equal to one of the allowed values: {}",
            display_value(target),
            options.join(", ")
        ))]
    }
}
