use super::{FunctionContext, RuleFunction, Violation};
use crate::casing::split_words;
use crate::error::{LintError, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("static placeholder regex"));

static VERSION_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)v[0-9]+(?:\.[0-9]+)*(?:/|$)").expect("static version regex")
});

/// Path segments with `{...}` placeholders removed, empty segments dropped
fn literal_segments(path: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .replace_all(path, "")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flags path templates whose words include a CRUD verb
pub struct CrudVerbInPath;

impl RuleFunction for CrudVerbInPath {
    fn name(&self) -> &'static str {
        "crudVerbInPath"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(path) = target.as_str() else {
            return Vec::new();
        };
        for segment in literal_segments(path) {
            let verb = split_words(&segment).into_iter().find(|word| {
                ctx.vocabulary
                    .crud_verbs
                    .iter()
                    .any(|verb| verb.eq_ignore_ascii_case(word))
            });
            if let Some(verb) = verb {
                return vec![Violation::new(format!(
                    "path `{}` uses the CRUD verb `{}` in segment `{}`; let the HTTP method carry the action",
                    path, verb, segment
                ))];
            }
        }
        Vec::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceNameLengthOptions {
    pub max: usize,
    /// Names longer than this are ignored
    #[serde(default)]
    pub cutoff: Option<usize>,
}

pub struct ResourceNameLength(ResourceNameLengthOptions);

impl ResourceNameLength {
    pub fn new(rule: &str, options: ResourceNameLengthOptions) -> Result<Self> {
        if let Some(cutoff) = options.cutoff
            && cutoff < options.max
        {
            return Err(LintError::options(rule, "`cutoff` must not be below `max`"));
        }
        Ok(Self(options))
    }
}

impl RuleFunction for ResourceNameLength {
    fn name(&self) -> &'static str {
        "resourceNameLength"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(path) = target.as_str() else {
            return Vec::new();
        };
        let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        let resource = PLACEHOLDER_RE.replace_all(last, "");
        // `/users/{id}` names no resource in its final segment
        if resource.is_empty() {
            return Vec::new();
        }
        let length = resource.chars().count();
        if length <= self.0.max || self.0.cutoff.is_some_and(|cutoff| length > cutoff) {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "resource name `{}` is {} characters long; keep it to {} or fewer",
            resource, length, self.0.max
        ))]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentScope {
    #[default]
    Whole,
    Last,
    Leading,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasCamelCasePathOptions {
    pub scope: SegmentScope,
}

/// Every literal path segment in scope must be PasCamelCase
pub struct PasCamelCasePath(pub PasCamelCasePathOptions);

impl RuleFunction for PasCamelCasePath {
    fn name(&self) -> &'static str {
        "pasCamelCasePath"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(path) = target.as_str() else {
            return Vec::new();
        };
        let segments = literal_segments(path);
        let in_scope: &[String] = match self.0.scope {
            SegmentScope::Whole => &segments,
            SegmentScope::Last => segments.last().map(std::slice::from_ref).unwrap_or_default(),
            SegmentScope::Leading => segments.split_last().map(|(_, rest)| rest).unwrap_or_default(),
        };
        in_scope
            .iter()
            .filter(|segment| !ctx.classifier.is_acceptable(segment))
            .map(|segment| {
                Violation::new(format!(
                    "path segment `{}` of `{}` is not PascalCase or camelCase",
                    segment, path
                ))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct VersionInPathOptions {
    pub must_contain: bool,
}

impl Default for VersionInPathOptions {
    fn default() -> Self {
        Self { must_contain: true }
    }
}

/// A path, server URL or basePath must (or must not) carry a `/v<N>` segment
pub struct VersionInPath(pub VersionInPathOptions);

impl RuleFunction for VersionInPath {
    fn name(&self) -> &'static str {
        "versionInPath"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(text) = target.as_str() else {
            return Vec::new();
        };
        let versioned = VERSION_SEGMENT_RE.is_match(text);
        match (versioned, self.0.must_contain) {
            (false, true) => vec![Violation::new(format!(
                "`{}` must contain a major version segment such as /v1",
                text
            ))],
            (true, false) => vec![Violation::new(format!(
                "`{}` must not contain a version segment",
                text
            ))],
            _ => Vec::new(),
        }
    }
}
