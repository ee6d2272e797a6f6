//! Rule functions: the predicates a ruleset binds with `then.function`.
//!
//! Every function is built once from its `functionOptions` when the linter
//! is constructed, so bad options fail before any document is read. A
//! function is then invoked once per selected node and returns zero or more
//! [`Violation`]s; it never mutates the document.
//!
//! # Families
//!
//! - **common**: `truthy`, `falsy`, `defined`, `undefined`, `pattern`, `length`, `enumeration`
//! - **enums**: `enumAllOf`, `enumAnyOf`, `booleanEnum`
//! - **responses**: `statusCodeRange`, `methodStatusCodes`, `reasonPhrase`,
//!   `exclusiveResponseCodes`, `headerPresence`, `headGetHeaderParity`
//! - **errors**: `errorMessagePresence`, `errorIdentifierPresence`
//! - **paths**: `crudVerbInPath`, `resourceNameLength`, `pasCamelCasePath`, `versionInPath`
//! - **fields**: `fieldNamePasCamelCase`, `pluralArrayFields`, `dateFields`, `semverVersion`
//! - **patterns**: `regexSamples`
//! - **security**: `acceptableAuthScheme`
//! - **collections**: `collectionPagination`
//! - **refs**: `brokenRefs`

mod collections;
mod common;
mod enums;
mod errors;
mod fields;
mod paths;
mod patterns;
mod refs;
mod responses;
mod security;

use crate::casing::CaseClassifier;
use crate::error::{LintError, Result};
use crate::models::format::SpecFormat;
use crate::models::path::{DocPath, PathSegment, resolve_path};
use crate::vocabulary::Vocabulary;
use regex::{Regex, RegexBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Everything a function may read besides the node it was handed
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'a> {
    /// Name of the rule being evaluated
    pub rule: &'a str,
    /// Absolute path of the target node
    pub path: &'a [PathSegment],
    pub format: SpecFormat,
    /// The tree the rule selected from (resolved, or raw for `resolved: false`)
    pub document: &'a Value,
    pub vocabulary: &'a Vocabulary,
    pub classifier: &'a CaseClassifier,
}

impl<'a> FunctionContext<'a> {
    /// Key `n` segments above the target; `key_back(0)` is the target's own key
    pub fn key_back(&self, n: usize) -> Option<&'a str> {
        let index = self.path.len().checked_sub(n + 1)?;
        self.path[index].as_key()
    }

    /// Node `n` levels above the target
    pub fn ancestor(&self, n: usize) -> Option<&'a Value> {
        let len = self.path.len().checked_sub(n)?;
        resolve_path(self.document, &self.path[..len])
    }
}

/// A problem reported by a function. Without an explicit path the finding
/// lands on the target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub message: String,
    pub path: Option<DocPath>,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    pub fn at(message: impl Into<String>, path: DocPath) -> Self {
        Self {
            message: message.into(),
            path: Some(path),
        }
    }
}

/// A predicate bound by rules
pub trait RuleFunction: Send + Sync {
    /// Name the function is bound by in rulesets
    fn name(&self) -> &'static str;

    /// Check one selected node
    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation>;
}

/// A boxed function for dynamic dispatch
pub type BoxedFunction = Box<dyn RuleFunction>;

/// Every function name a ruleset may bind
pub const FUNCTION_NAMES: &[&str] = &[
    "truthy",
    "falsy",
    "defined",
    "undefined",
    "pattern",
    "length",
    "enumeration",
    "enumAllOf",
    "enumAnyOf",
    "booleanEnum",
    "statusCodeRange",
    "methodStatusCodes",
    "reasonPhrase",
    "exclusiveResponseCodes",
    "headerPresence",
    "headGetHeaderParity",
    "errorMessagePresence",
    "errorIdentifierPresence",
    "crudVerbInPath",
    "resourceNameLength",
    "pasCamelCasePath",
    "versionInPath",
    "fieldNamePasCamelCase",
    "pluralArrayFields",
    "dateFields",
    "semverVersion",
    "regexSamples",
    "acceptableAuthScheme",
    "collectionPagination",
    "brokenRefs",
];

/// Build the function `name` for `rule`, validating its options
pub fn build_function(rule: &str, name: &str, options: &Value) -> Result<BoxedFunction> {
    let function: BoxedFunction = match name {
        "truthy" => Box::new(common::Truthy(parse_options(rule, options)?)),
        "falsy" => Box::new(common::Falsy(parse_options(rule, options)?)),
        "defined" => Box::new(common::Defined(parse_options(rule, options)?)),
        "undefined" => Box::new(common::Undefined(parse_options(rule, options)?)),
        "pattern" => Box::new(common::Pattern::new(rule, parse_options(rule, options)?)?),
        "length" => Box::new(common::Length::new(rule, parse_options(rule, options)?)?),
        "enumeration" => Box::new(common::Enumeration(parse_options(rule, options)?)),
        "enumAllOf" => Box::new(enums::EnumAllOf(parse_options(rule, options)?)),
        "enumAnyOf" => Box::new(enums::EnumAnyOf(parse_options(rule, options)?)),
        "booleanEnum" => Box::new(enums::BooleanEnum(parse_options(rule, options)?)),
        "statusCodeRange" => Box::new(responses::StatusCodeRange::new(
            rule,
            parse_options(rule, options)?,
        )?),
        "methodStatusCodes" => Box::new(responses::MethodStatusCodes),
        "reasonPhrase" => Box::new(responses::ReasonPhrase(parse_options(rule, options)?)),
        "exclusiveResponseCodes" => Box::new(responses::ExclusiveResponseCodes::new(
            rule,
            parse_options(rule, options)?,
        )?),
        "headerPresence" => Box::new(responses::HeaderPresence(parse_options(rule, options)?)),
        "headGetHeaderParity" => Box::new(responses::HeadGetHeaderParity),
        "errorMessagePresence" => Box::new(errors::ErrorMessagePresence),
        "errorIdentifierPresence" => Box::new(errors::ErrorIdentifierPresence),
        "crudVerbInPath" => Box::new(paths::CrudVerbInPath),
        "resourceNameLength" => Box::new(paths::ResourceNameLength::new(
            rule,
            parse_options(rule, options)?,
        )?),
        "pasCamelCasePath" => Box::new(paths::PasCamelCasePath(parse_options(rule, options)?)),
        "versionInPath" => Box::new(paths::VersionInPath(parse_options(rule, options)?)),
        "fieldNamePasCamelCase" => Box::new(fields::FieldNamePasCamelCase(parse_options(
            rule, options,
        )?)),
        "pluralArrayFields" => Box::new(fields::PluralArrayFields),
        "dateFields" => Box::new(fields::DateFields),
        "semverVersion" => Box::new(fields::SemverVersion),
        "regexSamples" => Box::new(patterns::RegexSamples(parse_options(rule, options)?)),
        "acceptableAuthScheme" => Box::new(security::AcceptableAuthScheme),
        "collectionPagination" => Box::new(collections::CollectionPagination(parse_options(
            rule, options,
        )?)),
        "brokenRefs" => Box::new(refs::BrokenRefs(parse_options(rule, options)?)),
        other => {
            return Err(LintError::UnknownFunction {
                rule: rule.to_string(),
                function: other.to_string(),
            });
        }
    };
    Ok(function)
}

/// Deserialize `functionOptions`; an absent block reads as `{}`
pub(crate) fn parse_options<T: DeserializeOwned>(rule: &str, options: &Value) -> Result<T> {
    let options = match options {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(options).map_err(|e| LintError::options(rule, e))
}

/// Compile a regex written either bare or as `/body/flags`
pub(crate) fn compile_regex(source: &str) -> std::result::Result<Regex, regex::Error> {
    if let Some(rest) = source.strip_prefix('/')
        && let Some(end) = rest.rfind('/')
    {
        let (body, flags) = (&rest[..end], &rest[end + 1..]);
        if flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'g' | 'u')) {
            return RegexBuilder::new(body)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .ignore_whitespace(flags.contains('x'))
                .build();
        }
    }
    Regex::new(source)
}

/// Render a JSON scalar the way it reads in a document
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::LazyLock;

    pub static VOCABULARY: LazyLock<Vocabulary> = LazyLock::new(Vocabulary::default);
    pub static CLASSIFIER: LazyLock<CaseClassifier> =
        LazyLock::new(|| CaseClassifier::new(&VOCABULARY.abbreviations));

    /// Run `function` against the node at `path` of `document`
    pub fn run(
        function: &dyn RuleFunction,
        document: &Value,
        path: &[PathSegment],
        format: SpecFormat,
    ) -> Vec<Violation> {
        let target = resolve_path(document, path).cloned().unwrap_or(Value::Null);
        let ctx = FunctionContext {
            rule: "test-rule",
            path,
            format,
            document,
            vocabulary: &VOCABULARY,
            classifier: &CLASSIFIER,
        };
        function.check(&target, &ctx)
    }

    /// Run `function` against a detached node
    pub fn run_on(function: &dyn RuleFunction, target: &Value) -> Vec<Violation> {
        let document = Value::Null;
        let ctx = FunctionContext {
            rule: "test-rule",
            path: &[],
            format: SpecFormat::Oas3,
            document: &document,
            vocabulary: &VOCABULARY,
            classifier: &CLASSIFIER,
        };
        function.check(target, &ctx)
    }

    pub fn build(name: &str, options: Value) -> BoxedFunction {
        build_function("test-rule", name, &options).unwrap()
    }
}
