//! Lookup tables consumed by rule functions.
//!
//! A [`Vocabulary`] is built once per [`crate::engine::Linter`] and shared
//! read-only with every function invocation. Any field may be overridden from
//! the `vocabulary:` section of a ruleset; omitted fields keep their defaults.

use crate::error::{LintError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Strings a candidate regex must accept and reject
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSet {
    #[serde(default)]
    pub should_match: Vec<String>,
    #[serde(default)]
    pub should_not_match: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vocabulary {
    /// Capitalized runs tolerated inside PasCamelCase tokens
    pub abbreviations: Vec<String>,
    /// Verbs that must not appear as path tokens
    pub crud_verbs: Vec<String>,
    /// Wrapper keys unwrapped before inspecting a response body, in priority order
    pub envelope_keys: Vec<String>,
    /// Canonical reason phrase per status code
    pub reason_phrases: BTreeMap<u16, String>,
    /// Status codes recommended for any operation
    pub common_status_codes: Vec<String>,
    /// Codes removed from `common_status_codes` per lowercase HTTP method
    pub method_disallowed_codes: IndexMap<String, Vec<String>>,
    /// Two-value enums that should have been booleans
    pub boolean_enum_pairs: Vec<Vec<String>>,
    /// Field names that always denote a date
    pub date_field_names: Vec<String>,
    /// camelCase words that mark a field as a date
    pub date_words: Vec<String>,
    /// Plural nouns without a regular suffix
    pub irregular_plurals: Vec<String>,
    /// Nouns accepted as plural as-is
    pub uncountable_nouns: Vec<String>,
    /// Named regex sample sets
    pub sample_sets: IndexMap<String, SampleSet>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        let reason_phrases = [
            (200, "OK"),
            (201, "Created"),
            (202, "Accepted"),
            (204, "No Content"),
            (301, "Moved Permanently"),
            (302, "Found"),
            (303, "See Other"),
            (304, "Not Modified"),
            (307, "Temporary Redirect"),
            (308, "Permanent Redirect"),
            (400, "Bad Request"),
            (401, "Unauthorized"),
            (403, "Forbidden"),
            (404, "Not Found"),
            (405, "Method Not Allowed"),
            (406, "Not Acceptable"),
            (409, "Conflict"),
            (410, "Gone"),
            (412, "Precondition Failed"),
            (415, "Unsupported Media Type"),
            (422, "Unprocessable Entity"),
            (429, "Too Many Requests"),
            (500, "Internal Server Error"),
            (501, "Not Implemented"),
            (502, "Bad Gateway"),
            (503, "Service Unavailable"),
            (504, "Gateway Timeout"),
        ]
        .into_iter()
        .map(|(code, phrase)| (code, phrase.to_string()))
        .collect();

        let method_disallowed_codes = [
            ("get", &["201", "202", "204"][..]),
            ("post", &["204"][..]),
            ("put", &["201"][..]),
            ("patch", &["201", "202"][..]),
            ("delete", &["201", "202"][..]),
        ]
        .into_iter()
        .map(|(method, codes)| (method.to_string(), strings(codes)))
        .collect();

        let mut sample_sets = IndexMap::new();
        sample_sets.insert(
            "rfc5322-date".to_string(),
            SampleSet {
                should_match: strings(&[
                    "Tue, 15 Nov 1994 08:12:31 GMT",
                    "Sun, 06 Nov 1994 08:49:37 GMT",
                    "Mon, 01 Jan 2024 00:00:00 GMT",
                    "Fri, 31 Dec 1999 23:59:59 GMT",
                ]),
                should_not_match: strings(&[
                    "2024-01-01T00:00:00Z",
                    "Sunday, 06-Nov-94 08:49:37 GMT",
                    "Sun Nov  6 08:49:37 1994",
                    "06 Nov 1994",
                    "Tue, 15 Nov 1994 08:12:31",
                    "",
                ]),
            },
        );

        Self {
            abbreviations: strings(&[
                "IO", "ID", "SN", "ASN", "CP", "VPC", "IP", "URL", "UUID", "API",
            ]),
            crud_verbs: strings(&[
                "create", "read", "get", "fetch", "retrieve", "list", "update", "modify", "edit",
                "set", "put", "patch", "post", "add", "insert", "delete", "remove", "destroy",
                "erase",
            ]),
            envelope_keys: strings(&["error", "data", "result"]),
            reason_phrases,
            common_status_codes: strings(&[
                "200", "201", "202", "204", "301", "302", "303", "400", "401", "403", "404",
                "405", "406", "409", "410", "415", "422", "429", "500", "501", "503", "504",
                "default",
            ]),
            method_disallowed_codes,
            boolean_enum_pairs: vec![
                strings(&["yes", "no"]),
                strings(&["on", "off"]),
                strings(&["true", "false"]),
            ],
            date_field_names: strings(&["created", "createdAt", "timestamp", "updated", "updatedAt"]),
            date_words: strings(&["date", "dates"]),
            irregular_plurals: strings(&[
                "people", "children", "men", "women", "feet", "teeth", "mice", "geese", "data",
                "criteria", "media", "indices", "matrices", "vertices", "analyses", "bases",
                "crises", "phenomena",
            ]),
            uncountable_nouns: strings(&[
                "information", "metadata", "equipment", "news", "series", "species", "feedback",
                "software", "hardware", "firmware", "settings", "stats", "statistics", "aliases",
            ]),
            sample_sets,
        }
    }
}

impl Vocabulary {
    /// Status codes recommended for `method`, after removing its disallowed codes
    pub fn recommended_codes(&self, method: &str) -> Vec<&str> {
        let method = method.to_ascii_lowercase();
        let disallowed = self.method_disallowed_codes.get(&method);
        self.common_status_codes
            .iter()
            .filter(|code| disallowed.is_none_or(|codes| !codes.contains(code)))
            .map(String::as_str)
            .collect()
    }

    pub fn reason_phrase(&self, code: u16) -> Option<&str> {
        self.reason_phrases.get(&code).map(String::as_str)
    }

    /// Reject tables that would make functions misbehave silently
    pub fn validate(&self) -> Result<()> {
        if self.abbreviations.iter().any(|a| a.trim().is_empty()) {
            return Err(LintError::InvalidVocabulary(
                "abbreviations must not contain empty entries".to_string(),
            ));
        }
        if let Some(pair) = self.boolean_enum_pairs.iter().find(|pair| pair.len() != 2) {
            return Err(LintError::InvalidVocabulary(format!(
                "booleanEnumPairs entries must have exactly two values, got [{}]",
                pair.join(", ")
            )));
        }
        if let Some(method) = self
            .method_disallowed_codes
            .keys()
            .find(|method| method.chars().any(|c| c.is_ascii_uppercase()))
        {
            return Err(LintError::InvalidVocabulary(format!(
                "methodDisallowedCodes keys must be lowercase, got '{}'",
                method
            )));
        }
        Ok(())
    }
}
