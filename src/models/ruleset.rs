//! Declarative rule catalog as read from a ruleset file.
//!
//! Rules are plain configuration; compiling selectors and function options
//! happens in [`crate::engine::Linter::new`].

use super::finding::Severity;
use super::format::SpecFormat;
use crate::error::{LintError, Result};
use crate::vocabulary::Vocabulary;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

const DEFAULT_RULESET: &str = include_str!("../../rulesets/default.yaml");

/// Root of a ruleset file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ruleset {
    /// Lookup tables shared by rule functions
    #[serde(default)]
    pub vocabulary: Vocabulary,

    /// Rules in declaration order
    #[serde(default)]
    pub rules: IndexMap<String, RuleDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    #[serde(default)]
    pub description: Option<String>,

    /// Message template; supports {{description}}, {{error}}, {{path}},
    /// {{property}} and {{value}}
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub severity: RuleSeverity,

    /// Formats the rule applies to; all formats when absent
    #[serde(default)]
    pub formats: Option<Vec<SpecFormat>>,

    /// Evaluate against the `$ref`-resolved tree (default) or the raw tree
    #[serde(default = "default_resolved")]
    pub resolved: bool,

    pub given: Given,

    pub then: Then,
}

fn default_resolved() -> bool {
    true
}

/// Rule severity as written in a ruleset; `off` disables the rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    #[default]
    #[serde(alias = "warning")]
    Warn,
    #[serde(alias = "information")]
    Info,
    Hint,
    Off,
}

impl RuleSeverity {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            RuleSeverity::Error => Some(Severity::Error),
            RuleSeverity::Warn => Some(Severity::Warn),
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Hint => Some(Severity::Hint),
            RuleSeverity::Off => None,
        }
    }
}

/// One selector or several, evaluated in order
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Given {
    One(String),
    Many(Vec<String>),
}

impl Given {
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Given::One(selector) => vec![selector.as_str()],
            Given::Many(selectors) => selectors.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Then {
    pub function: String,

    #[serde(default, rename = "functionOptions")]
    pub function_options: Value,
}

impl Ruleset {
    /// The ruleset bundled with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(DEFAULT_RULESET)
    }

    /// Parse a ruleset from YAML (JSON is accepted as well)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let ruleset: Ruleset = serde_yaml::from_str(content)
            .map_err(|e| LintError::InvalidRuleset(format!("Failed to parse ruleset: {}", e)))?;
        ruleset.check()?;
        Ok(ruleset)
    }

    /// Load a ruleset from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LintError::InvalidRuleset(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    fn check(&self) -> Result<()> {
        for (name, rule) in &self.rules {
            if rule.given.selectors().is_empty() {
                return Err(LintError::InvalidRuleset(format!(
                    "Rule '{}' has an empty 'given'",
                    name
                )));
            }
        }
        Ok(())
    }
}
