use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Failed to load API document: {0}")]
    DocumentLoadError(String),

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Invalid selector '{selector}' at offset {offset}: {reason}")]
    InvalidSelector {
        selector: String,
        offset: usize,
        reason: String,
    },

    #[error("Rule '{rule}' binds unknown function '{function}'")]
    UnknownFunction { rule: String, function: String },

    #[error("Rule '{rule}' has invalid functionOptions: {reason}")]
    InvalidOptions { rule: String, reason: String },

    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LintError {
    pub(crate) fn selector(selector: &str, offset: usize, reason: impl Into<String>) -> Self {
        LintError::InvalidSelector {
            selector: selector.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn options(rule: &str, reason: impl std::fmt::Display) -> Self {
        LintError::InvalidOptions {
            rule: rule.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;
