use super::path::{DocPath, display_path};
use lsp_types::Range;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Diagnostic severity, ordered from most to least severe.
///
/// Serialized as its numeric level (0=error, 1=warn, 2=info, 3=hint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error = 0,
    #[serde(alias = "warning")]
    Warn = 1,
    #[serde(alias = "information")]
    Info = 2,
    Hint = 3,
}

impl Severity {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// True when `self` is at least as severe as `threshold`
    pub fn reaches(&self, threshold: Severity) -> bool {
        *self <= threshold
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A single diagnostic produced by a rule against a document location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Name of the rule that produced this finding
    pub code: String,
    pub message: String,
    pub path: DocPath,
    pub range: Range,
    pub severity: Severity,
}

impl Finding {
    /// Path rendered as plain strings, handy for assertions and printers
    pub fn path_strings(&self) -> Vec<String> {
        self.path.iter().map(|segment| segment.to_string()).collect()
    }

    pub fn format(&self) -> String {
        format!(
            "{}:{} [{}] {}: {} ({})",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.code,
            self.message,
            display_path(&self.path)
        )
    }
}

/// Counts of findings per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Summary::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warn => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
                Severity::Hint => summary.hints += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos + self.hints
    }
}

/// Most severe level among `findings`, if any
pub fn max_severity(findings: &[Finding]) -> Option<Severity> {
    findings.iter().map(|f| f.severity).min()
}
