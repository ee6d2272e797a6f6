//! Rule evaluation.
//!
//! A [`Linter`] is compiled once from a [`Ruleset`]: selectors are parsed and
//! functions are built from their options, so configuration mistakes surface
//! before any document is read. [`Linter::lint`] then evaluates every enabled
//! rule in declaration order and collects the findings.
//!
//! A function that panics on an unexpected document shape is isolated: the
//! panic becomes an error finding for that node and evaluation carries on.

mod message;

pub use message::{MessageParts, render};

use crate::casing::CaseClassifier;
use crate::error::Result;
use crate::functions::{BoxedFunction, FunctionContext, build_function};
use crate::loader::Document;
use crate::models::finding::{Finding, Severity, Summary, max_severity};
use crate::models::format::SpecFormat;
use crate::models::path::DocPath;
use crate::models::ruleset::Ruleset;
use crate::query::Selector;
use crate::vocabulary::Vocabulary;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

/// A rule ready to run
pub struct CompiledRule {
    pub name: String,
    pub description: Option<String>,
    pub message: Option<String>,
    pub severity: Severity,
    pub formats: Option<Vec<SpecFormat>>,
    pub resolved: bool,
    pub selectors: Vec<Selector>,
    pub function: BoxedFunction,
}

impl CompiledRule {
    pub fn applies_to(&self, format: SpecFormat) -> bool {
        self.formats
            .as_ref()
            .is_none_or(|formats| formats.contains(&format))
    }
}

/// Findings for one document plus their counts
#[derive(Debug, Clone)]
pub struct LintReport {
    pub source: Option<PathBuf>,
    pub findings: Vec<Finding>,
    pub summary: Summary,
}

impl LintReport {
    pub fn new(source: Option<&Path>, findings: Vec<Finding>) -> Self {
        let summary = Summary::from_findings(&findings);
        Self {
            source: source.map(Path::to_path_buf),
            findings,
            summary,
        }
    }

    pub fn max_severity(&self) -> Option<Severity> {
        max_severity(&self.findings)
    }

    /// True when any finding is at least as severe as `threshold`
    pub fn fails(&self, threshold: Severity) -> bool {
        self.max_severity()
            .is_some_and(|severity| severity.reaches(threshold))
    }
}

/// Compiled ruleset plus the lookup tables shared by its functions
pub struct Linter {
    rules: Vec<CompiledRule>,
    vocabulary: Vocabulary,
    classifier: CaseClassifier,
}

impl Linter {
    /// Compile `ruleset`. Rules with `severity: off` are dropped here.
    pub fn new(ruleset: Ruleset) -> Result<Self> {
        let Ruleset { vocabulary, rules } = ruleset;
        vocabulary.validate()?;

        let mut compiled = Vec::with_capacity(rules.len());
        for (name, definition) in rules {
            let Some(severity) = definition.severity.severity() else {
                tracing::debug!(rule = %name, "rule is off");
                continue;
            };
            let selectors = definition
                .given
                .selectors()
                .into_iter()
                .map(Selector::parse)
                .collect::<Result<Vec<_>>>()?;
            let function = build_function(
                &name,
                &definition.then.function,
                &definition.then.function_options,
            )?;
            compiled.push(CompiledRule {
                name,
                description: definition.description,
                message: definition.message,
                severity,
                formats: definition.formats,
                resolved: definition.resolved,
                selectors,
                function,
            });
        }

        let classifier = CaseClassifier::new(&vocabulary.abbreviations);
        Ok(Self {
            rules: compiled,
            vocabulary,
            classifier,
        })
    }

    /// Linter for the bundled ruleset
    pub fn builtin() -> Result<Self> {
        Self::new(Ruleset::builtin()?)
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Evaluate every enabled rule against `document`
    pub fn lint(&self, document: &Document) -> Vec<Finding> {
        let format = document.format();
        let mut findings = Vec::new();

        for rule in &self.rules {
            if !rule.applies_to(format) {
                tracing::debug!(rule = %rule.name, format = %format, "rule skipped for format");
                continue;
            }
            let tree = if rule.resolved {
                document.resolved()
            } else {
                document.raw()
            };
            let before = findings.len();

            for selector in &rule.selectors {
                for selected in selector.select(tree) {
                    let ctx = FunctionContext {
                        rule: &rule.name,
                        path: &selected.path,
                        format,
                        document: tree,
                        vocabulary: &self.vocabulary,
                        classifier: &self.classifier,
                    };
                    let outcome = catch_unwind(AssertUnwindSafe(|| {
                        rule.function.check(&selected.value, &ctx)
                    }));
                    match outcome {
                        Ok(violations) => {
                            for violation in violations {
                                let path = violation.path.unwrap_or_else(|| selected.path.clone());
                                let message = render(
                                    rule.message.as_deref(),
                                    &MessageParts {
                                        description: rule.description.as_deref(),
                                        error: &violation.message,
                                        path: &path,
                                        value: &selected.value,
                                    },
                                );
                                findings.push(finding(document, rule, path, message, rule.severity));
                            }
                        }
                        Err(panic) => {
                            let detail = panic_detail(panic.as_ref());
                            tracing::warn!(
                                rule = %rule.name,
                                function = rule.function.name(),
                                path = ?selected.path,
                                "rule function panicked: {}",
                                detail
                            );
                            let message = format!(
                                "{} failed unexpectedly: {}",
                                rule.function.name(),
                                detail
                            );
                            findings.push(finding(
                                document,
                                rule,
                                selected.path.clone(),
                                message,
                                Severity::Error,
                            ));
                        }
                    }
                }
            }
            tracing::debug!(
                rule = %rule.name,
                findings = findings.len() - before,
                "rule evaluated"
            );
        }

        tracing::info!(
            source = ?document.source(),
            findings = findings.len(),
            "lint finished"
        );
        findings
    }

    /// [`Linter::lint`] wrapped with counts
    pub fn report(&self, document: &Document) -> LintReport {
        LintReport::new(document.source(), self.lint(document))
    }
}

fn finding(
    document: &Document,
    rule: &CompiledRule,
    path: DocPath,
    message: String,
    severity: Severity,
) -> Finding {
    Finding {
        code: rule.name.clone(),
        message,
        range: document.range_for(&path),
        path,
        severity,
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
