use super::load_ruleset;
use crate::cli::ReportFormat;
use crate::engine::{LintReport, Linter};
use crate::models::finding::{Finding, Severity};
use crate::models::path::display_path;
use crate::{Result, loader};
use colored::*;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Lint every file and print the reports. Returns `true` when the run should
/// fail: a finding reached `fail_on` or a document could not be loaded.
pub fn execute_lint(
    files: &[PathBuf],
    ruleset_path: Option<&Path>,
    format: ReportFormat,
    fail_on: Severity,
) -> Result<bool> {
    let linter = Linter::new(load_ruleset(ruleset_path)?)?;
    tracing::debug!(rules = linter.rules().len(), "linter ready");

    let mut failed = false;
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        match loader::load_document(file) {
            Ok(document) => {
                let report = linter.report(&document);
                failed |= report.fails(fail_on);
                reports.push((file.as_path(), report));
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), "failed to load document: {}", e);
                eprintln!("{} {}: {}", "✗".red().bold(), file.display(), e.to_string().red());
                failed = true;
            }
        }
    }

    match format {
        ReportFormat::Text => print_text(&reports),
        ReportFormat::Json => print_json(&reports)?,
    }
    Ok(failed)
}

fn print_text(reports: &[(&Path, LintReport)]) {
    for (file, report) in reports {
        println!("{}", file.display().to_string().bold());
        if report.findings.is_empty() {
            println!("  {}", "✓ No findings".green());
            println!();
            continue;
        }
        for finding in &report.findings {
            println!("  {}", format_finding(finding));
        }
        let summary = &report.summary;
        println!(
            "  {} {} errors, {} warnings, {} infos, {} hints",
            "Σ".bold(),
            summary.errors.to_string().red(),
            summary.warnings.to_string().yellow(),
            summary.infos.to_string().blue(),
            summary.hints.to_string().dimmed()
        );
        println!();
    }
}

fn format_finding(finding: &Finding) -> String {
    let severity = match finding.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warn => "warn".yellow().bold(),
        Severity::Info => "info".blue(),
        Severity::Hint => "hint".dimmed(),
    };
    format!(
        "{:>4}:{:<3} {:<5} {}  {}  {}",
        finding.range.start.line + 1,
        finding.range.start.character + 1,
        severity,
        finding.code.cyan(),
        finding.message,
        display_path(&finding.path).dimmed()
    )
}

fn print_json(reports: &[(&Path, LintReport)]) -> Result<()> {
    let json = match reports {
        [(_, report)] => serde_json::to_string_pretty(&report.findings)?,
        _ => {
            let by_file: IndexMap<String, &Vec<Finding>> = reports
                .iter()
                .map(|(file, report)| (file.display().to_string(), &report.findings))
                .collect();
            serde_json::to_string_pretty(&by_file)?
        }
    };
    println!("{}", json);
    Ok(())
}
