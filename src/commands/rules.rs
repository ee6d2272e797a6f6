use super::load_ruleset;
use crate::Result;
use crate::engine::Linter;
use crate::models::ruleset::RuleSeverity;
use colored::*;
use std::path::Path;

pub fn execute_rules(ruleset_path: Option<&Path>) -> Result<()> {
    let ruleset = load_ruleset(ruleset_path)?;
    // Compile first so a broken ruleset is reported rather than listed
    Linter::new(ruleset.clone())?;

    println!("{}", format!("Rules ({}):", ruleset.rules.len()).bold());
    for (name, rule) in &ruleset.rules {
        let severity = match rule.severity {
            RuleSeverity::Error => "error".red(),
            RuleSeverity::Warn => "warn".yellow(),
            RuleSeverity::Info => "info".blue(),
            RuleSeverity::Hint => "hint".normal(),
            RuleSeverity::Off => "off".dimmed(),
        };
        println!();
        println!("  {} [{}]", name.bright_cyan(), severity);
        if let Some(ref description) = rule.description {
            println!("     {}", description);
        }
        println!("     Function: {}", rule.then.function.bright_yellow());
        println!("     Given: {}", rule.given.selectors().join(", "));
        if let Some(ref formats) = rule.formats {
            let formats: Vec<&str> = formats.iter().map(|f| f.display_name()).collect();
            println!("     Formats: {}", formats.join(", "));
        }
        if !rule.resolved {
            println!("     Evaluated on the unresolved document");
        }
    }
    Ok(())
}
