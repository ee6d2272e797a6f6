use crate::models::finding::Severity;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oaslint")]
#[command(version)]
#[command(about = "Rule-based linter for OpenAPI 2 and 3 documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint one or more OpenAPI documents
    Lint {
        /// Documents to lint (YAML or JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Ruleset file (the bundled ruleset if not specified)
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Exit with status 1 when a finding is at least this severe
        #[arg(long, default_value = "error")]
        fail_on: FailOn,
    },

    /// List the rules of a ruleset
    Rules {
        /// Ruleset file (the bundled ruleset if not specified)
        #[arg(short, long)]
        ruleset: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored, one line per finding
    Text,
    /// Findings as JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    Error,
    Warn,
    Info,
    Hint,
}

impl From<FailOn> for Severity {
    fn from(value: FailOn) -> Self {
        match value {
            FailOn::Error => Severity::Error,
            FailOn::Warn => Severity::Warn,
            FailOn::Info => Severity::Info,
            FailOn::Hint => Severity::Hint,
        }
    }
}
