//! Rule-based linting for OpenAPI 2 (Swagger) and OpenAPI 3 documents.
//!
//! ```no_run
//! use oaslint::{Linter, loader};
//!
//! let linter = Linter::builtin()?;
//! let document = loader::load_document("openapi.yaml")?;
//! for finding in linter.lint(&document) {
//!     println!("{}", finding.format());
//! }
//! # Ok::<(), oaslint::LintError>(())
//! ```

pub mod casing;
pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod functions;
pub mod loader;
pub mod models;
pub mod query;
pub mod schema;
pub mod telemetry;
pub mod vocabulary;

pub use engine::{LintReport, Linter};
pub use error::{LintError, Result};
pub use loader::Document;
pub use models::{Finding, Ruleset, Severity, SpecFormat};
