pub mod finding;
pub mod format;
pub mod path;
pub mod ruleset;

pub use finding::{Finding, Severity, Summary, max_severity};
pub use format::SpecFormat;
pub use path::{DocPath, PathSegment};
pub use ruleset::{Given, RuleDefinition, RuleSeverity, Ruleset, Then};
