pub mod lint;
pub mod rules;

pub use lint::execute_lint;
pub use rules::execute_rules;

use crate::Result;
use crate::models::ruleset::Ruleset;
use std::path::Path;

/// The ruleset at `path`, or the bundled one
pub(crate) fn load_ruleset(path: Option<&Path>) -> Result<Ruleset> {
    match path {
        Some(path) => Ruleset::load(path),
        None => Ruleset::builtin(),
    }
}
