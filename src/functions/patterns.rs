use super::{FunctionContext, RuleFunction, Violation, compile_regex};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RegexSamplesOptions {
    /// Vocabulary sample set to test against
    pub sample_set: String,
    /// Replace the set's positive samples
    pub should_match: Option<Vec<String>>,
    /// Replace the set's negative samples
    pub should_not_match: Option<Vec<String>>,
}

impl Default for RegexSamplesOptions {
    fn default() -> Self {
        Self {
            sample_set: "rfc5322-date".to_string(),
            should_match: None,
            should_not_match: None,
        }
    }
}

/// Tests a schema `pattern` against known-good and known-bad samples
pub struct RegexSamples(pub RegexSamplesOptions);

fn quoted(samples: &[&str]) -> String {
    samples
        .iter()
        .map(|sample| format!("\"{}\"", sample))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RuleFunction for RegexSamples {
    fn name(&self) -> &'static str {
        "regexSamples"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(source) = target.as_str() else {
            return Vec::new();
        };
        let regex = match compile_regex(source) {
            Ok(regex) => regex,
            Err(e) => {
                return vec![Violation::new(format!(
                    "failed to parse regex `{}`: {}",
                    source, e
                ))];
            }
        };

        let set = ctx.vocabulary.sample_sets.get(&self.0.sample_set);
        let should_match: Vec<&str> = match (&self.0.should_match, set) {
            (Some(samples), _) => samples.iter().map(String::as_str).collect(),
            (None, Some(set)) => set.should_match.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        };
        let should_not_match: Vec<&str> = match (&self.0.should_not_match, set) {
            (Some(samples), _) => samples.iter().map(String::as_str).collect(),
            (None, Some(set)) => set.should_not_match.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        };
        if set.is_none() && should_match.is_empty() && should_not_match.is_empty() {
            tracing::debug!(
                rule = ctx.rule,
                sample_set = %self.0.sample_set,
                "no samples available for regexSamples"
            );
        }

        let mut violations = Vec::new();
        let missed: Vec<&str> = should_match
            .into_iter()
            .filter(|sample| !regex.is_match(sample))
            .collect();
        if !missed.is_empty() {
            violations.push(Violation::new(format!(
                "pattern `{}` does not match {}",
                source,
                quoted(&missed)
            )));
        }
        let accepted: Vec<&str> = should_not_match
            .into_iter()
            .filter(|sample| regex.is_match(sample))
            .collect();
        if !accepted.is_empty() {
            violations.push(Violation::new(format!(
                "pattern `{}` should not match {}",
                source,
                quoted(&accepted)
            )));
        }
        violations
    }
}
