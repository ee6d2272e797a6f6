use super::{FunctionContext, RuleFunction, Violation, display_value};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValues {
    pub values: Vec<String>,
}

fn lowered(items: &[Value]) -> Vec<String> {
    items.iter().map(|item| display_value(item).to_lowercase()).collect()
}

/// Every configured value must appear in the enum
pub struct EnumAllOf(pub EnumValues);

impl RuleFunction for EnumAllOf {
    fn name(&self) -> &'static str {
        "enumAllOf"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(items) = target.as_array() else {
            return Vec::new();
        };
        let present = lowered(items);
        let missing: Vec<&str> = self
            .0
            .values
            .iter()
            .filter(|required| !present.contains(&required.to_lowercase()))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "missing required values: {}",
            missing.join(", ")
        ))]
    }
}

/// Every enum value must come from the configured list
pub struct EnumAnyOf(pub EnumValues);

impl RuleFunction for EnumAnyOf {
    fn name(&self) -> &'static str {
        "enumAnyOf"
    }

    fn check(&self, target: &Value, _ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(items) = target.as_array() else {
            return Vec::new();
        };
        let allowed: Vec<String> = self.0.values.iter().map(|v| v.to_lowercase()).collect();
        let disallowed: Vec<String> = items
            .iter()
            .map(display_value)
            .filter(|value| !allowed.contains(&value.to_lowercase()))
            .collect();
        if disallowed.is_empty() {
            return Vec::new();
        }
        vec![Violation::new(format!(
            "values not allowed: {}",
            disallowed.join(", ")
        ))]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BooleanEnumOptions {
    /// Report when the enum is *not* a boolean-like pair instead
    pub should_match: bool,
    pub case_sensitive: bool,
}

/// Flags two-value enums such as `[yes, no]` that should be booleans
pub struct BooleanEnum(pub BooleanEnumOptions);

impl BooleanEnum {
    fn signature<'s>(&self, values: impl Iterator<Item = &'s str>) -> String {
        let mut normalized: Vec<String> = values
            .map(|value| {
                if self.0.case_sensitive {
                    value.to_string()
                } else {
                    value.to_lowercase()
                }
            })
            .collect();
        normalized.sort();
        normalized.join(",")
    }
}

impl RuleFunction for BooleanEnum {
    fn name(&self) -> &'static str {
        "booleanEnum"
    }

    fn check(&self, target: &Value, ctx: &FunctionContext<'_>) -> Vec<Violation> {
        let Some(items) = target.as_array() else {
            return Vec::new();
        };
        let rendered: Vec<String> = items.iter().map(display_value).collect();
        let given = self.signature(rendered.iter().map(String::as_str));
        let matched = ctx
            .vocabulary
            .boolean_enum_pairs
            .iter()
            .any(|pair| self.signature(pair.iter().map(String::as_str)) == given);

        match (matched, self.0.should_match) {
            (true, false) => vec![Violation::new("Given matches target enums")],
            (false, true) => vec![Violation::new("Given does not match target enums")],
            _ => Vec::new(),
        }
    }
}
