use std::io::IsTerminal;

const DEFAULT_FILTER: &str = "oaslint=warn";

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is unset or invalid
    pub default_filter: String,
    pub ansi: bool,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let format = std::env::var("OASLINT_LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();

        let default_filter = std::env::var("OASLINT_LOG_LEVEL")
            .map(|level| format!("oaslint={}", level.trim()))
            .unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Self {
            format,
            default_filter,
            ansi: std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_filter: DEFAULT_FILTER.to_string(),
            ansi: false,
        }
    }
}
