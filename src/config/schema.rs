/// Configuration schema and defaults for fuelform.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[general]`, `[input]`, `[display]`, and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::input::ParserOptions;
use crate::request::form::FormRules;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level fuelform configuration.
///
/// Maps directly to `~/.fuelform/config.toml` and `.fuelform.toml`. All
/// sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelformConfig {
    pub general: GeneralConfig,
    pub input: InputConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

/// Output format for commands that print data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name, falling back to `default` when unknown or absent.
    pub fn from_str_or(s: Option<&str>, default: Self) -> Self {
        match s.map(str::to_ascii_lowercase).as_deref() {
            Some("table") => Self::Table,
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => default,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Colored terminal output. `NO_COLOR` in the environment also disables it.
    pub color: bool,
    /// Default output format when `--format` is not given.
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// [input]
// ---------------------------------------------------------------------------

/// Input parsing and validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Retry structured input with single quotes turned into double quotes.
    pub lenient_quotes: bool,
    /// Accept quoted numbers like `'1'` in the single-quote retry.
    pub coerce_numeric_strings: bool,
    /// Required features per segment. `0` accepts any count.
    pub expected_features: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            lenient_quotes: true,
            coerce_numeric_strings: true,
            expected_features: 0,
        }
    }
}

impl InputConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            lenient_quotes: self.lenient_quotes,
            coerce_numeric_strings: self.coerce_numeric_strings,
        }
    }

    pub fn form_rules(&self) -> FormRules {
        FormRules {
            parser: self.parser_options(),
            expected_features: (self.expected_features > 0).then_some(self.expected_features),
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Result rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for fuel values.
    pub decimals: usize,
    /// Width of the longest bar in the route breakdown (columns).
    pub bar_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            bar_width: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Parse event logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether parse events are appended to the log.
    pub enabled: bool,
    /// Path to the JSONL log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.fuelform/parse-log.jsonl".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The log path with a leading `~` expanded. `None` if the home
    /// directory is unknown.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        expand_tilde(&self.path)
    }
}

fn expand_tilde(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl FuelformConfig {
    /// Annotated default config file written by `fuelform config init`.
    pub fn default_toml() -> String {
        r#"# fuelform configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (FUELFORM_*)
#   2. Project config (.fuelform.toml in current directory)
#   3. User global config (~/.fuelform/config.toml)
#   4. Built-in defaults

[general]
color = true
format = "table"              # table | json | csv

[input]
lenient_quotes = true         # retry [['1',2]] style input with double quotes
coerce_numeric_strings = true # accept quoted numbers in that retry
expected_features = 0         # features per segment, 0 = any

[display]
decimals = 2
bar_width = 30

[logging]
enabled = true
path = "~/.fuelform/parse-log.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_defaults() {
        let parsed: FuelformConfig = toml::from_str(&FuelformConfig::default_toml()).unwrap();
        assert_eq!(parsed, FuelformConfig::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: FuelformConfig = toml::from_str("[display]\ndecimals = 3\n").unwrap();
        assert_eq!(parsed.display.decimals, 3);
        assert_eq!(parsed.display.bar_width, 30);
        assert!(parsed.input.lenient_quotes);
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!(
            OutputFormat::from_str_or(Some("JSON"), OutputFormat::Table),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_str_or(Some("xml"), OutputFormat::Csv),
            OutputFormat::Csv
        );
        assert_eq!(
            OutputFormat::from_str_or(None, OutputFormat::Table),
            OutputFormat::Table
        );
    }

    #[test]
    fn form_rules_treat_zero_as_any_width() {
        let mut input = InputConfig::default();
        assert_eq!(input.form_rules().expected_features, None);
        input.expected_features = 9;
        assert_eq!(input.form_rules().expected_features, Some(9));
    }

    #[test]
    fn absolute_log_path_is_kept() {
        let logging = LoggingConfig {
            enabled: true,
            path: "/tmp/fuelform.jsonl".to_string(),
        };
        assert_eq!(
            logging.resolved_path(),
            Some(PathBuf::from("/tmp/fuelform.jsonl"))
        );
    }
}
