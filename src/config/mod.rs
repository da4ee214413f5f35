/// Configuration system for fuelform.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — [`schema::FuelformConfig::default()`]
/// 2. **User global config** — `~/.fuelform/config.toml`
/// 3. **Project local config** — `.fuelform.toml` in the current directory
/// 4. **Environment variables** — `FUELFORM_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key. A file that does not
/// parse, or whose values have the wrong types, is skipped as a whole.
///
/// # Usage
///
/// ```rust,ignore
/// use fuelform::config;
///
/// let cfg = config::load();
/// let parsed = fuelform::input::parse_with(text, &cfg.input.parser_options());
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::FuelformConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> FuelformConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the TOML files at `paths`, in order, over the built-in defaults.
fn load_layers(paths: &[Option<PathBuf>]) -> FuelformConfig {
    let mut merged = toml::Table::new();
    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_table(path) {
            merge_tables(&mut merged, layer);
        }
    }
    toml::Value::Table(merged).try_into().unwrap_or_default()
}

/// Read a config file as a raw TOML table.
///
/// Returns `None` if the file is missing, is not TOML, or does not
/// deserialize into [`FuelformConfig`] on its own.
fn load_toml_table(path: &Path) -> Option<toml::Table> {
    let content = fs::read_to_string(path).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    toml::Value::Table(table.clone())
        .try_into::<FuelformConfig>()
        .ok()?;
    Some(table)
}

/// Deep-merge `overlay` into `base`. Nested tables merge; anything else in
/// the overlay replaces the base value.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.fuelform/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fuelform").join("config.toml"))
}

/// Path to the project local config: `.fuelform.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".fuelform.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `NO_COLOR` — any value disables colored output
/// - `FUELFORM_COLOR` — colored output (`1`/`true`/`yes`/`on`)
/// - `FUELFORM_FORMAT` — default output format (`table`, `json`, `csv`)
/// - `FUELFORM_LENIENT_QUOTES` — single-quote retry
/// - `FUELFORM_EXPECTED_FEATURES` — features per segment, `0` = any
/// - `FUELFORM_DECIMALS` — decimal places for fuel values
/// - `FUELFORM_LOG` — parse event logging
/// - `FUELFORM_LOG_PATH` — parse event log location
fn apply_env_overrides<F>(config: &mut FuelformConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    // General
    if var("NO_COLOR").is_some() {
        config.general.color = false;
    }
    if let Some(val) = var("FUELFORM_COLOR") {
        config.general.color = is_truthy(&val);
    }
    if let Some(val) = var("FUELFORM_FORMAT") {
        config.general.format =
            schema::OutputFormat::from_str_or(Some(&val), config.general.format);
    }

    // Input
    if let Some(val) = var("FUELFORM_LENIENT_QUOTES") {
        config.input.lenient_quotes = is_truthy(&val);
    }
    if let Some(val) = var("FUELFORM_EXPECTED_FEATURES")
        && let Ok(n) = val.trim().parse::<usize>()
    {
        config.input.expected_features = n;
    }

    // Display
    if let Some(val) = var("FUELFORM_DECIMALS")
        && let Ok(n) = val.trim().parse::<usize>()
    {
        config.display.decimals = n;
    }

    // Logging
    if let Some(val) = var("FUELFORM_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = var("FUELFORM_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.fuelform/config.toml`.
///
/// Creates the `~/.fuelform/` directory if needed. Returns an error if the
/// file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.fuelform/ directory")?;
    }

    fs::write(&path, FuelformConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `input.expected_features`. The updated file
/// must still deserialize, otherwise nothing is written.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    // Start from the existing file, or from serialized defaults so every
    // known key is present with its type.
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&FuelformConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<FuelformConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse according to the type already stored under the key.
    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fuelform-config-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_files_gives_defaults() {
        let dir = scratch_dir("none");
        let config = load_layers(&[Some(dir.join("missing.toml")), None]);
        assert_eq!(config, FuelformConfig::default());
    }

    #[test]
    fn project_layer_overrides_global_key_by_key() {
        let dir = scratch_dir("layers");
        let global = dir.join("global.toml");
        let project = dir.join("project.toml");
        fs::write(&global, "[display]\ndecimals = 4\nbar_width = 10\n").unwrap();
        fs::write(&project, "[display]\ndecimals = 1\n").unwrap();

        let config = load_layers(&[Some(global), Some(project)]);
        assert_eq!(config.display.decimals, 1);
        assert_eq!(config.display.bar_width, 10);
    }

    #[test]
    fn malformed_layer_is_skipped() {
        let dir = scratch_dir("malformed");
        let global = dir.join("global.toml");
        let project = dir.join("project.toml");
        fs::write(&global, "[display]\ndecimals = 4\n").unwrap();
        fs::write(&project, "[display]\ndecimals = \"many\"\n").unwrap();

        let config = load_layers(&[Some(global), Some(project)]);
        assert_eq!(config.display.decimals, 4);
    }

    #[test]
    fn env_overrides_apply_last() {
        let mut config = FuelformConfig::default();
        let env = env_from(&[
            ("NO_COLOR", "1"),
            ("FUELFORM_FORMAT", "json"),
            ("FUELFORM_LENIENT_QUOTES", "off"),
            ("FUELFORM_EXPECTED_FEATURES", "9"),
            ("FUELFORM_DECIMALS", "nope"),
            ("FUELFORM_LOG", "0"),
        ]);
        apply_env_overrides(&mut config, env);

        assert!(!config.general.color);
        assert_eq!(config.general.format, schema::OutputFormat::Json);
        assert!(!config.input.lenient_quotes);
        assert_eq!(config.input.expected_features, 9);
        assert_eq!(config.display.decimals, 2);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("On"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_by_type() {
        let mut root: toml::Value =
            toml::from_str("[input]\nlenient_quotes = true\nexpected_features = 0\n").unwrap();
        set_toml_value(&mut root, "input.lenient_quotes", "no").unwrap();
        set_toml_value(&mut root, "input.expected_features", "9").unwrap();

        let input = root["input"].as_table().unwrap();
        assert_eq!(input["lenient_quotes"].as_bool(), Some(false));
        assert_eq!(input["expected_features"].as_integer(), Some(9));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[input]\nlenient_quotes = true\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "input.typo", "x").is_err());
        assert!(set_toml_value(&mut root, "input.expected_features", "x").is_err());
    }

    #[test]
    fn set_config_value_writes_fresh_file() {
        let dir = scratch_dir("set");
        let path = dir.join("nested").join("config.toml");
        set_config_value_at(&path, "display.decimals", "3").unwrap();

        let written: FuelformConfig =
            toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.display.decimals, 3);
        assert_eq!(written.logging, schema::LoggingConfig::default());
    }

    #[test]
    fn set_config_value_rejects_invalid_enum() {
        let dir = scratch_dir("enum");
        let path = dir.join("config.toml");
        assert!(set_config_value_at(&path, "general.format", "xml").is_err());
        assert!(!path.exists());
    }
}
