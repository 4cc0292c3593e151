/// Configuration system for resolvx.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::ResolvxConfig::default()`]
/// 2. **User global config**: `~/.resolvx/config.toml`
/// 3. **Project local config**: `.resolvx.toml` in the current working directory
/// 4. **Environment variables**: `RESOLVX_*` overrides (highest precedence)
///
/// # Usage
///
/// ```rust,ignore
/// use resolvx::config;
///
/// let cfg = config::load();
/// let url = cfg.api.tickets_url(&cfg.web.addr);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub use schema::{ApiConfig, ComplaintConfig, Environment, ProxyConfig, ResolvxConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved resolvx configuration.
///
/// Merges all layers in order: defaults, global TOML, project TOML, env
/// vars.
pub fn load() -> ResolvxConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Overlay the TOML files at `paths` key by key, later files winning, and
/// deserialize the result once. Keys no file sets keep built-in defaults.
fn load_layers(paths: &[Option<PathBuf>]) -> ResolvxConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_layer(path) {
            merge_toml(&mut merged, layer);
        }
    }

    match merged.try_into() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring invalid merged config, using defaults");
            ResolvxConfig::default()
        }
    }
}

/// Read one config layer as a raw TOML tree.
///
/// Missing files yield `None`. Malformed files, and files whose values do
/// not fit the schema, are skipped with a warning so a typo never prevents
/// the dashboard from starting.
fn load_toml_layer(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let layer: toml::Value = match toml::from_str(&content) {
        Ok(layer) => layer,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            return None;
        }
    };
    if let Err(e) = layer.clone().try_into::<ResolvxConfig>() {
        warn!(path = %path.display(), error = %e, "ignoring invalid config file");
        return None;
    }
    Some(layer)
}

/// Recursively overlay `overlay` onto `base`. Tables merge per key; any
/// other value replaces what was there.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.resolvx/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".resolvx").join("config.toml"))
}

/// Path to the project local config: `.resolvx.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".resolvx.toml"))
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
/// - `RESOLVX_ENVIRONMENT`: `auto`, `development` or `production`
/// - `RESOLVX_PROXY_URL`: local proxy origin
/// - `RESOLVX_CRM_URL`: production CRM origin
/// - `RESOLVX_TIMEOUT_SECS`: dashboard load timeout
/// - `RESOLVX_WEB_ADDR`: dashboard bind address
/// - `RESOLVX_LOG_LEVEL`: default log filter
fn apply_env_overrides(config: &mut ResolvxConfig) {
    if let Ok(val) = std::env::var("RESOLVX_ENVIRONMENT")
        && let Some(environment) = parse_environment(&val)
    {
        config.api.environment = environment;
    }
    if let Ok(val) = std::env::var("RESOLVX_PROXY_URL")
        && !val.is_empty()
    {
        config.api.proxy_url = val;
    }
    if let Ok(val) = std::env::var("RESOLVX_CRM_URL")
        && !val.is_empty()
    {
        config.api.crm_url = val;
    }
    if let Ok(val) = std::env::var("RESOLVX_TIMEOUT_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.api.dashboard_timeout_secs = secs;
    }
    if let Ok(val) = std::env::var("RESOLVX_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("RESOLVX_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse an environment string.
fn parse_environment(val: &str) -> Option<schema::Environment> {
    match val.to_ascii_lowercase().as_str() {
        "auto" => Some(schema::Environment::Auto),
        "development" | "dev" => Some(schema::Environment::Development),
        "production" | "prod" => Some(schema::Environment::Production),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.resolvx/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.resolvx/ directory")?;
    }

    fs::write(&path, ResolvxConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.environment`. When no file exists yet,
/// the defaults are written out first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ResolvxConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject values that would make the file unloadable.
    let updated =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<ResolvxConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
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
