//! Configuration management for `benchdiff`.
//!
//! Handles:
//! - Layered configuration (CLI > env > project > user > defaults)
//! - YAML config files flattened to dotted keys
//! - Resolution of the merged layer into a typed [`CompareConfig`]

use crate::collect::DEFAULT_TOOL;
use crate::diff::DEFAULT_THRESHOLD_PERCENT;
use crate::error::{BenchDiffError, Result};
use crate::model::NamingMode;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project config file name, looked up in the repository root.
pub const PROJECT_CONFIG_FILE: &str = ".benchdiff.yaml";

/// Prefix of recognized environment variables.
pub const ENV_PREFIX: &str = "BENCHDIFF_";

/// Baseline revision used when nothing else is configured.
pub const DEFAULT_BASELINE: &str = "main";

/// Filter passed to the tool when nothing else is configured.
pub const DEFAULT_FILTER: &str = "*";

const KEY_BASELINE: &[&str] = &["baseline"];
const KEY_THRESHOLD: &[&str] = &["threshold"];
const KEY_FILTER: &[&str] = &["filter"];
const KEY_FULL_NAMES: &[&str] = &["full-names"];
const KEY_TOOL: &[&str] = &["tool", "tool.command"];
const KEY_ARTIFACTS_DIR: &[&str] = &["artifacts-dir", "tool.artifacts-dir"];

/// One configuration source, as normalized key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)
            .map_err(|e| BenchDiffError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `BENCHDIFF_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from the `BENCHDIFF_*` entries of `vars`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }

    /// Insert `value` under the normalized form of `key`.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// First non-empty value among `keys`.
    #[must_use]
    pub fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.values.get(&normalize_key(key)))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// Values given on the command line; `None` leaves lower layers in effect.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub baseline: Option<String>,
    pub threshold: Option<f64>,
    pub filter: Option<String>,
    pub full_names: Option<bool>,
    pub tool: Option<String>,
    pub artifacts_dir: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(baseline) = &self.baseline {
            layer.insert("baseline", baseline.clone());
        }
        if let Some(threshold) = self.threshold {
            layer.insert("threshold", threshold.to_string());
        }
        if let Some(filter) = &self.filter {
            layer.insert("filter", filter.clone());
        }
        if let Some(full_names) = self.full_names {
            layer.insert("full-names", full_names.to_string());
        }
        if let Some(tool) = &self.tool {
            layer.insert("tool", tool.clone());
        }
        if let Some(dir) = &self.artifacts_dir {
            layer.insert("artifacts-dir", dir.to_string_lossy().to_string());
        }

        layer
    }
}

/// Fully resolved settings for one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub baseline: String,
    pub threshold_percent: f64,
    pub filter: String,
    pub naming: NamingMode,
    pub tool: String,
    /// `None` means a private temporary directory.
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE.to_string(),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            filter: DEFAULT_FILTER.to_string(),
            naming: NamingMode::Short,
            tool: DEFAULT_TOOL.to_string(),
            artifacts_dir: None,
        }
    }
}

impl CompareConfig {
    /// Resolve a merged layer, falling back to defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns `BenchDiffError::Config` for an invalid threshold or flag.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();

        let threshold_percent = match layer.get(KEY_THRESHOLD) {
            Some(raw) => parse_threshold(raw)?,
            None => defaults.threshold_percent,
        };
        let full_names = match layer.get(KEY_FULL_NAMES) {
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                BenchDiffError::Config(format!("full-names: expected a boolean, got '{raw}'"))
            })?,
            None => false,
        };

        Ok(Self {
            baseline: layer
                .get(KEY_BASELINE)
                .map_or(defaults.baseline, ToString::to_string),
            threshold_percent,
            filter: layer
                .get(KEY_FILTER)
                .map_or(defaults.filter, ToString::to_string),
            naming: NamingMode::from_full_names(full_names),
            tool: layer.get(KEY_TOOL).map_or(defaults.tool, ToString::to_string),
            artifacts_dir: layer.get(KEY_ARTIFACTS_DIR).map(PathBuf::from),
        })
    }
}

/// Load project config (`<repo>/.benchdiff.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(repo: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&repo.join(PROJECT_CONFIG_FILE))
}

/// Load user config (`~/.config/benchdiff/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(home: Option<&Path>) -> Result<ConfigLayer> {
    let Some(home) = home else {
        return Ok(ConfigLayer::default());
    };
    let path = home.join(".config").join("benchdiff").join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load configuration for the repository at `repo` with the usual precedence.
///
/// # Errors
///
/// Returns an error if a config file is malformed or a value is invalid.
pub fn load_config(repo: &Path, cli: &CliOverrides) -> Result<CompareConfig> {
    let home = env::var_os("HOME").map(PathBuf::from);
    load_config_from(repo, home.as_deref(), ConfigLayer::from_env(), cli)
}

/// [`load_config`] with the home directory and environment layer supplied.
///
/// # Errors
///
/// Returns an error if a config file is malformed or a value is invalid.
pub fn load_config_from(
    repo: &Path,
    home: Option<&Path>,
    env_layer: ConfigLayer,
    cli: &CliOverrides,
) -> Result<CompareConfig> {
    let user = load_user_config(home)?;
    let project = load_project_config(repo)?;
    let merged = ConfigLayer::merge_layers(&[user, project, env_layer, cli.as_layer()]);
    let config = CompareConfig::from_layer(&merged)?;
    debug!(?config, "Resolved configuration");
    Ok(config)
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value = raw.parse::<f64>().map_err(|_| {
        BenchDiffError::Config(format!("threshold: expected a number, got '{raw}'"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(BenchDiffError::Config(format!(
            "threshold: must be a non-negative percentage, got '{raw}'"
        )));
    }
    Ok(value)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
