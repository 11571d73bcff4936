use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::ChatRankConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chatrank.toml",
    "chatrank.yaml",
    "chatrank.yml",
    "chatrank.json",
];

/// Environment variables that override individual counter settings.
pub const ENV_TRIGGER_KEYWORD: &str = "CHATRANK_TRIGGER_KEYWORD";
pub const ENV_RESULT_LIMIT: &str = "CHATRANK_RESULT_LIMIT";
pub const ENV_RETENTION_HOURS: &str = "CHATRANK_RETENTION_HOURS";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ChatRankConfig> {
    let raw = read_config(path)?;
    parse_config(&raw, path)
}

/// Load the config file as a generic JSON value, for validation.
pub fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    let raw = read_config(path)?;
    parse_config_value(&raw, path)
}

/// Discover and load config from standard locations, then apply env
/// overrides.
///
/// Search order:
/// 1. `./chatrank.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/chatrank/chatrank.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `ChatRankConfig::default()` if no config file is found or
/// the file cannot be loaded.
pub fn discover_and_load() -> ChatRankConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        load_config(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            ChatRankConfig::default()
        })
    } else {
        debug!("no config file found, using defaults");
        ChatRankConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

/// Find the first config file in standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/chatrank/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "chatrank").map(|d| d.config_dir().to_path_buf())
}

/// Apply `CHATRANK_*` environment overrides on top of a loaded config.
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_env_overrides(config: &mut ChatRankConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_env_overrides_with(
    config: &mut ChatRankConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(keyword) = lookup(ENV_TRIGGER_KEYWORD) {
        debug!(var = ENV_TRIGGER_KEYWORD, "overriding trigger keyword");
        config.counter.trigger_keyword = keyword;
    }
    if let Some(raw) = lookup(ENV_RESULT_LIMIT) {
        match raw.trim().parse() {
            Ok(limit) => config.counter.result_limit = limit,
            Err(e) => warn!(var = ENV_RESULT_LIMIT, value = %raw, error = %e, "ignoring invalid override"),
        }
    }
    if let Some(raw) = lookup(ENV_RETENTION_HOURS) {
        match raw.trim().parse() {
            Ok(hours) => config.counter.retention_hours = hours,
            Err(e) => warn!(var = ENV_RETENTION_HOURS, value = %raw, error = %e, "ignoring invalid override"),
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(substitute_env(&raw))
}

fn config_extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}

fn parse_config(raw: &str, path: &Path) -> Result<ChatRankConfig> {
    match config_extension(path) {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        ext => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}

pub(crate) fn parse_config_value(raw: &str, path: &Path) -> Result<serde_json::Value> {
    match config_extension(path) {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        ext => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
