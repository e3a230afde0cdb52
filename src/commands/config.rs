//! Configuration commands: resolve, list, and persist settings.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use super::Output;
use crate::config::{Config, FileConfigSource, setting_kind};
use crate::{Error, Result};

/// Directory holding the user's configuration files.
///
/// `CARAVEL_CONFIG_DIR` overrides the platform location; tests rely on it
/// for per-subprocess isolation.
pub fn user_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CARAVEL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caravel")
}

/// Build the layered store the CLI commands operate on: defaults, the
/// user's `config.json` merged on top, and file-backed primary and auth
/// sources wired in.
pub fn load_config() -> Result<Config> {
    let config_dir = user_config_dir();
    let file_source = FileConfigSource::new(config_dir.join("config.json"));
    let auth_source = FileConfigSource::new(config_dir.join("auth.json"));

    let mut config = Config::new();
    config.merge(file_source.values()?);
    Ok(config
        .with_config_source(Box::new(file_source))
        .with_auth_config_source(Box::new(auth_source)))
}

/// A single resolved setting.
#[derive(Debug, Serialize)]
pub struct ConfigGetResult {
    pub key: String,
    pub value: Value,
}

impl Output for ConfigGetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        display_value(&self.value)
    }
}

/// Resolve one setting by its dotted name.
pub fn config_get(config: &Config, key: &str) -> Result<ConfigGetResult> {
    if !Config::is_key_valid(key) {
        return Err(Error::UnknownKey(key.to_string()));
    }
    Ok(ConfigGetResult {
        key: key.to_string(),
        value: config.get(key)?,
    })
}

/// A setting written to the user configuration file.
#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: Value,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!("Set {} to {}", self.key, display_value(&self.value))
    }
}

/// Validate, normalize, and persist one setting.
///
/// Unlike the resolver's environment path, this is the caller that does
/// consult the validator before normalizing.
pub fn config_set(config: &mut Config, key: &str, raw: &str) -> Result<ConfigSetResult> {
    if !Config::is_key_valid(key) {
        return Err(Error::UnknownKey(key.to_string()));
    }
    let kind = setting_kind(key);
    if !kind.validate(raw) {
        return Err(Error::InvalidValue {
            name: key.to_string(),
            value: raw.to_string(),
        });
    }
    let value = kind.normalize(key, raw)?;
    config.config_source_mut().add_property(key, value.clone())?;
    Ok(ConfigSetResult {
        key: key.to_string(),
        value,
    })
}

/// A setting removed from the user configuration file.
#[derive(Debug, Serialize)]
pub struct ConfigUnsetResult {
    pub key: String,
}

impl Output for ConfigUnsetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!("Unset {}", self.key)
    }
}

/// Remove one setting from the primary configuration source.
pub fn config_unset(config: &mut Config, key: &str) -> Result<ConfigUnsetResult> {
    if !Config::is_key_valid(key) {
        return Err(Error::UnknownKey(key.to_string()));
    }
    config.config_source_mut().remove_property(key)?;
    Ok(ConfigUnsetResult {
        key: key.to_string(),
    })
}

/// Every setting, flattened to dotted names, fully resolved.
#[derive(Debug, Serialize)]
pub struct ConfigListResult {
    pub settings: Map<String, Value>,
}

impl Output for ConfigListResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        self.settings
            .iter()
            .map(|(key, value)| format!("{key} = {}", display_value(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List every setting with its resolved value.
pub fn config_list(config: &Config) -> Result<ConfigListResult> {
    let mut settings = Map::new();
    flatten(&config.all()?, "", &mut settings);
    Ok(ConfigListResult { settings })
}

fn flatten(node: &Map<String, Value>, parent: &str, out: &mut Map<String, Value>) {
    for (key, value) in node {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::Object(child) => flatten(child, &path, out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
