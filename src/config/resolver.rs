//! Layered resolution of setting values.
//!
//! [`Config`] owns the settings tree (seeded from the default schema) and
//! resolves reads with this precedence:
//!
//! 1. `CARAVEL_*` environment variable (when environment lookup is
//!    enabled), passed through the setting's registered normalizer
//! 2. The settings tree (defaults plus anything [`Config::merge`]d in)
//! 3. The caller-supplied default
//!
//! String results are interpolated: every `{other.key}` span is replaced
//! by that setting's resolved value, recursively. An in-flight set of
//! names guards the recursion; circular references fail with
//! [`Error::CircularReference`] instead of overflowing the stack.
//!
//! The environment is injected via [`EnvSource`] so the engine stays free
//! of hidden global state; [`OsEnv`] is the production implementation.

use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::schema::{self, setting_kind};
use crate::config::source::{ConfigSource, DictConfigSource};
use crate::{Error, Result};

/// Prefix for environment-variable overrides of settings.
pub const SETTINGS_ENV_PREFIX: &str = "CARAVEL_";

/// Read-only provider of environment variables.
pub trait EnvSource {
    /// Look up a variable by its exact name.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
pub struct OsEnv;

impl EnvSource for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Environment variable recognized as an override for a setting name.
///
/// Dots and dashes both map to underscores: `virtualenvs.in-project`
/// becomes `CARAVEL_VIRTUALENVS_IN_PROJECT`.
pub fn env_var_name(name: &str) -> String {
    let mut var = String::from(SETTINGS_ENV_PREFIX);
    for (i, segment) in name.split('.').enumerate() {
        if i > 0 {
            var.push('_');
        }
        for ch in segment.chars() {
            var.push(match ch {
                '-' => '_',
                c => c.to_ascii_uppercase(),
            });
        }
    }
    var
}

/// The layered configuration store.
pub struct Config {
    config: Map<String, Value>,
    use_environment: bool,
    env: Box<dyn EnvSource>,
    config_source: Box<dyn ConfigSource>,
    auth_config_source: Box<dyn ConfigSource>,
}

impl Config {
    /// Create a store holding only the default schema, with environment
    /// lookup enabled and in-memory configuration sources.
    pub fn new() -> Self {
        Self {
            config: schema::default_config().clone(),
            use_environment: true,
            env: Box::new(OsEnv),
            config_source: Box::new(DictConfigSource::new()),
            auth_config_source: Box::new(DictConfigSource::new()),
        }
    }

    /// Enable or disable environment-variable overrides.
    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.use_environment = enabled;
        self
    }

    /// Replace the environment provider.
    pub fn with_env_source(mut self, env: Box<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    /// Replace the primary configuration source.
    pub fn with_config_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.config_source = source;
        self
    }

    /// Replace the authentication-scoped configuration source.
    pub fn with_auth_config_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.auth_config_source = source;
        self
    }

    /// The primary configuration source.
    pub fn config_source_mut(&mut self) -> &mut dyn ConfigSource {
        self.config_source.as_mut()
    }

    /// The authentication-scoped configuration source.
    pub fn auth_config_source_mut(&mut self) -> &mut dyn ConfigSource {
        self.auth_config_source.as_mut()
    }

    /// Deep-merge an override tree into the settings tree.
    ///
    /// Nested maps merge recursively; anything else replaces the existing
    /// value at that key. No validation happens here; unknown keys are
    /// accepted silently.
    pub fn merge(&mut self, overrides: Map<String, Value>) {
        merge_maps(&mut self.config, overrides);
    }

    /// The internal settings tree, without interpolation.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Resolve a setting; a missing key yields `Value::Null`.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.get_or(name, Value::Null)
    }

    /// Resolve a setting, falling back to `default` when no segment path
    /// through the tree matches. The fallback is interpolated too.
    pub fn get_or(&self, name: &str, default: Value) -> Result<Value> {
        let mut active = HashSet::from([name.to_string()]);
        self.resolve(name, default, &mut active)
    }

    /// The settings tree with every leaf fully resolved (environment
    /// overrides and interpolation applied).
    pub fn all(&self) -> Result<Map<String, Value>> {
        self.collect(&self.config, "")
    }

    /// Whether a dotted name addresses a leaf of the default schema.
    pub fn is_key_valid(name: &str) -> bool {
        schema::is_key_valid(name)
    }

    /// Derived location of the repository cache:
    /// `{cache-dir}/cache/repositories`.
    pub fn repo_cache_dir(&self) -> Result<PathBuf> {
        match self.get("cache-dir")? {
            Value::String(dir) => Ok(PathBuf::from(dir).join("cache").join("repositories")),
            other => Err(Error::InvalidValue {
                name: "cache-dir".to_string(),
                value: other.to_string(),
            }),
        }
    }

    fn collect(&self, node: &Map<String, Value>, parent: &str) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in node {
            let path = if parent.is_empty() {
                key.clone()
            } else {
                format!("{parent}.{key}")
            };
            let resolved = match value {
                Value::Object(child) => Value::Object(self.collect(child, &path)?),
                _ => self.get(&path)?,
            };
            out.insert(key.clone(), resolved);
        }
        Ok(out)
    }

    fn resolve(&self, name: &str, default: Value, active: &mut HashSet<String>) -> Result<Value> {
        if self.use_environment {
            if let Some(raw) = self.env.var(&env_var_name(name)) {
                let normalized = setting_kind(name).normalize(name, &raw)?;
                return self.process(normalized, active);
            }
        }

        let mut current = &self.config;
        let mut segments = name.split('.').peekable();
        while let Some(segment) = segments.next() {
            let Some(value) = current.get(segment) else {
                return self.process(default, active);
            };
            if segments.peek().is_none() {
                return self.process(value.clone(), active);
            }
            match value {
                Value::Object(child) => current = child,
                _ => return self.process(default, active),
            }
        }
        self.process(default, active)
    }

    /// Interpolate `{key}` placeholders if the value is a string;
    /// anything else passes through unchanged.
    fn process(&self, value: Value, active: &mut HashSet<String>) -> Result<Value> {
        match value {
            Value::String(s) => self.interpolate(&s, active),
            other => Ok(other),
        }
    }

    fn interpolate(&self, input: &str, active: &mut HashSet<String>) -> Result<Value> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                // Unterminated span: literal text.
                out.push('{');
                out.push_str(after);
                return Ok(Value::String(out));
            };
            let name = &after[..close];
            if name.is_empty() {
                out.push_str("{}");
            } else {
                if !active.insert(name.to_string()) {
                    return Err(Error::CircularReference(name.to_string()));
                }
                let value = self.resolve(name, Value::Null, active)?;
                active.remove(name);
                match value {
                    Value::String(s) => out.push_str(&s),
                    Value::Null => return Err(Error::UnresolvedReference(name.to_string())),
                    other => out.push_str(&other.to_string()),
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(Value::String(out))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_maps(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, incoming) in overrides {
        match incoming {
            Value::Object(incoming_map) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    merge_maps(existing, incoming_map);
                } else {
                    base.insert(key, Value::Object(incoming_map));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
