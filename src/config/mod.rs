//! Configuration management for Caravel.
//!
//! The configuration store is layered. From lowest to highest precedence:
//!
//! 1. Built-in defaults (the fixed schema in [`schema`])
//! 2. Values merged from configuration sources (e.g. the user's
//!    `config.json`, applied via [`Config::merge`])
//! 3. `CARAVEL_*` environment variables
//!
//! Settings are addressed by dotted names (`installer.max-workers`).
//! String values may reference other settings with `{key}` placeholders,
//! which are resolved recursively on every read.
//!
//! Use the [`resolver`] module for precedence resolution, [`schema`] for
//! the default tree and per-setting validation, and [`source`] for the
//! pluggable write-side handles.

pub mod resolver;
pub mod schema;
pub mod source;

pub use resolver::{Config, EnvSource, OsEnv, SETTINGS_ENV_PREFIX, env_var_name};
pub use schema::{SettingKind, default_config, is_key_valid, setting_kind};
pub use source::{ConfigSource, DictConfigSource, FileConfigSource};
