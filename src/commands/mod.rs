//! Command implementations for the Caravel CLI.
//!
//! Each command is a function taking its inputs and returning a result
//! struct; result structs implement [`Output`] so the binary can render
//! them as JSON (default) or human-readable text (`-H/--human`).

pub mod cache;
pub mod config;

pub use cache::{CacheListResult, cache_list};
pub use config::{
    ConfigGetResult, ConfigListResult, ConfigSetResult, ConfigUnsetResult, config_get,
    config_list, config_set, config_unset, load_config,
};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}
