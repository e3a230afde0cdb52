//! Pluggable write-side configuration sources.
//!
//! The resolver holds two [`ConfigSource`] handles (primary and
//! authentication-scoped) but never performs I/O itself. Persistence
//! lives entirely behind this trait: [`DictConfigSource`] keeps values in
//! memory, [`FileConfigSource`] rewrites a JSON document on every change.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::Result;

/// A destination for persisted setting overrides.
pub trait ConfigSource {
    /// Set a dotted setting name to a value, creating parent groups as
    /// needed.
    fn add_property(&mut self, name: &str, value: Value) -> Result<()>;

    /// Remove a dotted setting name. Parent groups emptied by the removal
    /// are pruned. Removing an absent name is a no-op.
    fn remove_property(&mut self, name: &str) -> Result<()>;
}

/// In-memory configuration source.
#[derive(Debug, Clone, Default)]
pub struct DictConfigSource {
    config: Map<String, Value>,
}

impl DictConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored override tree.
    pub fn values(&self) -> &Map<String, Value> {
        &self.config
    }
}

impl ConfigSource for DictConfigSource {
    fn add_property(&mut self, name: &str, value: Value) -> Result<()> {
        set_nested(&mut self.config, name, value);
        Ok(())
    }

    fn remove_property(&mut self, name: &str) -> Result<()> {
        remove_nested(&mut self.config, name);
        Ok(())
    }
}

/// Configuration source backed by a JSON document on disk.
///
/// The file holds only overrides, never defaults. A missing file reads as
/// an empty tree; parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the override tree from disk.
    pub fn values(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let document: Value = serde_json::from_str(&content)?;
        Ok(document.as_object().cloned().unwrap_or_default())
    }

    fn write(&self, config: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let document = serde_json::to_string_pretty(&Value::Object(config.clone()))?;
        fs::write(&self.path, document)?;
        Ok(())
    }
}

impl ConfigSource for FileConfigSource {
    fn add_property(&mut self, name: &str, value: Value) -> Result<()> {
        let mut config = self.values()?;
        set_nested(&mut config, name, value);
        self.write(&config)
    }

    fn remove_property(&mut self, name: &str) -> Result<()> {
        let mut config = self.values()?;
        remove_nested(&mut config, name);
        self.write(&config)
    }
}

fn set_nested(map: &mut Map<String, Value>, name: &str, value: Value) {
    let mut segments: Vec<&str> = name.split('.').collect();
    let Some(last) = segments.pop() else { return };
    let mut current = map;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            // A scalar in the way of a deeper path is replaced by a group.
            *slot = Value::Object(Map::new());
        }
        let Value::Object(child) = slot else { return };
        current = child;
    }
    current.insert(last.to_string(), value);
}

fn remove_nested(map: &mut Map<String, Value>, name: &str) {
    let segments: Vec<&str> = name.split('.').collect();
    remove_segments(map, &segments);
}

fn remove_segments(map: &mut Map<String, Value>, segments: &[&str]) {
    match segments {
        [] => {}
        [leaf] => {
            map.remove(*leaf);
        }
        [head, rest @ ..] => {
            let now_empty = match map.get_mut(*head) {
                Some(Value::Object(child)) => {
                    remove_segments(child, rest);
                    child.is_empty()
                }
                _ => false,
            };
            if now_empty {
                map.remove(*head);
            }
        }
    }
}
