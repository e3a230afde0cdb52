//! Cache inspection commands.

use std::fs;

use serde::Serialize;

use super::Output;
use crate::config::Config;
use crate::{Error, Result};

/// Repository cache names found under the cache directory.
#[derive(Debug, Serialize)]
pub struct CacheListResult {
    pub caches: Vec<String>,
}

impl Output for CacheListResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        self.caches.join("\n")
    }
}

/// List the repository caches under the resolved cache directory.
///
/// Only immediate child directories count; names are sorted
/// lexicographically. An absent or empty cache directory is
/// [`Error::NoCachesFound`], not an empty listing.
pub fn cache_list(config: &Config) -> Result<CacheListResult> {
    let cache_dir = config.repo_cache_dir()?;

    let mut caches = Vec::new();
    if cache_dir.is_dir() {
        for entry in fs::read_dir(&cache_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                caches.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
    }

    if caches.is_empty() {
        return Err(Error::NoCachesFound);
    }
    caches.sort();
    Ok(CacheListResult { caches })
}
