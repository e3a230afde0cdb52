//! Common test utilities for caravel integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read or
//! write the user's real `~/.config/caravel/` or cache directories.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated configuration and cache directories.
///
/// Each `TestEnv` creates two temporary directories:
/// - `config_dir`: Holds `config.json`/`auth.json` (via `CARAVEL_CONFIG_DIR`)
/// - `cache_dir`: Acts as the resolved `cache-dir` (via `CARAVEL_CACHE_DIR`)
///
/// The `cvl()` method returns a `Command` that sets both variables
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub cache_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            cache_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the cvl binary with isolated directories.
    pub fn cvl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cvl"));
        cmd.env("CARAVEL_CONFIG_DIR", self.config_dir.path());
        cmd.env("CARAVEL_CACHE_DIR", self.cache_dir.path());
        cmd
    }

    /// Get the path to the configuration directory.
    pub fn config_path(&self) -> &std::path::Path {
        self.config_dir.path()
    }

    /// Get the path to the cache directory.
    pub fn cache_path(&self) -> &std::path::Path {
        self.cache_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
