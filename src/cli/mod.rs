//! CLI argument definitions for Caravel.

use clap::{Parser, Subcommand};

/// Caravel - layered configuration for project environments and caches.
#[derive(Parser, Debug)]
#[command(name = "cvl")]
#[command(author, version, about = "A CLI tool for managing layered project configuration and caches", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Cache inspection
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved value of a setting
    Get {
        /// Dotted setting name (e.g. installer.max-workers)
        key: String,
    },

    /// Set a setting in the user configuration file
    Set {
        /// Dotted setting name (e.g. installer.max-workers)
        key: String,

        /// Raw value; validated and normalized per setting
        value: String,
    },

    /// Remove a setting from the user configuration file
    Unset {
        /// Dotted setting name (e.g. installer.max-workers)
        key: String,
    },

    /// List every setting with its resolved value
    List,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// List repository caches, one per line
    List,
}
