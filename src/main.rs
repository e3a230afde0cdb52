//! Caravel CLI - layered configuration and cache management.

use caravel::cli::{CacheCommands, Cli, Commands, ConfigCommands};
use caravel::commands::{self, Output};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run_command(cli.command, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(command: Commands, human: bool) -> Result<(), caravel::Error> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => {
                let config = commands::load_config()?;
                let result = commands::config_get(&config, &key)?;
                output(&result, human);
            }

            ConfigCommands::Set { key, value } => {
                let mut config = commands::load_config()?;
                let result = commands::config_set(&mut config, &key, &value)?;
                output(&result, human);
            }

            ConfigCommands::Unset { key } => {
                let mut config = commands::load_config()?;
                let result = commands::config_unset(&mut config, &key)?;
                output(&result, human);
            }

            ConfigCommands::List => {
                let config = commands::load_config()?;
                let result = commands::config_list(&config)?;
                output(&result, human);
            }
        },

        Commands::Cache { command } => match command {
            CacheCommands::List => {
                let config = commands::load_config()?;
                let result = commands::cache_list(&config)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
