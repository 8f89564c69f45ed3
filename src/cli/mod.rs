//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// DFA State Editor CLI
#[derive(Parser, Debug)]
#[command(name = "dfa-editor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "DFA_EDITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive editor
    Edit {
        /// Start from the built-in demo automaton instead of an empty canvas
        #[arg(long)]
        demo: bool,
    },

    /// Print the transition table and analysis of the demo automaton
    Demo {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Validate a configuration file
    ConfigValidate {
        /// Path to configuration file
        path: PathBuf,
    },
}

impl Commands {
    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self, Commands::Edit { .. })
    }
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text table
    Table,
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Edit { demo } => commands::edit::execute(demo, config),
        Commands::Demo { output } => commands::demo::execute(output, config),
        Commands::ConfigValidate { path } => commands::config_validate::execute(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["dfa-editor", "edit", "--demo"]).unwrap();
        assert!(matches!(cli.command, Commands::Edit { demo: true }));
        assert!(cli.command.is_interactive());
    }

    #[test]
    fn test_demo_output_format() {
        let cli = Cli::try_parse_from(["dfa-editor", "demo", "--output", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Demo {
                output: OutputFormat::Json
            }
        ));
        assert!(!cli.command.is_interactive());

        let cli = Cli::try_parse_from(["dfa-editor", "demo"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Demo {
                output: OutputFormat::Table
            }
        ));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "dfa-editor",
            "config-validate",
            "my.toml",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        assert!(matches!(cli.command, Commands::ConfigValidate { .. }));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["dfa-editor", "simulate"]).is_err());
    }
}
