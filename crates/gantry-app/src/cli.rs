//! CLI argument definitions for the `gantry` binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gantry_core::config::default_config_path;

/// Gantry - run small named actions from the command line or over HTTP.
#[derive(Parser, Debug)]
#[command(name = "gantry", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP API server.
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Run an action once.
    Run {
        name: String,
        /// Arguments passed to the action.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List available actions.
    List,
    /// Show execution statistics for one action or all of them.
    Stats { name: Option<String> },
    /// Show recent executions of an action.
    History {
        name: String,
        #[arg(short = 'n', long = "limit", default_value_t = 10)]
        limit: usize,
    },
    /// Overview of configuration, actions, and recent logs.
    Dashboard,
    /// Create a new action from the starter template.
    New { name: String },
    /// Re-resolve an action after changing it on disk.
    Update { name: String },
    /// Print the API token.
    Token,
    /// View or reset the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Print the tail of the log file.
    Logs {
        #[arg(short = 'n', long = "lines", default_value_t = 20)]
        lines: usize,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the current configuration.
    View,
    /// Replace the configuration with defaults and a new API token.
    Reset,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > GANTRY_CONFIG env var > ~/.gantry/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("GANTRY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Resolve the API server port.
///
/// Priority: --port flag > GANTRY_PORT env var > config file value.
pub fn resolve_port(flag: Option<u16>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Ok(val) = std::env::var("GANTRY_PORT") {
        if let Ok(p) = val.parse::<u16>() {
            return p;
        }
    }
    config_port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_hyphenated_args() {
        let cli = CliArgs::try_parse_from(["gantry", "run", "echo", "a", "-b", "--c"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                name: "echo".to_string(),
                args: vec!["a".to_string(), "-b".to_string(), "--c".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            CliArgs::try_parse_from(["gantry", "list", "-c", "/tmp/g.toml", "-l", "debug"]).unwrap();
        assert_eq!(cli.command, Command::List);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/g.toml"));
        assert_eq!(cli.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_parse_defaults() {
        let cli = CliArgs::try_parse_from(["gantry", "history", "echo"]).unwrap();
        assert_eq!(
            cli.command,
            Command::History {
                name: "echo".to_string(),
                limit: 10
            }
        );
        assert_eq!(cli.resolve_log_level("warn"), "warn");

        let cli = CliArgs::try_parse_from(["gantry", "logs"]).unwrap();
        assert_eq!(cli.command, Command::Logs { lines: 20 });

        let cli = CliArgs::try_parse_from(["gantry", "config", "reset"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Config {
                action: ConfigCommand::Reset
            }
        );
    }

    #[test]
    fn test_port_flag_wins() {
        assert_eq!(resolve_port(Some(9000), 8080), 9000);
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(CliArgs::try_parse_from(["gantry"]).is_err());
    }
}
