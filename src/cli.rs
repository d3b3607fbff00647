//! Command-line interface definitions
//!
//! Uses clap for argument parsing with derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bpctl - Bluray Poster control panel
///
/// Start, stop and reload the service, edit its configuration, and follow its log.
#[derive(Parser)]
#[command(name = "bpctl")]
#[command(version)]
#[command(about = "Control panel for the Bluray Poster service")]
#[command(after_help = "\
SERVICE CONTROL:
  bpctl status             Show service status (or just: bpctl)
  bpctl start              Start the service
  bpctl stop               Stop the service
  bpctl reload             Reload the service's configuration

SERVICE CONFIGURATION:
  bpctl config show        Print the service's configuration file
  bpctl config save FILE   Upload FILE as the new configuration and reload

LOGS:
  bpctl logs               Print the recent service log, newest first
  bpctl logs --follow      Keep printing new entries as they arrive

PANEL:
  bpctl tui                Interactive panel with control, config and log tabs

CLIENT CONFIG:
  $XDG_CONFIG_HOME/bpctl/config.toml (check with: bpctl validate)")]
pub struct Args {
    /// Service base URL (overrides [service] base_url)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Show service status
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Start the service
    Start,

    /// Stop the service
    Stop,

    /// Reload the service's configuration
    Reload,

    /// Read or replace the service's configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print the service log, newest first
    Logs {
        /// Keep the connection open and print new entries until Ctrl+C
        #[arg(short, long)]
        follow: bool,
    },

    /// Validate the local client config file
    Validate,

    /// Interactive terminal panel
    Tui,
}

/// `bpctl config ...`
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration text
    Show,

    /// Upload a file as the new configuration
    Save {
        /// File to upload
        file: PathBuf,

        /// Save without asking the service to reload
        #[arg(long)]
        no_reload: bool,
    },
}
