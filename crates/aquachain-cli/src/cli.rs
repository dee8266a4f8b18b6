use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aquachain-cli")]
#[command(about = "AquaChain water-management dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ./aquachain.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session storage file, overriding the configured path
    #[arg(long, global = true, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Wallet session and identity switching
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Start the live feeds and render the dashboard for the current viewer
    Dashboard {
        /// Number of refreshes, one per sensor interval
        #[arg(long, default_value_t = 1)]
        ticks: u32,
    },

    /// Water bills for the current viewer
    Bills {
        #[command(subcommand)]
        action: BillsCommand,
    },

    /// Run the AI analysis (administrators only)
    Insights,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Show the current viewer
    Status,

    /// List every demo identity
    Users,

    /// Connect as the default resident
    Connect,

    /// Switch to a demo identity by id
    Switch { id: String },

    /// Drop to the public view
    Public,

    /// Disconnect the wallet
    Disconnect,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BillsCommand {
    List,

    /// Pay an open bill
    Pay { bill_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["aquachain-cli", "session", "switch", "admin-001", "--storage", "/tmp/s.json", "--json"]);
        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/s.json")));
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Commands::Session {
                action: SessionCommand::Switch { id: "admin-001".into() }
            }
        );
    }

    #[test]
    fn test_dashboard_ticks_default() {
        let cli = Cli::parse_from(["aquachain-cli", "dashboard"]);
        assert_eq!(cli.command, Commands::Dashboard { ticks: 1 });
    }
}
