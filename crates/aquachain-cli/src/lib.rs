//! Command-line front end for the AquaChain dashboard.

pub mod cli;
pub mod commands;
pub mod dashboard;
pub mod settings;

pub use cli::{BillsCommand, Cli, Commands, SessionCommand};
pub use commands::App;
pub use dashboard::{DashboardView, Panel, PanelAccess};
pub use settings::Settings;
