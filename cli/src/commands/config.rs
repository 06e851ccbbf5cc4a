//! `hive config` — inspect the effective configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration and derived paths
    Show,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => {
            app.renderer()
                .config(&app.config, &app.paths, &app.config_path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
