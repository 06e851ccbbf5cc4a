//! `hive list` and `hive info` — read-only views; no lock taken.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::NameArgs;

/// Run `hive list`.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub fn list(app: &AppContext) -> Result<ExitCode> {
    let reporter = app.reporter();
    let agents = app.engine(&reporter).list()?;
    app.renderer().agent_list(&agents)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive info`.
///
/// # Errors
///
/// Returns an error if the agent is unknown or its state cannot be read.
pub fn info(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let reporter = app.reporter();
    let info = app.engine(&reporter).info(&args.name)?;
    app.renderer().agent_info(&info)?;
    Ok(ExitCode::SUCCESS)
}
