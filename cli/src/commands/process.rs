//! `hive launch|stop|restart`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::NameArgs;

/// Run `hive launch`.
///
/// # Errors
///
/// Returns an error if the agent is running, not installed, or fails to
/// spawn.
pub async fn launch(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .launch(&app.caller, &args.name)
        .await?;
    app.renderer().launch(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive stop`.
///
/// # Errors
///
/// Returns an error if the agent is not running or cannot be signalled.
pub async fn stop(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let pid = app
        .engine(&reporter)
        .stop(&app.caller, &args.name)
        .await?;
    app.renderer()
        .message(&format!("Agent '{}' stopped (pid {pid})", args.name))?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive restart`.
///
/// # Errors
///
/// Returns an error if the agent is not running, or stop or launch fails.
pub async fn restart(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .restart(&app.caller, &args.name)
        .await?;
    app.renderer().launch(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}
