//! `hive add|install|update|remove|purge|forget|clean` — registry and
//! install-state changes.
//!
//! Every mutating command holds the operation lock until it returns.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::UpdateOutcome;
use crate::commands::NameArgs;

/// Arguments for `hive add`.
#[derive(Args)]
pub struct AddArgs {
    /// Agent name
    pub name: String,
    /// Git URL, local path, or `user/repo` shorthand
    pub source: String,
}

/// Arguments for `hive install`.
#[derive(Args)]
pub struct InstallArgs {
    /// Agent name
    pub name: String,
    /// Source to register first if the agent is not yet known
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for `hive purge`.
#[derive(Args)]
pub struct PurgeArgs {
    /// Agent name
    pub name: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run `hive add`.
///
/// # Errors
///
/// Returns an error if the name is taken or the registry cannot be saved.
pub async fn add(app: &AppContext, args: &AddArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let source = app
        .engine(&reporter)
        .add(&app.caller, &args.name, &args.source)
        .await?;
    app.renderer()
        .message(&format!("Agent '{}' added from {source}", args.name))?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive install`.
///
/// # Errors
///
/// Returns an error if the agent cannot be fetched or installed.
pub async fn install(app: &AppContext, args: &InstallArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .install(&app.caller, &args.name, args.source.as_deref())
        .await?;
    app.renderer().install(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive update`. An agent that is already current exits 0.
///
/// # Errors
///
/// Returns an error if the agent is not installed or the upgrade fails.
pub async fn update(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .update(&app.caller, &args.name)
        .await?;
    if let UpdateOutcome::AlreadyUpToDate { installed, .. } = &outcome {
        tracing::info!(agent = %args.name, version = %installed, "already up to date");
    }
    app.renderer().update(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive remove`.
///
/// # Errors
///
/// Returns an error if the agent is not installed or its files cannot be
/// removed.
pub async fn remove(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .remove(&app.caller, &args.name)
        .await?;
    app.renderer().remove(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive purge`.
///
/// # Errors
///
/// Returns an error if the prompt fails, or removal fails.
pub async fn purge(app: &AppContext, args: &PurgeArgs) -> Result<ExitCode> {
    let prompt = format!(
        "Remove agent '{}' and delete its configuration files?",
        args.name
    );
    if !args.yes && !app.confirm(&prompt, false)? {
        app.output.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let _lock = app.lock()?;
    let reporter = app.reporter();
    let outcome = app
        .engine(&reporter)
        .purge(&app.caller, &args.name)
        .await?;
    app.renderer().purge(&args.name, &outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive forget`.
///
/// # Errors
///
/// Returns an error if the agent is unknown or still installed.
pub async fn forget(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    app.engine(&reporter)
        .forget(&app.caller, &args.name)
        .await?;
    app.renderer()
        .message(&format!("Agent '{}' removed from the list", args.name))?;
    Ok(ExitCode::SUCCESS)
}

/// Run `hive clean`.
///
/// # Errors
///
/// Returns an error if the lock is held or output fails.
pub fn clean(app: &AppContext) -> Result<ExitCode> {
    let _lock = app.lock()?;
    let reporter = app.reporter();
    app.engine(&reporter).clean();
    app.renderer().message("Staging area cleaned")?;
    Ok(ExitCode::SUCCESS)
}
