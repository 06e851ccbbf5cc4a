//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and one value builder per command outcome.

use std::path::Path;

use anyhow::{Context, Result};
use hive_common::AgentStatus;
use serde_json::{Value, json};

use crate::application::services::{
    AgentInfo, InstallOutcome, LaunchOutcome, PurgeOutcome, RemoveOutcome, UpdateOutcome,
};
use crate::domain::config::HiveConfig;
use crate::domain::paths::HivePaths;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Prints one pretty JSON document per command.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn emit(&self, value: &Value) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }
}

pub fn message(msg: &str) -> Value {
    json!({ "ok": true, "message": msg })
}

/// # Errors
///
/// Returns an error if serialization fails.
pub fn agent_list(agents: &[AgentStatus]) -> Result<Value> {
    Ok(json!({ "agents": serde_json::to_value(agents).context("serializing agents")? }))
}

/// # Errors
///
/// Returns an error if serialization fails.
pub fn agent_info(info: &AgentInfo) -> Result<Value> {
    let mut value = serde_json::to_value(&info.status).context("serializing agent")?;
    if let Value::Object(map) = &mut value {
        map.insert("script".into(), json!(info.script));
        map.insert("pid".into(), json!(info.pid));
        map.insert("port".into(), json!(info.port));
        map.insert("topics".into(), json!(info.topics));
        map.insert("files".into(), json!(info.files));
        map.insert("config_files".into(), json!(info.config_files));
    }
    Ok(value)
}

pub fn launch(o: &LaunchOutcome) -> Value {
    json!({ "pid": o.pid, "port": o.port, "registered": o.registered })
}

pub fn install(name: &str, o: &InstallOutcome) -> Value {
    json!({
        "name": name,
        "status": "installed",
        "version": o.version.to_string(),
        "port": o.port,
        "files": o.files,
        "config_files": o.config_files,
        "hooks": o.hooks.iter().map(|h| json!({
            "hook": h.hook.file_name(),
            "exit_code": h.exit_code,
        })).collect::<Vec<_>>(),
        "launched": o.launched.as_ref().map(launch),
    })
}

pub fn update(name: &str, o: &UpdateOutcome) -> Value {
    match o {
        UpdateOutcome::AlreadyUpToDate { installed, remote } => json!({
            "name": name,
            "status": "up_to_date",
            "version": installed.to_string(),
            "remote_version": remote.to_string(),
        }),
        UpdateOutcome::Updated(r) => json!({
            "name": name,
            "status": "updated",
            "from": r.from.to_string(),
            "version": r.to.to_string(),
            "files": r.files,
            "removed": r.removed,
            "launched": r.launched.as_ref().map(launch),
        }),
    }
}

pub fn remove(name: &str, o: &RemoveOutcome) -> Value {
    json!({
        "name": name,
        "status": "removed",
        "files": o.files,
        "was_running": o.was_running,
        "config_files_kept": o.config_files_kept,
    })
}

pub fn purge(name: &str, o: &PurgeOutcome) -> Value {
    json!({
        "name": name,
        "status": "purged",
        "removed": o.removed.as_ref().map(|r| remove(name, r)),
        "config_files": o.config_files,
    })
}

pub fn config(config: &HiveConfig, paths: &HivePaths, path: &Path) -> Value {
    json!({
        "config_file": path,
        "home": paths.home,
        "var": paths.var,
        "logs": paths.logs,
        "staging": paths.staging,
        "bus": config.bus,
        "base_port": config.base_port(),
        "admins": config.admins,
    })
}
