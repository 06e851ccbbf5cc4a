//! Best-effort lifecycle hooks.

use std::path::Path;

use crate::application::ports::{CommandRunner, LocalFs};
use crate::domain::paths::Hook;

/// What happened when a hook was present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub hook: Hook,
    /// `None` when the hook could not be started or was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Run `script` if it exists, from `cwd`, with no arguments.
///
/// Never fails: a missing hook returns `None`, and every other problem is
/// logged and reflected in the report.
pub async fn run_hook(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    hook: Hook,
    script: &Path,
    cwd: &Path,
) -> Option<HookReport> {
    if !fs.exists(script) {
        return None;
    }
    if let Err(e) = fs.make_executable(script) {
        tracing::warn!(hook = hook.file_name(), error = %e, "could not mark hook executable");
    }
    let program = script.to_string_lossy();
    let exit_code = match runner.run_in(&program, &[], cwd).await {
        Ok(out) => {
            let code = out.status.code();
            tracing::debug!(hook = hook.file_name(), code = ?code, "ran hook");
            code
        }
        Err(e) => {
            tracing::warn!(hook = hook.file_name(), error = %e, "hook failed to run");
            None
        }
    };
    Some(HookReport { hook, exit_code })
}
