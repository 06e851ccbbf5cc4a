//! `ProcessControl` for the local host.
//!
//! Signals go through the `kill` utility so the crate stays free of
//! `unsafe` FFI.

use std::fs::OpenOptions;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProcessControl};

pub struct HostProcessControl<R> {
    runner: R,
}

impl<R: CommandRunner> HostProcessControl<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ProcessControl for HostProcessControl<R> {
    #[allow(clippy::zombie_processes)]
    fn spawn_detached(&self, program: &Path, cwd: &Path, log: &Path) -> Result<u32> {
        if let Some(parent) = log.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log)
            .with_context(|| format!("opening log {}", log.display()))?;
        let stderr = stdout
            .try_clone()
            .with_context(|| format!("opening log {}", log.display()))?;
        // The child is never waited on; it outlives this process.
        let child = Command::new(program)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .process_group(0)
            .spawn()
            .with_context(|| format!("failed to spawn {}", program.display()))?;
        Ok(child.id())
    }

    async fn terminate(&self, pid: u32) -> Result<bool> {
        let out = self.runner.run("kill", &[&pid.to_string()]).await?;
        if !out.status.success() {
            tracing::debug!(pid, stderr = %String::from_utf8_lossy(&out.stderr).trim(), "kill failed");
        }
        Ok(out.status.success())
    }

    async fn is_alive(&self, pid: u32) -> Result<bool> {
        if pid == 0 {
            return Ok(false);
        }
        let out = self.runner.run("kill", &["-0", &pid.to_string()]).await?;
        Ok(out.status.success())
    }
}
