//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::application::ports::CommandRunner;

/// Default timeout for short host commands (`kill`, `kill -0`).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for lifecycle hooks and source fetches, which may hit the network.
pub const LONG_CMD_TIMEOUT: Duration = Duration::from_secs(600);

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` drops the future but
/// leaves the OS process running, so the child is killed explicitly from a
/// `tokio::select!` branch instead.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn output(&self, mut cmd: Command, program: &str) -> Result<Output> {
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", self.timeout.as_secs())
            }
        }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        self.output(cmd, program).await
    }

    async fn run_in(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        self.output(cmd, program).await
    }
}
