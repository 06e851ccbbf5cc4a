//! `SourceFetcher` backed by `git clone`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, SourceFetcher};

/// Shallow-clones the agent repository with the system `git`.
pub struct GitFetcher<R> {
    runner: R,
}

impl<R: CommandRunner> GitFetcher<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SourceFetcher for GitFetcher<R> {
    async fn fetch(&self, source: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let dest_str = dest.to_string_lossy();
        let out = self
            .runner
            .run("git", &["clone", "--depth", "1", "--quiet", source, &dest_str])
            .await
            .context("running git clone")?;
        anyhow::ensure!(
            out.status.success(),
            "git clone exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
        tracing::debug!(source, dest = %dest.display(), "fetched");
        Ok(())
    }
}
