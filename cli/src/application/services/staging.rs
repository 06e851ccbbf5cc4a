//! File placement for install and update: the I/O half of the manifest
//! differ.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::manifest::{
    FileManifest, is_safe_relative, needs_exec_bit, prune_chain, relative_path, stale_paths,
};
use crate::domain::paths::STAGING_EXCLUDES;

/// Result of one staging pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// The new file manifest, in placement order.
    pub manifest: FileManifest,
    /// Paths from the previous manifest that were deleted.
    pub removed: Vec<String>,
}

/// A staging pass that stopped partway.
#[derive(Debug)]
pub struct StageFailure {
    /// Every path the agent still has on disk: what survives of the
    /// previous manifest plus what was copied before the failure.
    pub placed: FileManifest,
    /// Paths copied by this pass.
    pub copied: Vec<String>,
    pub error: anyhow::Error,
}

/// Copy every file of `source_root` (minus the VCS and metadata dirs) into
/// `dest_root`.
///
/// With a `previous` manifest, paths it lists that the new tree no longer
/// produces are deleted first, pruning emptied directories.
///
/// # Errors
///
/// Returns a [`StageFailure`] if the source cannot be walked or a file
/// cannot be copied or removed. Files already touched are reported in it.
pub fn stage(
    fs: &impl LocalFs,
    source_root: &Path,
    dest_root: &Path,
    previous: Option<&FileManifest>,
) -> Result<StageOutcome, StageFailure> {
    let old = previous.map_or(&[][..], FileManifest::paths);
    let files = fs
        .list_files(source_root, STAGING_EXCLUDES)
        .with_context(|| format!("listing {}", source_root.display()))
        .map_err(|e| failure(fs, dest_root, old, Vec::new(), e))?;

    let mut pairs = Vec::with_capacity(files.len());
    for file in files {
        let Some(relative) = relative_path(source_root, &file) else {
            tracing::warn!(file = %file.display(), "skipping file outside staging root");
            continue;
        };
        pairs.push((file, relative));
    }
    let relatives: Vec<String> = pairs.iter().map(|(_, r)| r.clone()).collect();

    let mut removed = Vec::new();
    if let Some(old_manifest) = previous {
        for stale in stale_paths(old_manifest, &relatives) {
            if let Err(e) = remove_installed(fs, dest_root, &stale) {
                return Err(failure(fs, dest_root, old, Vec::new(), e));
            }
            removed.push(stale);
        }
    }

    let mut copied = Vec::with_capacity(pairs.len());
    for (file, relative) in &pairs {
        let dest = dest_root.join(relative);
        if let Err(e) = fs
            .copy_file(file, &dest)
            .with_context(|| format!("copying {relative}"))
        {
            return Err(failure(fs, dest_root, old, copied, e));
        }
        tracing::debug!(file = %relative, "staged");
        copied.push(relative.clone());
    }

    Ok(StageOutcome {
        manifest: FileManifest::new(relatives),
        removed,
    })
}

fn failure(
    fs: &impl LocalFs,
    dest_root: &Path,
    old: &[String],
    copied: Vec<String>,
    error: anyhow::Error,
) -> StageFailure {
    let mut placed: Vec<String> = old
        .iter()
        .filter(|p| !copied.contains(p) && fs.exists(&dest_root.join(p.as_str())))
        .cloned()
        .collect();
    placed.extend(copied.iter().cloned());
    tracing::debug!(placed = placed.len(), copied = copied.len(), "staging stopped partway");
    StageFailure {
        placed: FileManifest::new(placed),
        copied,
        error,
    }
}

/// Delete one manifest entry and prune the directories it leaves empty,
/// never touching `root` itself.
///
/// # Errors
///
/// Returns an error if the file or an empty directory cannot be removed.
pub fn remove_installed(fs: &impl LocalFs, root: &Path, relative: &str) -> Result<()> {
    if !is_safe_relative(relative) {
        tracing::warn!(path = relative, "refusing to remove path outside install root");
        return Ok(());
    }
    let path = root.join(relative);
    fs.remove_file(&path)
        .with_context(|| format!("removing {}", path.display()))?;
    for dir in prune_chain(root, &path) {
        if !fs.remove_dir_if_empty(&dir)? {
            break;
        }
    }
    Ok(())
}

/// Set the execute bit on the run script and on every staged
/// `cmdproc`/`mailproc` file. Missing files are logged and skipped.
pub fn mark_executables(
    fs: &impl LocalFs,
    dest_root: &Path,
    manifest: &FileManifest,
    script: Option<&Path>,
) {
    let targets = manifest
        .paths()
        .iter()
        .filter(|p| needs_exec_bit(p))
        .map(|p| dest_root.join(p))
        .chain(script.map(Path::to_path_buf));
    for path in targets {
        if let Err(e) = fs.make_executable(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not mark executable");
        }
    }
}
