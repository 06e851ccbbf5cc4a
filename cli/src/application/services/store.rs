//! Load/mutate/save helpers for the on-disk state files.
//!
//! Every loader treats a missing file as empty state. Every saver rewrites
//! the whole file through [`LocalFs::write_atomic`].

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::agent::AgentList;
use crate::domain::manifest::FileManifest;
use crate::domain::paths::HivePaths;
use crate::domain::runtime_config::RuntimeConfig;
use crate::domain::sections::Sections;

fn read_optional(fs: &impl LocalFs, path: &Path) -> Result<Option<String>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    fs.read_to_string(path)
        .map(Some)
        .with_context(|| format!("reading {}", path.display()))
}

/// # Errors
///
/// Returns an error if the agent list exists but cannot be read or parsed.
pub fn load_agents(fs: &impl LocalFs, paths: &HivePaths) -> Result<AgentList> {
    let path = paths.agent_list();
    let Some(text) = read_optional(fs, &path)? else {
        return Ok(AgentList::new());
    };
    let doc = Sections::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    AgentList::from_sections(&doc).with_context(|| format!("parsing {}", path.display()))
}

/// # Errors
///
/// Returns an error if the agent list cannot be written.
pub fn save_agents(fs: &impl LocalFs, paths: &HivePaths, agents: &AgentList) -> Result<()> {
    let path = paths.agent_list();
    fs.write_atomic(&path, &agents.to_sections().render())
        .with_context(|| format!("writing {}", path.display()))
}

/// # Errors
///
/// Returns an error if the runtime config exists but cannot be read or parsed.
pub fn load_runtime_config(fs: &impl LocalFs, paths: &HivePaths) -> Result<RuntimeConfig> {
    let path = paths.runtime_config();
    let Some(text) = read_optional(fs, &path)? else {
        return Ok(RuntimeConfig::new());
    };
    let doc = Sections::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(RuntimeConfig::from_sections(doc))
}

/// # Errors
///
/// Returns an error if the runtime config cannot be written.
pub fn save_runtime_config(
    fs: &impl LocalFs,
    paths: &HivePaths,
    config: &RuntimeConfig,
) -> Result<()> {
    let path = paths.runtime_config();
    fs.write_atomic(&path, &config.sections().render())
        .with_context(|| format!("writing {}", path.display()))
}

/// Read a file or config-file manifest; `None` when it does not exist.
///
/// # Errors
///
/// Returns an error if the manifest exists but cannot be read.
pub fn read_manifest(fs: &impl LocalFs, path: &Path) -> Result<Option<FileManifest>> {
    Ok(read_optional(fs, path)?.map(|text| FileManifest::parse(&text)))
}

/// # Errors
///
/// Returns an error if the manifest cannot be written.
pub fn write_manifest(fs: &impl LocalFs, path: &Path, manifest: &FileManifest) -> Result<()> {
    fs.write_atomic(path, &manifest.render())
        .with_context(|| format!("writing {}", path.display()))
}

/// # Errors
///
/// Returns an error if the manifest exists but cannot be removed.
pub fn delete_manifest(fs: &impl LocalFs, path: &Path) -> Result<()> {
    fs.remove_file(path)
        .with_context(|| format!("removing {}", path.display()))
}
