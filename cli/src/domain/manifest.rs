//! File manifests and the pure half of the manifest differ.
//!
//! A manifest is the ordered list of install-root-relative paths an agent
//! owns, stored one per line. Paths always use `/` separators.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Top-level install directories whose files must be executable.
pub const EXECUTABLE_PREFIXES: &[&str] = &["cmdproc", "mailproc"];

/// Ordered list of install-root-relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileManifest {
    paths: Vec<String>,
}

impl FileManifest {
    #[must_use]
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    /// Parse a newline-delimited list; blank lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            paths: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.paths.iter().map(|p| format!("{p}\n")).collect()
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// Path of `file` relative to `root`, `/`-joined. `None` if `file` is not
/// strictly below `root` or the remainder holds anything but plain names.
#[must_use]
pub fn relative_path(root: &Path, file: &Path) -> Option<String> {
    let rest = file.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rest.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Whether a manifest entry can be joined under the install root without
/// escaping it.
#[must_use]
pub fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|p| !p.is_empty() && p != "." && p != "..")
}

/// Entries of `old` that the new staging pass did not produce.
#[must_use]
pub fn stale_paths(old: &FileManifest, new: &[String]) -> Vec<String> {
    let fresh: HashSet<&str> = new.iter().map(String::as_str).collect();
    old.paths
        .iter()
        .filter(|p| !fresh.contains(p.as_str()))
        .cloned()
        .collect()
}

/// Directories to try pruning after deleting `file`: its parent, then each
/// ancestor, stopping before `root`. Empty when `file` is not below `root`.
///
/// The caller removes them in order and stops at the first non-empty one.
#[must_use]
pub fn prune_chain(root: &Path, file: &Path) -> Vec<PathBuf> {
    if !file.starts_with(root) || file == root {
        return Vec::new();
    }
    file.ancestors()
        .skip(1)
        .take_while(|dir| *dir != root && dir.starts_with(root))
        .map(Path::to_path_buf)
        .collect()
}

/// Staged files under `cmdproc`/`mailproc` are marked executable.
#[must_use]
pub fn needs_exec_bit(relative: &str) -> bool {
    EXECUTABLE_PREFIXES.iter().any(|p| relative.starts_with(p))
}
