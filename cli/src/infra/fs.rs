//! Filesystem infrastructure — implements the `LocalFs` port.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::application::ports::LocalFs;

/// Production `LocalFs` over `std::fs`.
pub struct HostFs;

impl LocalFs for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        // Atomic write via temp file then rename
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        std::fs::write(&temp_path, content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("finalizing {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing file {}", path.display()))
            }
            _ => Ok(()),
        }
    }

    fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let mut entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => {
                return Err(e).with_context(|| format!("listing directory {}", path.display()));
            }
        };
        if entries.next().is_some() {
            return Ok(false);
        }
        std::fs::remove_dir(path)
            .with_context(|| format!("removing directory {}", path.display()))?;
        Ok(true)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing directory {}", path.display()))
            }
            _ => Ok(()),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            self.create_dir_all(parent)?;
        }
        std::fs::copy(from, to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    fn list_files(&self, root: &Path, exclude: &[&str]) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() != 1
                    || !exclude
                        .iter()
                        .any(|name| entry.file_name() == std::ffi::OsStr::new(name))
            });
        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("walking {}", root.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = std::fs::metadata(path)
                .with_context(|| format!("reading permissions of {}", path.display()))?;
            let mut perms = meta.permissions();
            perms.set_mode(perms.mode() | 0o111);
            std::fs::set_permissions(path, perms)
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        {
            anyhow::ensure!(path.exists(), "{} does not exist", path.display());
        }
        Ok(())
    }
}
