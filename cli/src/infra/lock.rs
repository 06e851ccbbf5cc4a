//! Exclusive operation lock held across a read-modify-write of the state
//! files.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::domain::error::LifecycleError;

/// Held lock file containing this process's PID. Released on drop.
#[derive(Debug)]
pub struct OperationLock {
    path: PathBuf,
}

impl OperationLock {
    /// Create `path` exclusively. A lock left by a dead process is taken
    /// over.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Busy`] if a live process holds the lock, or an I/O
    /// error creating it.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        // Two attempts: the second follows removal of a stale lock.
        for _ in 0..2 {
            match Self::create(path) {
                Ok(lock) => return Ok(lock),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("creating lock {}", path.display()));
                }
            }
            match read_holder(path) {
                Some(pid) if is_process_alive(pid) => {
                    return Err(LifecycleError::Busy(pid).into());
                }
                holder => {
                    tracing::warn!(lock = %path.display(), holder = ?holder, "taking over stale lock");
                    let _ = fs::remove_file(path);
                }
            }
        }
        Err(LifecycleError::Busy(read_holder(path).unwrap_or_default()).into())
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)?;
        file.write_all(std::process::id().to_string().as_bytes())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn is_process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
