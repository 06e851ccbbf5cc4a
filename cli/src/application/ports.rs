//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `hive_common` — never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use hive_common::BusMessage;

use crate::domain::HiveConfig;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program from `cwd` and capture its output.
    async fn run_in(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Local filesystem access. All state files go through here so services can
/// run against a temp directory in tests.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// # Errors
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Replace `path` with `content` via a temp file and rename, creating
    /// parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if the temp file cannot be written or renamed.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;
    /// Missing files are not an error.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Remove `path` if it is an empty directory. Returns `true` when the
    /// directory is gone afterwards, including when it never existed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be listed or removed.
    fn remove_dir_if_empty(&self, path: &Path) -> Result<bool>;
    /// # Errors
    /// Returns an error if the tree exists but cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// Copy a regular file, creating the destination's parent directories.
    ///
    /// # Errors
    /// Returns an error if the copy fails.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
    /// Every regular file below `root`, skipping top-level entries named in
    /// `exclude`. Sorted for deterministic manifests.
    ///
    /// # Errors
    /// Returns an error if the tree cannot be walked.
    fn list_files(&self, root: &Path, exclude: &[&str]) -> Result<Vec<PathBuf>>;
    /// Add the owner/group/other execute bits.
    ///
    /// # Errors
    /// Returns an error if the permissions cannot be changed.
    fn make_executable(&self, path: &Path) -> Result<()>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading of the hive configuration.
pub trait ConfigStore {
    /// Load the configuration, with environment overrides applied.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    fn load(&self) -> Result<HiveConfig>;
    /// Path of the configuration file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Source Fetch Port ─────────────────────────────────────────────────────────

/// Retrieves an agent's source tree.
#[allow(async_fn_in_trait)]
pub trait SourceFetcher {
    /// Fetch `source` into `dest`, which does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the fetch fails for any reason.
    async fn fetch(&self, source: &str, dest: &Path) -> Result<()>;
}

// ── Process Port ──────────────────────────────────────────────────────────────

/// Host process operations needed for PID bookkeeping.
#[allow(async_fn_in_trait)]
pub trait ProcessControl {
    /// Start `program` in its own process group with stdout and stderr
    /// appended to `log`. Returns the child's PID without waiting.
    ///
    /// # Errors
    /// Returns an error if the log cannot be opened or the spawn fails.
    fn spawn_detached(&self, program: &Path, cwd: &Path, log: &Path) -> Result<u32>;
    /// Ask `pid` to terminate. `Ok(false)` means the signal was not
    /// delivered.
    ///
    /// # Errors
    /// Returns an error if the signalling tool cannot be run.
    async fn terminate(&self, pid: u32) -> Result<bool>;
    /// Whether a process with `pid` exists.
    ///
    /// # Errors
    /// Returns an error if the probe cannot be run.
    async fn is_alive(&self, pid: u32) -> Result<bool>;
}

// ── Bus Port ──────────────────────────────────────────────────────────────────

/// Sends messages to the host message bus.
#[allow(async_fn_in_trait)]
pub trait BusPublisher {
    /// # Errors
    /// Returns an error if the bus is unreachable.
    async fn send(&self, message: &BusMessage) -> Result<()>;
}

// ── Permission Port ───────────────────────────────────────────────────────────

/// Decides whether a remote sender may mutate state.
pub trait Authorizer {
    fn is_authorized(&self, sender: Option<&str>) -> bool;
}
