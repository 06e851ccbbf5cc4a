//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Expected, recoverable outcomes of a lifecycle operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("You don't have permissions to do that.")]
    PermissionDenied,

    #[error("Agent '{0}' not found in the agent list.")]
    NotFound(String),

    #[error("Agent '{0}' is already in the agent list.")]
    AlreadyExists(String),

    #[error("Agent '{0}' is already installed.")]
    AlreadyInstalled(String),

    #[error("Agent '{0}' is already running.")]
    AlreadyRunning(String),

    #[error("Agent '{0}' is already up-to-date.")]
    AlreadyUpToDate(String),

    #[error("Source required: '{0}' is not in the agent list. Pass --source <uri>.")]
    SourceRequired(String),

    #[error("Could not fetch source: {0}")]
    FetchFailed(String),

    #[error("Missing version in info file for '{0}'.")]
    MissingVersion(String),

    #[error("Invalid version '{version}' for '{name}': {reason}")]
    InvalidVersion {
        name: String,
        version: String,
        reason: String,
    },

    #[error("Agent '{0}' is not installed.")]
    NotInstalled(String),

    #[error("Agent '{0}' is not running.")]
    NotRunning(String),

    #[error("Agent '{0}' is installed, uninstall it first: hive remove {0}")]
    StillInstalled(String),

    #[error("Could not stop agent '{name}': {reason}")]
    StopFailed { name: String, reason: String },

    #[error("Agent '{0}' does not exist! (no install directory)")]
    AgentDirMissing(String),

    #[error("Agent '{0}' has no config files.")]
    NoConfigFiles(String),

    #[error("Agent '{0}' declares no run script.")]
    NoRunScript(String),

    #[error("Invalid agent name '{0}': must match ^[a-z0-9]([a-z0-9_-]{{0,61}}[a-z0-9])?$")]
    InvalidName(String),

    #[error("Another hive operation is in progress (pid {0}).")]
    Busy(u32),
}

impl LifecycleError {
    /// Stable snake-case code used in JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::AlreadyInstalled(_) => "already_installed",
            Self::AlreadyRunning(_) => "already_running",
            Self::AlreadyUpToDate(_) => "already_up_to_date",
            Self::SourceRequired(_) => "source_required",
            Self::FetchFailed(_) => "fetch_failed",
            Self::MissingVersion(_) => "missing_version",
            Self::InvalidVersion { .. } => "invalid_version",
            Self::NotInstalled(_) => "not_installed",
            Self::NotRunning(_) => "not_running",
            Self::StillInstalled(_) => "still_installed",
            Self::StopFailed { .. } => "stop_failed",
            Self::AgentDirMissing(_) => "agent_dir_missing",
            Self::NoConfigFiles(_) => "no_config_files",
            Self::NoRunScript(_) => "no_run_script",
            Self::InvalidName(_) => "invalid_name",
            Self::Busy(_) => "busy",
        }
    }
}

// ── Parse errors ──────────────────────────────────────────────────────────────

/// Errors reading section files and agent info files.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("info file has no version")]
    MissingVersion,

    #[error("line {line}: expected 'key = value', got '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: unterminated section header '{text}'")]
    MalformedSection { line: usize, text: String },

    #[error("line {line}: key '{key}' appears before any section")]
    KeyOutsideSection { line: usize, key: String },

    #[error("section '{section}': '{key}' is not a valid {expected}: '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        expected: &'static str,
        value: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to hive configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
