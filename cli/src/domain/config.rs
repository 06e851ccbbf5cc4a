//! Domain types and validators for hive configuration.
//!
//! Pure functions only. Loading from disk and from the environment lives in
//! `infra::config`.

use std::path::PathBuf;

use hive_common::BusEndpoint;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.hive/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HiveConfig {
    /// Install root. Defaults to `~/.hive`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    /// PID markers and the operation lock. Defaults to `<home>/var`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<PathBuf>,
    /// Agent logs. Defaults to `<home>/logs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<PathBuf>,
    /// Staging root. Defaults to `<var>/hive`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<PathBuf>,
    /// Message-bus server to register agents with.
    pub bus: BusEndpoint,
    /// Port the allocator counts up from. Defaults to `bus.port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_port: Option<u16>,
    /// Senders allowed to run mutating operations on behalf of a chat user.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<String>,
}

impl HiveConfig {
    #[must_use]
    pub fn base_port(&self) -> u16 {
        self.base_port.unwrap_or(self.bus.port)
    }

    /// Layer environment overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, env: EnvOverrides) -> Self {
        if env.home.is_some() {
            self.home = env.home;
        }
        if env.var.is_some() {
            self.var = env.var;
        }
        if env.logs.is_some() {
            self.logs = env.logs;
        }
        if let Some(host) = env.bus_host {
            self.bus.host = host;
        }
        if let Some(port) = env.bus_port {
            self.bus.port = port;
        }
        if env.base_port.is_some() {
            self.base_port = env.base_port;
        }
        self
    }
}

/// `HIVE_*` environment variables, deserialized by `envy`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub home: Option<PathBuf>,
    pub var: Option<PathBuf>,
    pub logs: Option<PathBuf>,
    pub bus_host: Option<String>,
    pub bus_port: Option<u16>,
    pub base_port: Option<u16>,
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Checks invariants serde cannot express.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for an empty bus host, a zero port,
/// or a blank admin entry.
pub fn validate_config(config: &HiveConfig) -> Result<(), ConfigError> {
    if config.bus.host.trim().is_empty() {
        return Err(invalid("bus.host", "must not be empty"));
    }
    if config.bus.port == 0 {
        return Err(invalid("bus.port", "must be between 1 and 65535"));
    }
    if config.base_port == Some(0) {
        return Err(invalid("base_port", "must be between 1 and 65535"));
    }
    if config.admins.iter().any(|a| a.trim().is_empty()) {
        return Err(invalid("admins", "entries must not be blank"));
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// A request with no sender comes from the local operator and is always
/// allowed; otherwise the sender must be listed in `admins`.
#[must_use]
pub fn is_authorized(admins: &[String], sender: Option<&str>) -> bool {
    match sender {
        None => true,
        Some(s) => admins.iter().any(|a| a == s),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
