//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{EnvOverrides, HiveConfig, validate_config};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "HIVE_";

/// Production `ConfigStore`: a YAML file plus `HIVE_*` overrides.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// `~/.hive`, the install root when the config names none.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_home() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".hive"))
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<HiveConfig> {
        load_from(&self.path()?, std::env::vars())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("HIVE_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        Ok(Self::default_home()?.join("config.yaml"))
    }
}

/// Read `path` (missing means defaults), then apply overrides found in
/// `env`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an override has
/// the wrong type, or the merged result fails validation.
pub fn load_from(path: &Path, env: impl IntoIterator<Item = (String, String)>) -> Result<HiveConfig> {
    let file = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))?
    } else {
        HiveConfig::default()
    };
    let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
        .from_iter(env)
        .context("invalid HIVE_* environment override")?;
    let config = file.with_overrides(overrides);
    validate_config(&config)?;
    Ok(config)
}
