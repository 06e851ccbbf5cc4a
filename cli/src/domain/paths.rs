//! Filesystem layout derived from [`HiveConfig`]. Path arithmetic only;
//! nothing here touches the disk.

use std::path::{Path, PathBuf};

use crate::domain::config::HiveConfig;

/// Directory inside a fetched source tree that holds hive metadata.
pub const META_DIR: &str = "hive";

/// Version-control metadata directory skipped when staging.
pub const VCS_DIR: &str = ".git";

/// Directories of a source tree never copied into the install root.
pub const STAGING_EXCLUDES: &[&str] = &[VCS_DIR, META_DIR];

/// Lifecycle hook scripts inside [`META_DIR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    PreInstall,
    PostInstall,
    PreUpdate,
    PostUpdate,
}

impl Hook {
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::PreInstall => "preinst",
            Self::PostInstall => "postinst",
            Self::PreUpdate => "preupd",
            Self::PostUpdate => "postupd",
        }
    }
}

/// Every location hive reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HivePaths {
    /// Install root; staged files land here.
    pub home: PathBuf,
    /// PID markers and the operation lock.
    pub var: PathBuf,
    pub logs: PathBuf,
    /// Root of per-agent staging areas.
    pub staging: PathBuf,
}

impl HivePaths {
    /// Resolve the layout, filling unset directories relative to
    /// `default_home`.
    #[must_use]
    pub fn from_config(config: &HiveConfig, default_home: &Path) -> Self {
        let home = config.home.clone().unwrap_or_else(|| default_home.to_path_buf());
        let var = config.var.clone().unwrap_or_else(|| home.join("var"));
        let logs = config.logs.clone().unwrap_or_else(|| home.join("logs"));
        let staging = config.staging.clone().unwrap_or_else(|| var.join("hive"));
        Self {
            home,
            var,
            logs,
            staging,
        }
    }

    /// Layout rooted entirely under `root` (used by tests).
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self::from_config(&HiveConfig::default(), root)
    }

    fn meta_root(&self) -> PathBuf {
        self.home.join("etc").join("hive")
    }

    #[must_use]
    pub fn agent_list(&self) -> PathBuf {
        self.meta_root().join("list")
    }

    #[must_use]
    pub fn manifest(&self, name: &str) -> PathBuf {
        self.meta_root().join("info").join(format!("{name}.list"))
    }

    #[must_use]
    pub fn config_manifest(&self, name: &str) -> PathBuf {
        self.meta_root().join("info").join(format!("{name}.conffiles"))
    }

    #[must_use]
    pub fn runtime_config(&self) -> PathBuf {
        self.home.join("etc").join("bus.conf")
    }

    #[must_use]
    pub fn agent_dir(&self, name: &str) -> PathBuf {
        self.home.join("agents").join(name)
    }

    #[must_use]
    pub fn staging_dir(&self, name: &str) -> PathBuf {
        self.staging.join(name)
    }

    #[must_use]
    pub fn info_file(&self, name: &str) -> PathBuf {
        self.staging_dir(name).join(META_DIR).join("info")
    }

    #[must_use]
    pub fn hook(&self, name: &str, hook: Hook) -> PathBuf {
        self.staging_dir(name).join(META_DIR).join(hook.file_name())
    }

    /// Config-file list inside the staged metadata dir; `conf` is the
    /// descriptor's pointer, defaulting to `conf`.
    #[must_use]
    pub fn staged_conf_list(&self, name: &str, conf: Option<&str>) -> PathBuf {
        self.staging_dir(name).join(META_DIR).join(conf.unwrap_or("conf"))
    }

    #[must_use]
    pub fn pid_marker(&self, name: &str) -> PathBuf {
        self.var.join(format!("{name}.pid"))
    }

    #[must_use]
    pub fn log_file(&self, name: &str) -> PathBuf {
        self.logs.join(format!("{name}.log"))
    }

    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.var.join("hive.lock")
    }

    /// Absolute path of a manifest entry.
    #[must_use]
    pub fn installed(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }
}
