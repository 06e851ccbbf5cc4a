//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use hive_common::AgentStatus;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::{
    AgentInfo, InstallOutcome, LaunchOutcome, PurgeOutcome, RemoveOutcome, UpdateOutcome,
};
use crate::domain::config::HiveConfig;
use crate::domain::paths::HivePaths;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<14}{value}", key.style(self.styles.dim));
        }
    }
}

/// Output renderer, chosen once from the `--json` flag.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn message(&self, msg: &str) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.message(msg);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::message(msg)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn agent_list(&self, agents: &[AgentStatus]) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.agent_list(agents);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::agent_list(agents)?),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn agent_info(&self, info: &AgentInfo) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.agent_info(info);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::agent_info(info)?),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn install(&self, name: &str, o: &InstallOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.install(name, o);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::install(name, o)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn update(&self, name: &str, o: &UpdateOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.update(name, o);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::update(name, o)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn remove(&self, name: &str, o: &RemoveOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.remove(name, o);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::remove(name, o)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn purge(&self, name: &str, o: &PurgeOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.purge(name, o);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::purge(name, o)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn launch(&self, name: &str, o: &LaunchOutcome) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.launch(name, o);
                Ok(())
            }
            Self::Json(j) => {
                let mut value = json::launch(o);
                value["name"] = name.into();
                j.emit(&value)
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn config(&self, config: &HiveConfig, paths: &HivePaths, path: &Path) -> Result<()> {
        match self {
            Self::Human(h) => {
                h.config(config, paths, path);
                Ok(())
            }
            Self::Json(j) => j.emit(&json::config(config, paths, path)),
        }
    }
}
