//! Human-readable terminal renderer.

use std::path::Path;

use hive_common::AgentStatus;
use owo_colors::OwoColorize as _;

use crate::application::services::{
    AgentInfo, InstallOutcome, LaunchOutcome, PurgeOutcome, RemoveOutcome, UpdateOutcome,
};
use crate::domain::config::HiveConfig;
use crate::domain::paths::HivePaths;
use crate::output::OutputContext;

/// Renders service outcomes as human-readable terminal output.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn message(&self, msg: &str) {
        self.ctx.success(msg);
    }

    pub fn agent_list(&self, agents: &[AgentStatus]) {
        if agents.is_empty() {
            if !self.ctx.quiet {
                println!("No agents known. Add one: hive add <name> <source>");
            }
            return;
        }
        for a in agents {
            let state = match (a.installed, a.running) {
                (true, true) => "running".style(self.ctx.styles.success).to_string(),
                (true, false) => "installed".style(self.ctx.styles.info).to_string(),
                (false, _) => "known".style(self.ctx.styles.dim).to_string(),
            };
            println!(
                "  {:<20} {:<10} {:<10} {}",
                a.name,
                a.version.as_deref().unwrap_or("-"),
                state,
                a.source.style(self.ctx.styles.dim)
            );
        }
    }

    pub fn agent_info(&self, info: &AgentInfo) {
        let s = &info.status;
        self.ctx.header(&s.name);
        self.ctx.kv("source:", &s.source);
        self.ctx.kv("installed:", if s.installed { "yes" } else { "no" });
        self.ctx.kv("version:", s.version.as_deref().unwrap_or("-"));
        self.ctx.kv("script:", info.script.as_deref().unwrap_or("-"));
        let running = match (s.running, info.pid) {
            (true, Some(pid)) => format!("yes (pid {pid})"),
            (true, None) => "yes (unreadable marker)".to_string(),
            (false, _) => "no".to_string(),
        };
        self.ctx.kv("running:", &running);
        self.ctx.kv(
            "port:",
            &info.port.map_or_else(|| "-".to_string(), |p| p.to_string()),
        );
        self.ctx.kv(
            "topics:",
            &if info.topics.is_empty() {
                "-".to_string()
            } else {
                info.topics.join(" ")
            },
        );
        self.ctx.kv("files:", &info.files.len().to_string());
        self.ctx.kv("config files:", &info.config_files.len().to_string());
    }

    pub fn install(&self, name: &str, o: &InstallOutcome) {
        self.ctx.success(&format!(
            "Installed {name} {} ({} files, port {})",
            o.version, o.files, o.port
        ));
        if let Some(l) = &o.launched {
            self.launch(name, l);
        }
    }

    pub fn update(&self, name: &str, o: &UpdateOutcome) {
        match o {
            UpdateOutcome::AlreadyUpToDate { installed, remote } => self.ctx.info(&format!(
                "{name} is already up-to-date ({installed}, remote {remote})"
            )),
            UpdateOutcome::Updated(r) => {
                self.ctx.success(&format!(
                    "Updated {name} {} -> {} ({} files, {} removed)",
                    r.from,
                    r.to,
                    r.files,
                    r.removed.len()
                ));
                if let Some(l) = &r.launched {
                    self.launch(name, l);
                }
            }
        }
    }

    pub fn remove(&self, name: &str, o: &RemoveOutcome) {
        self.ctx
            .success(&format!("Removed {name} ({} files)", o.files));
        if o.config_files_kept > 0 {
            self.ctx.info(&format!(
                "{} config files kept. Delete them: hive purge {name}",
                o.config_files_kept
            ));
        }
    }

    pub fn purge(&self, name: &str, o: &PurgeOutcome) {
        if let Some(r) = &o.removed {
            self.remove(name, r);
        }
        self.ctx
            .success(&format!("Purged {name} ({} config files)", o.config_files));
    }

    pub fn launch(&self, name: &str, o: &LaunchOutcome) {
        let port = o
            .port
            .map_or_else(String::new, |p| format!(", port {p}"));
        self.ctx
            .success(&format!("Launched {name} (pid {}{port})", o.pid));
        if !o.registered {
            self.ctx.warn("Agent was not registered with the bus");
        }
    }

    pub fn config(&self, config: &HiveConfig, paths: &HivePaths, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<14} {}", "home:", paths.home.display());
        println!("  {:<14} {}", "var:", paths.var.display());
        println!("  {:<14} {}", "logs:", paths.logs.display());
        println!("  {:<14} {}", "staging:", paths.staging.display());
        println!("  {:<14} {}", "bus:", config.bus.address());
        println!("  {:<14} {}", "base_port:", config.base_port());
        println!(
            "  {:<14} {}",
            "admins:",
            if config.admins.is_empty() {
                "(none)".to_string()
            } else {
                config.admins.join(", ")
            }
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["HIVE_CONFIG", "HIVE_HOME", "NO_COLOR", "RUST_LOG"] {
            println!(
                "    {:<16} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}
