//! Application service — the agent lifecycle orchestrator.
//!
//! Imports only from `crate::domain` and `crate::application`. Every
//! operation loads the state files it needs, mutates them in memory and
//! rewrites them atomically; the caller holds the operation lock.

use std::path::Path;

use anyhow::{Context, Result};
use hive_common::AgentStatus;
use semver::Version;

use crate::application::ports::{
    Authorizer, BusPublisher, CommandRunner, LocalFs, ProcessControl, ProgressReporter,
    SourceFetcher,
};
use crate::application::services::engine::{Caller, Engine};
use crate::application::services::hooks::{HookReport, run_hook};
use crate::application::services::staging::StageFailure;
use crate::application::services::process::LaunchOutcome;
use crate::application::services::{staging, store};
use crate::domain::agent::{
    AgentDescriptor, AgentList, AgentRecord, normalize_source, parse_info, validate_agent_name,
};
use crate::domain::error::{LifecycleError, ParseError};
use crate::domain::manifest::{FileManifest, is_safe_relative};
use crate::domain::paths::Hook;
use crate::domain::{port_alloc, topics};

// ── Outcomes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub version: Version,
    pub port: u16,
    pub files: usize,
    pub config_files: usize,
    pub hooks: Vec<HookReport>,
    /// Set when a run script was declared and the launch succeeded.
    pub launched: Option<LaunchOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The fetched version is not newer; nothing was touched.
    AlreadyUpToDate { installed: Version, remote: Version },
    Updated(UpdateReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub from: Version,
    pub to: Version,
    pub files: usize,
    /// Files from the previous release that were deleted.
    pub removed: Vec<String>,
    pub hooks: Vec<HookReport>,
    pub launched: Option<LaunchOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub files: usize,
    pub was_running: bool,
    /// Config files left on disk for a later purge.
    pub config_files_kept: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Set when the agent was still installed and got removed first.
    pub removed: Option<RemoveOutcome>,
    pub config_files: usize,
}

/// Everything known about one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub status: AgentStatus,
    pub script: Option<String>,
    pub pid: Option<u32>,
    pub port: Option<u16>,
    pub topics: Vec<String>,
    pub files: Vec<String>,
    pub config_files: Vec<String>,
}

// ── Operations ────────────────────────────────────────────────────────────────

impl<F, R, S, P, B, A, O> Engine<'_, F, R, S, P, B, A, O>
where
    F: LocalFs,
    R: CommandRunner,
    S: SourceFetcher,
    P: ProcessControl,
    B: BusPublisher,
    A: Authorizer,
    O: ProgressReporter,
{
    /// Register `name` with `source` without installing it. Returns the
    /// stored (normalized) source.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AlreadyExists`] if the name is already known.
    pub async fn add(&self, caller: &Caller, name: &str, source: &str) -> Result<String> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.add_agent(name, source)
        }
        .await;
        self.echo(caller, result, |_| format!("Agent '{name}' added to the list"))
            .await
    }

    fn add_agent(&self, name: &str, source: &str) -> Result<String> {
        if source.trim().is_empty() {
            return Err(LifecycleError::SourceRequired(name.to_string()).into());
        }
        let mut agents = store::load_agents(self.fs, self.paths)?;
        if agents.contains(name) {
            tracing::info!(agent = name, "tried to add existing agent");
            return Err(LifecycleError::AlreadyExists(name.to_string()).into());
        }
        let source = normalize_source(source);
        agents.insert(name, AgentRecord::known(&source));
        store::save_agents(self.fs, self.paths, &agents)?;
        tracing::info!(agent = name, source = %source, "added to agent list");
        Ok(source)
    }

    /// Fetch, stage and register an agent, then launch it if it declares a
    /// run script.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyInstalled`] if already installed.
    /// - [`LifecycleError::SourceRequired`] if unknown and no source given.
    /// - [`LifecycleError::FetchFailed`] / [`LifecycleError::MissingVersion`]
    ///   with no state change.
    /// - Filesystem failures while staging or saving state.
    pub async fn install(
        &self,
        caller: &Caller,
        name: &str,
        source: Option<&str>,
    ) -> Result<InstallOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.install_agent(name, source).await
        }
        .await;
        self.echo(caller, result, |o| {
            format!("Agent '{name}' {} installed correctly", o.version)
        })
        .await
    }

    async fn install_agent(&self, name: &str, source: Option<&str>) -> Result<InstallOutcome> {
        let mut agents = store::load_agents(self.fs, self.paths)?;
        if agents.is_installed(name) {
            tracing::info!(agent = name, "already installed");
            return Err(LifecycleError::AlreadyInstalled(name.to_string()).into());
        }
        let source = match (agents.get(name), source) {
            (Some(record), _) => record.source.clone(),
            (None, Some(s)) if !s.trim().is_empty() => normalize_source(s),
            (None, _) => return Err(LifecycleError::SourceRequired(name.to_string()).into()),
        };

        let descriptor = self.fetch_descriptor(name, &source).await?;
        if !agents.contains(name) {
            agents.insert(name, AgentRecord::known(&source));
            store::save_agents(self.fs, self.paths, &agents)?;
            tracing::debug!(agent = name, "added to agent list");
        }

        let mut runtime = store::load_runtime_config(self.fs, self.paths)?;
        let base = self.config.base_port();
        let port = port_alloc::allocate_from(&runtime, base)?
            .with_context(|| format!("no free port above {base}"))?;

        let staging_dir = self.paths.staging_dir(name);
        let mut hooks = Vec::new();
        hooks.extend(self.hook(name, Hook::PreInstall).await);

        self.reporter.step(&format!("installing '{name}' {}...", descriptor.version));
        let staged = match staging::stage(self.fs, &staging_dir, &self.paths.home, None) {
            Ok(staged) => staged,
            Err(failure) => return Err(self.abandon_install(name, failure)),
        };
        self.mark_executables(name, &staged.manifest, &descriptor);

        runtime.set_agent_port(name, port);
        topics::subscribe_at_install(&mut runtime, name, &descriptor.topics);
        store::save_runtime_config(self.fs, self.paths, &runtime)?;

        store::write_manifest(self.fs, &self.paths.manifest(name), &staged.manifest)?;
        if let Some(record) = agents.get_mut(name) {
            record.mark_installed(descriptor.version.clone(), descriptor.script.clone());
        }
        store::save_agents(self.fs, self.paths, &agents)?;
        tracing::info!(agent = name, version = %descriptor.version, port, "installed");

        hooks.extend(self.hook(name, Hook::PostInstall).await);
        let config_files = self.store_config_manifest(name, &descriptor)?;
        self.discard_staging(name);
        self.reporter.success(&format!(
            "agent '{name}' {} installed on port {port}",
            descriptor.version
        ));

        let launched = if descriptor.is_launchable() {
            self.launch_after(name, &agents, false).await
        } else {
            None
        };

        Ok(InstallOutcome {
            version: descriptor.version,
            port,
            files: staged.manifest.len(),
            config_files,
            hooks,
            launched,
        })
    }

    /// Move an installed agent to a newer release.
    ///
    /// A fetched version that is not newer than the installed one yields
    /// [`UpdateOutcome::AlreadyUpToDate`] and leaves every file untouched.
    /// A running agent is restarted afterwards; a stopped one stays stopped.
    ///
    /// If staging fails partway, the file manifest is rewritten to list what
    /// is actually on disk and the version is left as it was.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotInstalled`] if the agent is not installed.
    /// - [`LifecycleError::FetchFailed`] / [`LifecycleError::MissingVersion`].
    /// - Filesystem failures while staging or saving state.
    pub async fn update(&self, caller: &Caller, name: &str) -> Result<UpdateOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.update_agent(name).await
        }
        .await;
        self.echo(caller, result, |o| match o {
            UpdateOutcome::AlreadyUpToDate { .. } => {
                LifecycleError::AlreadyUpToDate(name.to_string()).to_string()
            }
            UpdateOutcome::Updated(r) => format!("Updated agent '{name}' to {}", r.to),
        })
        .await
    }

    async fn update_agent(&self, name: &str) -> Result<UpdateOutcome> {
        let mut agents = store::load_agents(self.fs, self.paths)?;
        let Some((source, installed)) = agents
            .get(name)
            .filter(|r| r.installed)
            .and_then(|r| Some((r.source.clone(), r.version.clone()?)))
        else {
            tracing::info!(agent = name, "not installed");
            return Err(LifecycleError::NotInstalled(name.to_string()).into());
        };

        let descriptor = self.fetch_descriptor(name, &source).await?;
        if descriptor.version <= installed {
            tracing::info!(agent = name, installed = %installed, remote = %descriptor.version, "already up-to-date");
            self.discard_staging(name);
            return Ok(UpdateOutcome::AlreadyUpToDate {
                installed,
                remote: descriptor.version,
            });
        }

        let was_running = self.is_running(name);
        let mut hooks = Vec::new();
        hooks.extend(self.hook(name, Hook::PreUpdate).await);

        self.reporter
            .step(&format!("updating '{name}' {installed} -> {}...", descriptor.version));
        let manifest_path = self.paths.manifest(name);
        let previous = store::read_manifest(self.fs, &manifest_path)?.unwrap_or_default();
        let staging_dir = self.paths.staging_dir(name);
        let staged =
            match staging::stage(self.fs, &staging_dir, &self.paths.home, Some(&previous)) {
                Ok(staged) => staged,
                Err(failure) => return Err(self.record_partial_update(name, failure)),
            };
        self.mark_executables(name, &staged.manifest, &descriptor);
        store::write_manifest(self.fs, &manifest_path, &staged.manifest)?;

        if let Some(record) = agents.get_mut(name) {
            record.mark_installed(descriptor.version.clone(), descriptor.script.clone());
        }
        store::save_agents(self.fs, self.paths, &agents)?;

        if !descriptor.topics.is_empty() {
            let mut runtime = store::load_runtime_config(self.fs, self.paths)?;
            topics::resync_at_update(&mut runtime, name, &descriptor.topics);
            store::save_runtime_config(self.fs, self.paths, &runtime)?;
        }
        tracing::info!(agent = name, from = %installed, to = %descriptor.version, "updated");

        hooks.extend(self.hook(name, Hook::PostUpdate).await);
        self.store_config_manifest(name, &descriptor)?;
        self.discard_staging(name);
        self.reporter
            .success(&format!("agent '{name}' updated to {}", descriptor.version));

        // A stopped agent stays stopped.
        let launched = if descriptor.is_launchable() && was_running {
            self.launch_after(name, &agents, true).await
        } else {
            tracing::debug!(agent = name, was_running, "not relaunching after update");
            None
        };

        Ok(UpdateOutcome::Updated(UpdateReport {
            from: installed,
            to: descriptor.version,
            files: staged.manifest.len(),
            removed: staged.removed,
            hooks,
            launched,
        }))
    }

    /// Uninstall an agent, keeping its config files.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotInstalled`] if the agent is not installed, or a
    /// filesystem failure while removing files or saving state.
    pub async fn remove(&self, caller: &Caller, name: &str) -> Result<RemoveOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            let mut agents = store::load_agents(self.fs, self.paths)?;
            self.remove_agent(name, &mut agents).await
        }
        .await;
        self.echo(caller, result, |_| format!("Agent '{name}' uninstalled"))
            .await
    }

    async fn remove_agent(&self, name: &str, agents: &mut AgentList) -> Result<RemoveOutcome> {
        if !agents.is_installed(name) {
            tracing::info!(agent = name, "not installed");
            return Err(LifecycleError::NotInstalled(name.to_string()).into());
        }

        let was_running = self.is_running(name);
        if was_running && let Err(e) = self.stop_agent(name).await {
            tracing::warn!(agent = name, error = %e, "stop failed; removing anyway");
            self.reporter
                .warn(&format!("could not stop '{name}': {e}; continuing removal"));
        }

        let mut runtime = store::load_runtime_config(self.fs, self.paths)?;
        runtime.remove_agent(name);
        topics::unsubscribe_all(&mut runtime, name);
        store::save_runtime_config(self.fs, self.paths, &runtime)?;

        let keep = store::read_manifest(self.fs, &self.paths.config_manifest(name))?
            .unwrap_or_default();
        let manifest_path = self.paths.manifest(name);
        let manifest = store::read_manifest(self.fs, &manifest_path)?.unwrap_or_default();
        self.reporter
            .step(&format!("removing {} files of '{name}'...", manifest.len()));
        let mut files = 0;
        for relative in manifest.paths() {
            if keep.contains(relative) {
                continue;
            }
            staging::remove_installed(self.fs, &self.paths.home, relative)?;
            files += 1;
        }
        store::delete_manifest(self.fs, &manifest_path)?;

        if let Some(record) = agents.get_mut(name) {
            record.mark_removed();
        }
        store::save_agents(self.fs, self.paths, agents)?;
        tracing::info!(agent = name, files, "uninstalled");
        self.reporter.success(&format!("agent '{name}' removed"));

        Ok(RemoveOutcome {
            files,
            was_running,
            config_files_kept: keep.len(),
        })
    }

    /// Remove the agent if still installed, then delete its config files.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NoConfigFiles`] when the agent was not installed
    /// and has no config-file manifest, or any error from removal.
    pub async fn purge(&self, caller: &Caller, name: &str) -> Result<PurgeOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.purge_agent(name).await
        }
        .await;
        self.echo(caller, result, |_| format!("Agent '{name}' purged"))
            .await
    }

    async fn purge_agent(&self, name: &str) -> Result<PurgeOutcome> {
        let mut agents = store::load_agents(self.fs, self.paths)?;
        let removed = if agents.is_installed(name) {
            Some(self.remove_agent(name, &mut agents).await?)
        } else {
            None
        };

        let conf_path = self.paths.config_manifest(name);
        let Some(conf) = store::read_manifest(self.fs, &conf_path)? else {
            tracing::info!(agent = name, "no config files");
            if removed.is_none() {
                return Err(LifecycleError::NoConfigFiles(name.to_string()).into());
            }
            self.reporter.warn(&format!("agent '{name}' has no config files"));
            return Ok(PurgeOutcome {
                removed,
                config_files: 0,
            });
        };

        for relative in conf.paths() {
            tracing::debug!(agent = name, file = %relative, "removing config file");
            staging::remove_installed(self.fs, &self.paths.home, relative)?;
        }
        store::delete_manifest(self.fs, &conf_path)?;
        tracing::info!(agent = name, "purged");
        self.reporter.success(&format!("agent '{name}' purged"));
        Ok(PurgeOutcome {
            removed,
            config_files: conf.len(),
        })
    }

    /// Drop a not-installed agent from the list.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::StillInstalled`] if installed (the list is left
    /// untouched), [`LifecycleError::NotFound`] if unknown.
    pub async fn forget(&self, caller: &Caller, name: &str) -> Result<()> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.forget_agent(name)
        }
        .await;
        self.echo(caller, result, |_| {
            format!("Removed agent '{name}' from agent list")
        })
        .await
    }

    fn forget_agent(&self, name: &str) -> Result<()> {
        let mut agents = store::load_agents(self.fs, self.paths)?;
        if agents.is_installed(name) {
            tracing::info!(agent = name, "tried to forget installed agent");
            return Err(LifecycleError::StillInstalled(name.to_string()).into());
        }
        if agents.remove(name).is_none() {
            return Err(LifecycleError::NotFound(name.to_string()).into());
        }
        store::save_agents(self.fs, self.paths, &agents)?;
        tracing::info!(agent = name, "removed from list");
        Ok(())
    }

    /// Delete the whole staging root. A missing root is fine and removal
    /// failures are only logged.
    pub fn clean(&self) {
        if let Err(e) = self.fs.remove_dir_all(&self.paths.staging) {
            tracing::warn!(error = %e, "could not clean staging area");
        }
    }

    /// # Errors
    ///
    /// Returns an error if the agent list cannot be read.
    pub fn list(&self) -> Result<Vec<AgentStatus>> {
        let agents = store::load_agents(self.fs, self.paths)?;
        Ok(agents
            .iter()
            .map(|(name, record)| self.status(name, record))
            .collect())
    }

    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] if unknown, or a state file read error.
    pub fn info(&self, name: &str) -> Result<AgentInfo> {
        validate_agent_name(name)?;
        let agents = store::load_agents(self.fs, self.paths)?;
        let Some(record) = agents.get(name) else {
            return Err(LifecycleError::NotFound(name.to_string()).into());
        };
        let runtime = store::load_runtime_config(self.fs, self.paths)?;
        let read = |path: &Path| -> Result<Vec<String>> {
            Ok(store::read_manifest(self.fs, path)?
                .map(|m| m.paths().to_vec())
                .unwrap_or_default())
        };
        Ok(AgentInfo {
            status: self.status(name, record),
            script: record.script.clone(),
            pid: self.recorded_pid(name)?,
            port: runtime.agent_port(name)?,
            topics: topics::subscriptions(&runtime, name),
            files: read(&self.paths.manifest(name))?,
            config_files: read(&self.paths.config_manifest(name))?,
        })
    }

    // ── Steps ─────────────────────────────────────────────────────────────────

    fn status(&self, name: &str, record: &AgentRecord) -> AgentStatus {
        AgentStatus {
            name: name.to_string(),
            source: record.source.clone(),
            installed: record.installed,
            version: record.version.as_ref().map(ToString::to_string),
            running: self.is_running(name),
        }
    }

    /// Clear the agent's staging dir, fetch `source` into it and parse the
    /// info file. Any failure leaves the staging dir removed.
    async fn fetch_descriptor(&self, name: &str, source: &str) -> Result<AgentDescriptor> {
        let staging_dir = self.paths.staging_dir(name);
        self.discard_staging(name);
        self.reporter.step(&format!("fetching {source}..."));
        if let Err(e) = self.fetcher.fetch(source, &staging_dir).await {
            tracing::info!(agent = name, source, error = %e, "could not fetch source");
            self.discard_staging(name);
            return Err(LifecycleError::FetchFailed(format!("{source}: {e:#}")).into());
        }

        let info_path = self.paths.info_file(name);
        let text = if self.fs.exists(&info_path) {
            self.fs.read_to_string(&info_path)?
        } else {
            String::new()
        };
        match parse_info(&text) {
            Ok(descriptor) => Ok(descriptor),
            Err(e) => {
                self.discard_staging(name);
                Err(match e {
                    ParseError::MissingVersion => {
                        tracing::info!(agent = name, "missing version information");
                        LifecycleError::MissingVersion(name.to_string()).into()
                    }
                    ParseError::InvalidValue { key, value, expected, .. } if key == "version" => {
                        LifecycleError::InvalidVersion {
                            name: name.to_string(),
                            version: value,
                            reason: format!("not a {expected}"),
                        }
                        .into()
                    }
                    other => anyhow::Error::new(other)
                        .context(format!("invalid info file for '{name}'")),
                })
            }
        }
    }

    async fn hook(&self, name: &str, hook: Hook) -> Option<HookReport> {
        let script = self.paths.hook(name, hook);
        let report = run_hook(
            self.runner,
            self.fs,
            hook,
            &script,
            &self.paths.staging_dir(name),
        )
        .await;
        if let Some(HookReport {
            exit_code: Some(code),
            ..
        }) = &report
            && *code != 0
        {
            self.reporter
                .warn(&format!("{} hook exited with code {code}", hook.file_name()));
        }
        report
    }

    fn mark_executables(&self, name: &str, manifest: &FileManifest, descriptor: &AgentDescriptor) {
        let script = descriptor
            .script
            .as_ref()
            .map(|s| self.paths.agent_dir(name).join(s));
        staging::mark_executables(self.fs, &self.paths.home, manifest, script.as_deref());
    }

    /// Persist the staged config-file list, if the agent ships one.
    fn store_config_manifest(&self, name: &str, descriptor: &AgentDescriptor) -> Result<usize> {
        let list = self.paths.staged_conf_list(name, descriptor.conf.as_deref());
        if !self.fs.exists(&list) {
            if let Some(conf) = &descriptor.conf {
                tracing::warn!(agent = name, conf = %conf, "declared config list not found");
            }
            return Ok(0);
        }
        let text = self
            .fs
            .read_to_string(&list)
            .with_context(|| format!("reading {}", list.display()))?;
        let entries: Vec<String> = FileManifest::parse(&text)
            .paths()
            .iter()
            .filter(|p| {
                let ok = is_safe_relative(p);
                if !ok {
                    tracing::warn!(agent = name, path = %p, "ignoring unsafe config path");
                }
                ok
            })
            .cloned()
            .collect();
        let count = entries.len();
        store::write_manifest(
            self.fs,
            &self.paths.config_manifest(name),
            &FileManifest::new(entries),
        )?;
        Ok(count)
    }

    /// Launch after install, or stop-then-launch after update. Failures are
    /// warnings: the files and state are already in place.
    async fn launch_after(
        &self,
        name: &str,
        agents: &AgentList,
        restart: bool,
    ) -> Option<LaunchOutcome> {
        if restart
            && self.is_running(name)
            && let Err(e) = self.stop_agent(name).await
        {
            tracing::warn!(agent = name, error = %e, "stop before relaunch failed");
        }
        match self.launch_agent(name, agents).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(agent = name, error = %e, "launch failed");
                self.reporter.warn(&format!("could not launch '{name}': {e}"));
                None
            }
        }
    }

    /// Undo a fresh install that stopped while copying: nothing owned the
    /// copied files before, so they are deleted again.
    fn abandon_install(&self, name: &str, failure: StageFailure) -> anyhow::Error {
        tracing::warn!(
            agent = name,
            copied = failure.copied.len(),
            error = %failure.error,
            "install failed while staging; rolling back"
        );
        for relative in &failure.copied {
            if let Err(e) = staging::remove_installed(self.fs, &self.paths.home, relative) {
                tracing::warn!(agent = name, file = %relative, error = %e, "could not roll back file");
            }
        }
        self.discard_staging(name);
        failure.error
    }

    /// Keep the manifest truthful after an update that stopped while
    /// staging. The recorded version is unchanged so a later update
    /// converges the rest.
    fn record_partial_update(&self, name: &str, failure: StageFailure) -> anyhow::Error {
        tracing::warn!(
            agent = name,
            placed = failure.placed.len(),
            error = %failure.error,
            "update failed while staging"
        );
        let manifest_path = self.paths.manifest(name);
        if let Err(e) = store::write_manifest(self.fs, &manifest_path, &failure.placed) {
            tracing::warn!(agent = name, error = %e, "could not record partially staged files");
        }
        self.reporter
            .warn(&format!("update of '{name}' stopped partway; run update again"));
        self.discard_staging(name);
        failure.error
    }

    fn discard_staging(&self, name: &str) {
        let dir = self.paths.staging_dir(name);
        if let Err(e) = self.fs.remove_dir_all(&dir) {
            tracing::debug!(dir = %dir.display(), error = %e, "staging cleanup failed");
        }
    }
}
