//! Process handle: PID-marker bookkeeping for launch, stop and restart.

use anyhow::{Context, Result};
use hive_common::BusMessage;

use crate::application::ports::{
    Authorizer, BusPublisher, CommandRunner, LocalFs, ProcessControl, ProgressReporter,
    SourceFetcher,
};
use crate::application::services::engine::{Caller, Engine};
use crate::application::services::store;
use crate::domain::agent::{AgentList, validate_agent_name};
use crate::domain::error::LifecycleError;

/// A freshly spawned agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub pid: u32,
    /// Allocated port, if the runtime config has one.
    pub port: Option<u16>,
    /// Whether the registration message reached the bus.
    pub registered: bool,
}

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
    /// Marker-based: true iff the agent's PID marker exists.
    #[must_use]
    pub fn is_running(&self, name: &str) -> bool {
        self.fs.exists(&self.paths.pid_marker(name))
    }

    /// The PID recorded in the marker; `None` if there is no marker or it
    /// does not hold a number.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be read.
    pub fn recorded_pid(&self, name: &str) -> Result<Option<u32>> {
        let marker = self.paths.pid_marker(name);
        if !self.fs.exists(&marker) {
            return Ok(None);
        }
        let raw = self
            .fs
            .read_to_string(&marker)
            .with_context(|| format!("reading {}", marker.display()))?;
        let pid = raw.trim().parse::<u32>().ok();
        if pid.is_none() {
            tracing::warn!(agent = name, content = raw.trim(), "PID marker holds no PID");
        }
        Ok(pid)
    }

    /// # Errors
    ///
    /// See [`Engine::launch_agent`].
    pub async fn launch(&self, caller: &Caller, name: &str) -> Result<LaunchOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            let agents = store::load_agents(self.fs, self.paths)?;
            self.launch_agent(name, &agents).await
        }
        .await;
        self.echo(caller, result, |_| format!("Launching agent '{name}'"))
            .await
    }

    /// # Errors
    ///
    /// See [`Engine::stop_agent`].
    pub async fn stop(&self, caller: &Caller, name: &str) -> Result<u32> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            self.stop_agent(name).await
        }
        .await;
        self.echo(caller, result, |_| format!("Stopping agent '{name}'"))
            .await
    }

    /// Stop then launch a running agent.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotRunning`] if there is no marker, or any
    /// error from stopping or launching.
    pub async fn restart(&self, caller: &Caller, name: &str) -> Result<LaunchOutcome> {
        let result = async {
            self.authorize(caller)?;
            validate_agent_name(name)?;
            if !self.is_running(name) {
                return Err(LifecycleError::NotRunning(name.to_string()).into());
            }
            let agents = store::load_agents(self.fs, self.paths)?;
            self.stop_agent(name).await?;
            self.launch_agent(name, &agents).await
        }
        .await;
        self.echo(caller, result, |_| format!("Restarting agent '{name}'"))
            .await
    }

    /// Spawn the agent's run script, write its PID marker and register it
    /// with the bus.
    ///
    /// A marker whose PID is no longer alive is removed first.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyRunning`] if a live marker exists.
    /// - [`LifecycleError::AgentDirMissing`] if the install dir is absent.
    /// - [`LifecycleError::NoRunScript`] if no run script is recorded.
    /// - Spawn or marker write failures.
    pub(crate) async fn launch_agent(&self, name: &str, agents: &AgentList) -> Result<LaunchOutcome> {
        self.clear_stale_marker(name).await?;
        if self.is_running(name) {
            tracing::info!(agent = name, "already running");
            return Err(LifecycleError::AlreadyRunning(name.to_string()).into());
        }

        let agent_dir = self.paths.agent_dir(name);
        if !self.fs.is_dir(&agent_dir) {
            return Err(LifecycleError::AgentDirMissing(name.to_string()).into());
        }
        let Some(script) = agents.get(name).and_then(|r| r.script.as_deref()) else {
            return Err(LifecycleError::NoRunScript(name.to_string()).into());
        };

        self.reporter.step(&format!("launching '{name}'..."));
        let program = agent_dir.join(script);
        let pid = self
            .process
            .spawn_detached(&program, &agent_dir, &self.paths.log_file(name))
            .with_context(|| format!("launching {}", program.display()))?;
        let marker = self.paths.pid_marker(name);
        self.fs
            .write_atomic(&marker, &pid.to_string())
            .with_context(|| format!("writing {}", marker.display()))?;
        tracing::info!(agent = name, pid, "launched");

        let port = store::load_runtime_config(self.fs, self.paths)?.agent_port(name)?;
        let registered = match port {
            Some(port) => self.register(name, port).await,
            None => {
                tracing::warn!(agent = name, "no port allocated; skipping registration");
                false
            }
        };
        self.reporter.success(&format!("agent '{name}' launched (pid {pid})"));
        Ok(LaunchOutcome {
            pid,
            port,
            registered,
        })
    }

    async fn register(&self, name: &str, port: u16) -> bool {
        let msg = BusMessage::register(name, &self.config.bus.host, port);
        match self.bus.send(&msg).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(agent = name, error = %e, "registration not delivered");
                self.reporter
                    .warn(&format!("could not register '{name}' with the bus: {e}"));
                false
            }
        }
    }

    /// Signal the recorded PID and delete the marker once delivered.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotRunning`] if there is no marker.
    /// - [`LifecycleError::StopFailed`] if the marker is unreadable or the
    ///   signal is not delivered; the marker is left in place.
    pub(crate) async fn stop_agent(&self, name: &str) -> Result<u32> {
        if !self.is_running(name) {
            tracing::info!(agent = name, "not running");
            return Err(LifecycleError::NotRunning(name.to_string()).into());
        }
        let stop_failed = |reason: String| LifecycleError::StopFailed {
            name: name.to_string(),
            reason,
        };
        let Some(pid) = self.recorded_pid(name)? else {
            return Err(stop_failed("PID marker does not hold a process id".into()).into());
        };

        self.reporter.step(&format!("stopping '{name}' (pid {pid})..."));
        match self.process.terminate(pid).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(stop_failed(format!("signal to pid {pid} was not delivered")).into());
            }
            Err(e) => return Err(stop_failed(format!("{e:#}")).into()),
        }
        let marker = self.paths.pid_marker(name);
        self.fs
            .remove_file(&marker)
            .with_context(|| format!("removing {}", marker.display()))?;
        tracing::info!(agent = name, pid, "stopped");
        self.reporter.success(&format!("agent '{name}' stopped"));
        Ok(pid)
    }

    /// Remove a marker whose process is gone. A probe that cannot run keeps
    /// the marker.
    async fn clear_stale_marker(&self, name: &str) -> Result<()> {
        if !self.is_running(name) {
            return Ok(());
        }
        let alive = match self.recorded_pid(name)? {
            Some(pid) => self.process.is_alive(pid).await.unwrap_or_else(|e| {
                tracing::warn!(agent = name, pid, error = %e, "liveness probe failed");
                true
            }),
            None => false,
        };
        if alive {
            return Ok(());
        }
        tracing::warn!(agent = name, "removing stale PID marker");
        self.reporter
            .warn(&format!("'{name}' had a stale PID marker; removed it"));
        let marker = self.paths.pid_marker(name);
        self.fs
            .remove_file(&marker)
            .with_context(|| format!("removing {}", marker.display()))
    }
}
