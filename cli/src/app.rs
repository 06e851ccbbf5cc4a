//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the loaded configuration and every production port
//! implementation; commands borrow an [`Engine`] from it.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::application::services::{Caller, Engine};
use crate::domain::config::HiveConfig;
use crate::domain::paths::HivePaths;
use crate::infra::bus::TcpBus;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, LONG_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::config::YamlConfigStore;
use crate::infra::fetch::GitFetcher;
use crate::infra::fs::HostFs;
use crate::infra::lock::OperationLock;
use crate::infra::permissions::AdminList;
use crate::infra::process::HostProcessControl;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `HIVE_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
    /// Who the command runs on behalf of.
    pub caller: Caller,
}

/// Engine type wired with the production ports.
pub type HostEngine<'a> = Engine<
    'a,
    HostFs,
    TokioCommandRunner,
    GitFetcher<TokioCommandRunner>,
    HostProcessControl<TokioCommandRunner>,
    TcpBus,
    AdminList,
    TerminalReporter<'a>,
>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub config: HiveConfig,
    /// File the configuration was read from (it may not exist).
    pub config_path: PathBuf,
    pub paths: HivePaths,
    pub caller: Caller,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
    fs: HostFs,
    hook_runner: TokioCommandRunner,
    fetcher: GitFetcher<TokioCommandRunner>,
    process: HostProcessControl<TokioCommandRunner>,
    bus: TcpBus,
    auth: AdminList,
}

impl AppContext {
    /// Load configuration and construct the production ports.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the home
    /// directory cannot be determined.
    pub fn new(flags: AppFlags, store: &impl ConfigStore) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("HIVE_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let config = store.load()?;
        let config_path = store.path()?;
        let default_home = match &config.home {
            Some(home) => home.clone(),
            None => YamlConfigStore::default_home()?,
        };
        let paths = HivePaths::from_config(&config, &default_home);
        tracing::debug!(config = %config_path.display(), home = %paths.home.display(), "loaded configuration");

        Ok(Self {
            // JSON mode keeps stdout for the JSON document only.
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            bus: TcpBus::new(&config.bus),
            auth: AdminList::new(&config.admins),
            config,
            config_path,
            paths,
            caller: flags.caller,
            non_interactive,
            fs: HostFs,
            hook_runner: TokioCommandRunner::new(LONG_CMD_TIMEOUT),
            fetcher: GitFetcher::new(TokioCommandRunner::new(LONG_CMD_TIMEOUT)),
            process: HostProcessControl::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT)),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Borrow the lifecycle engine for one command.
    #[must_use]
    pub fn engine<'a>(&'a self, reporter: &'a TerminalReporter<'a>) -> HostEngine<'a> {
        Engine {
            fs: &self.fs,
            runner: &self.hook_runner,
            fetcher: &self.fetcher,
            process: &self.process,
            bus: &self.bus,
            auth: &self.auth,
            reporter,
            config: &self.config,
            paths: &self.paths,
        }
    }

    /// Take the exclusive operation lock for a mutating command.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Busy` if another live hive process holds it.
    pub fn lock(&self) -> Result<OperationLock> {
        OperationLock::acquire(&self.paths.lock_file())
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `HIVE_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
