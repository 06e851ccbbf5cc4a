//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::application::services::Caller;
use crate::commands;
use crate::infra::config::YamlConfigStore;

/// Install, update and supervise agents on a message-bus host
#[derive(Parser)]
#[command(
    name = "hive",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log verbosity (-v info, -vv debug); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Act on behalf of this bus user (checked against `admins`)
    #[arg(long, global = true, value_name = "USER")]
    pub sender: Option<String>,

    /// Channel to relay feedback on when acting for `--sender`
    #[arg(long, global = true, value_name = "CHANNEL", requires = "sender")]
    pub channel: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register an agent source without installing it
    Add(commands::lifecycle::AddArgs),

    /// Fetch, install and launch an agent
    Install(commands::lifecycle::InstallArgs),

    /// Upgrade an installed agent when a newer version is available
    Update(commands::NameArgs),

    /// Stop and uninstall an agent, keeping its configuration files
    Remove(commands::NameArgs),

    /// Remove an agent and delete its configuration files
    Purge(commands::lifecycle::PurgeArgs),

    /// Drop an uninstalled agent from the list
    Forget(commands::NameArgs),

    /// Start an installed agent
    Launch(commands::NameArgs),

    /// Stop a running agent
    Stop(commands::NameArgs),

    /// Stop and start a running agent
    Restart(commands::NameArgs),

    /// Delete the staging area
    Clean,

    /// List known agents
    List,

    /// Show one agent's record and manifests
    Info(commands::NameArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command
    /// fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            sender,
            channel,
            command,
        } = self;

        if matches!(command, Command::Version) {
            commands::version::run(json)?;
            return Ok(ExitCode::SUCCESS);
        }

        let caller = match sender.as_deref() {
            Some(sender) => Caller::remote(sender, channel.as_deref()),
            None => Caller::local(),
        };
        let purge_yes = matches!(&command, Command::Purge(args) if args.yes);
        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes: purge_yes },
            caller,
        };
        let app = AppContext::new(flags, &YamlConfigStore)?;

        match command {
            Command::Add(args) => commands::lifecycle::add(&app, &args).await,
            Command::Install(args) => commands::lifecycle::install(&app, &args).await,
            Command::Update(args) => commands::lifecycle::update(&app, &args).await,
            Command::Remove(args) => commands::lifecycle::remove(&app, &args).await,
            Command::Purge(args) => commands::lifecycle::purge(&app, &args).await,
            Command::Forget(args) => commands::lifecycle::forget(&app, &args).await,
            Command::Launch(args) => commands::process::launch(&app, &args).await,
            Command::Stop(args) => commands::process::stop(&app, &args).await,
            Command::Restart(args) => commands::process::restart(&app, &args).await,
            Command::Clean => commands::lifecycle::clean(&app),
            Command::List => commands::list::list(&app),
            Command::Info(args) => commands::list::info(&app, &args),
            Command::Config(cmd) => commands::config::run(&app, &cmd),
            Command::Version => commands::version::run(json).map(|()| ExitCode::SUCCESS),
        }
    }
}
