//! Command implementations

pub mod config;
pub mod lifecycle;
pub mod list;
pub mod process;
pub mod version;

use clap::Args;

/// Arguments for commands that act on a single agent.
#[derive(Args)]
pub struct NameArgs {
    /// Agent name
    pub name: String,
}
