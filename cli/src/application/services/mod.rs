//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` — never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod engine;
pub mod hooks;
pub mod lifecycle;
pub mod process;
pub mod staging;
pub mod store;

pub use engine::{Caller, Engine};
pub use lifecycle::{
    AgentInfo, InstallOutcome, PurgeOutcome, RemoveOutcome, UpdateOutcome, UpdateReport,
};
pub use process::LaunchOutcome;
