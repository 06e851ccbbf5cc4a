//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod agent;
pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod port_alloc;
pub mod runtime_config;
pub mod sections;
pub mod topics;

pub use agent::{AgentDescriptor, AgentList, AgentRecord, parse_info, validate_agent_name};
pub use config::{EnvOverrides, HiveConfig, is_authorized, validate_config};
pub use error::{ConfigError, LifecycleError, ParseError};
pub use manifest::FileManifest;
pub use paths::{Hook, HivePaths};
pub use runtime_config::RuntimeConfig;
pub use sections::Sections;
