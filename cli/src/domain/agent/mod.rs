//! Domain logic for agent management — pure functions, no I/O, no async.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.

pub mod descriptor;
pub mod record;
pub mod validate;

pub use descriptor::{AgentDescriptor, parse_info};
pub use record::{AgentList, AgentRecord};
pub use validate::{AGENT_NAME_RE, is_valid_agent_name, normalize_source, validate_agent_name};
