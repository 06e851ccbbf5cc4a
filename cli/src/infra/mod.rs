//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, source fetching, the bus connection and the operation lock.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod bus;
pub mod command_runner;
pub mod config;
pub mod fetch;
pub mod fs;
pub mod lock;
pub mod permissions;
pub mod process;
