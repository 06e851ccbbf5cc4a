//! Integration tests for the hive CLI
//!
//! These tests spawn the actual binary against a throwaway home directory.
//! They are slower and should be run separately from unit tests.

mod config_command;
mod registry_commands;
