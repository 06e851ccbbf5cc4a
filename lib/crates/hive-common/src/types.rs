use serde::{Deserialize, Serialize};

/// Snapshot of one known agent, as reported by `hive list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub source: String,
    pub installed: bool,
    /// Installed version; `None` when not installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether a PID marker exists for the agent.
    pub running: bool,
}
