use serde::{Deserialize, Serialize};

/// Where the bus host listens for control messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusEndpoint {
    /// Host name agents register under and hive connects to
    /// (default: `localhost`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Control port of the bus server (default: 30000).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    30000
}

impl Default for BusEndpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl BusEndpoint {
    /// `host:port` form suitable for a socket connect.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
