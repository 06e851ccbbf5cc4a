//! The bus host's runtime configuration: per-agent port sections and
//! per-topic subscriber sections, layered over the generic section file so
//! that sections the host owns (e.g. `[server]`) survive a rewrite.

use crate::domain::error::ParseError;
use crate::domain::sections::Sections;

pub const AGENT_SECTION_PREFIX: &str = "agent ";
pub const TOPIC_SECTION_PREFIX: &str = "topic ";

#[must_use]
pub fn agent_section(name: &str) -> String {
    format!("{AGENT_SECTION_PREFIX}{name}")
}

#[must_use]
pub fn topic_section(topic: &str) -> String {
    format!("{TOPIC_SECTION_PREFIX}{topic}")
}

/// Shared runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    doc: Sections,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_sections(doc: Sections) -> Self {
        Self { doc }
    }

    #[must_use]
    pub fn sections(&self) -> &Sections {
        &self.doc
    }

    #[must_use]
    pub fn into_sections(self) -> Sections {
        self.doc
    }

    /// Port held by `agent <name>`, if the section exists.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the stored port is not a u16.
    pub fn agent_port(&self, name: &str) -> Result<Option<u16>, ParseError> {
        let section = agent_section(name);
        self.doc
            .get(&section, "port")
            .map(|raw| parse_port(&section, raw))
            .transpose()
    }

    #[must_use]
    pub fn has_agent(&self, name: &str) -> bool {
        self.doc.contains(&agent_section(name))
    }

    /// Create (or overwrite) the `agent <name>` section.
    pub fn set_agent_port(&mut self, name: &str, port: u16) {
        self.doc.set(&agent_section(name), "port", port.to_string());
    }

    /// Drop the `agent <name>` section, releasing its port.
    pub fn remove_agent(&mut self, name: &str) -> bool {
        self.doc.remove_section(&agent_section(name))
    }

    /// Every `port` value across all sections, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] on the first non-numeric port.
    pub fn used_ports(&self) -> Result<Vec<u16>, ParseError> {
        self.doc
            .iter()
            .filter_map(|s| s.get("port").map(|raw| parse_port(s.name(), raw)))
            .collect()
    }

    /// Topic names (without prefix) that have a section.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.doc
            .names()
            .filter_map(|n| n.strip_prefix(TOPIC_SECTION_PREFIX))
            .map(String::from)
            .collect()
    }

    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.doc.contains(&topic_section(topic))
    }

    /// Subscribers of `topic`; empty when the topic has no section.
    #[must_use]
    pub fn subscribers(&self, topic: &str) -> Vec<String> {
        self.doc
            .get(&topic_section(topic), "agents")
            .unwrap_or("")
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    /// Create an empty `topic <topic>` section if absent.
    pub fn ensure_topic(&mut self, topic: &str) {
        let section = topic_section(topic);
        if !self.doc.contains(&section) {
            self.doc.set(&section, "agents", "");
        }
    }

    pub fn set_subscribers(&mut self, topic: &str, agents: &[String]) {
        self.doc.set(&topic_section(topic), "agents", agents.join(" "));
    }

    pub fn remove_topic(&mut self, topic: &str) -> bool {
        self.doc.remove_section(&topic_section(topic))
    }
}

fn parse_port(section: &str, raw: &str) -> Result<u16, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidValue {
        section: section.to_string(),
        key: "port".to_string(),
        expected: "port number",
        value: raw.to_string(),
    })
}
