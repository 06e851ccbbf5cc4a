//! Agent list records and their section-file mapping.

use std::collections::BTreeMap;

use semver::Version;

use crate::domain::error::ParseError;
use crate::domain::sections::Sections;

/// One known agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRecord {
    /// URI the agent's code is fetched from.
    pub source: String,
    pub installed: bool,
    /// Last installed version; `None` when not installed.
    pub version: Option<Version>,
    /// Run script recorded at install/update time.
    pub script: Option<String>,
}

impl AgentRecord {
    /// Fresh, not-installed record.
    #[must_use]
    pub fn known(source: &str) -> Self {
        Self {
            source: source.to_string(),
            installed: false,
            version: None,
            script: None,
        }
    }

    /// Mark installed at `version`.
    pub fn mark_installed(&mut self, version: Version, script: Option<String>) {
        self.installed = true;
        self.version = Some(version);
        self.script = script;
    }

    /// Back to the "known" state: keeps only the source.
    pub fn mark_removed(&mut self) {
        self.installed = false;
        self.version = None;
        self.script = None;
    }
}

/// The persistent agent list, keyed by agent name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentList {
    records: BTreeMap<String, AgentRecord>,
}

impl AgentList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AgentRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AgentRecord> {
        self.records.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// `installed` flag of `name`; unknown names are not installed.
    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.records.get(name).is_some_and(|r| r.installed)
    }

    pub fn insert(&mut self, name: &str, record: AgentRecord) {
        self.records.insert(name.to_string(), record);
    }

    pub fn remove(&mut self, name: &str) -> Option<AgentRecord> {
        self.records.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AgentRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build from the section file: one section per agent with `source`,
    /// `installed` (`0`/`1`), `version` and optional `script`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] when `installed` is not `0`/`1`,
    /// or when an installed record lacks a valid semantic version.
    pub fn from_sections(doc: &Sections) -> Result<Self, ParseError> {
        let mut list = Self::new();
        for section in doc.iter() {
            let name = section.name();
            let invalid = |key: &str, expected: &'static str, value: &str| ParseError::InvalidValue {
                section: name.to_string(),
                key: key.to_string(),
                expected,
                value: value.to_string(),
            };

            let installed = match section.get("installed").unwrap_or("0") {
                "0" | "" => false,
                "1" => true,
                other => return Err(invalid("installed", "0 or 1", other)),
            };
            let raw_version = section.get("version").unwrap_or("").trim();
            let version = if raw_version.is_empty() {
                None
            } else {
                Some(
                    Version::parse(raw_version)
                        .map_err(|_| invalid("version", "semantic version", raw_version))?,
                )
            };
            if installed && version.is_none() {
                return Err(invalid("version", "semantic version", raw_version));
            }

            list.insert(
                name,
                AgentRecord {
                    source: section.get("source").unwrap_or("").to_string(),
                    installed,
                    version: version.filter(|_| installed),
                    script: section
                        .get("script")
                        .filter(|s| !s.is_empty() && installed)
                        .map(String::from),
                },
            );
        }
        Ok(list)
    }

    /// Serialise to the section file layout.
    #[must_use]
    pub fn to_sections(&self) -> Sections {
        let mut doc = Sections::new();
        for (name, record) in &self.records {
            doc.set(name, "source", record.source.clone());
            doc.set(name, "installed", if record.installed { "1" } else { "0" });
            doc.set(
                name,
                "version",
                record.version.as_ref().map(ToString::to_string).unwrap_or_default(),
            );
            if let Some(script) = &record.script {
                doc.set(name, "script", script.clone());
            }
        }
        doc
    }
}
