//! Agent info file parser.
//!
//! The info file shipped inside an agent's source tree is a flat
//! `key = value` block. It is parsed once into an [`AgentDescriptor`] with
//! explicit optional fields so later steps match on presence instead of
//! re-reading raw strings.

use semver::Version;

use crate::domain::error::ParseError;
use crate::domain::manifest::is_safe_relative;
use crate::domain::sections::Sections;

/// Name of the synthetic section wrapped around the info block.
const INFO_SECTION: &str = "info";

/// Parsed agent metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    /// Mandatory semantic version.
    pub version: Version,
    /// Run script relative to the agent's install directory.
    pub script: Option<String>,
    /// Topics the agent subscribes to, in declaration order, deduplicated.
    pub topics: Vec<String>,
    /// File (inside the metadata directory) listing the agent's config files.
    pub conf: Option<String>,
    pub license: Option<String>,
    pub maintainer: Option<String>,
    pub description: Option<String>,
}

impl AgentDescriptor {
    /// Whether the agent has a process to launch. Agents made only of
    /// command or mail processors have no run script.
    #[must_use]
    pub fn is_launchable(&self) -> bool {
        self.script.is_some()
    }
}

/// Parse the contents of an info file.
///
/// Unknown keys are ignored. Empty values count as absent.
///
/// # Errors
///
/// - [`ParseError::MissingVersion`] when `version` is absent or empty.
/// - [`ParseError::InvalidValue`] when `version` is not semver, `script`
///   escapes the agent directory or `conf` escapes the metadata directory.
/// - Any syntax error from the underlying section reader.
pub fn parse_info(text: &str) -> Result<AgentDescriptor, ParseError> {
    let info = Sections::parse_flat(text, INFO_SECTION)?;
    let field = |key: &str| {
        info.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    let raw_version = field("version").ok_or(ParseError::MissingVersion)?;
    let version = Version::parse(&raw_version).map_err(|_| ParseError::InvalidValue {
        section: INFO_SECTION.to_string(),
        key: "version".to_string(),
        expected: "semantic version",
        value: raw_version.clone(),
    })?;

    let script = field("script");
    if let Some(s) = &script
        && (s.starts_with('/') || s.split('/').any(|part| part == ".."))
    {
        return Err(ParseError::InvalidValue {
            section: INFO_SECTION.to_string(),
            key: "script".to_string(),
            expected: "path inside the agent directory",
            value: s.clone(),
        });
    }

    let conf = field("conf");
    if let Some(c) = &conf
        && !is_safe_relative(c)
    {
        return Err(ParseError::InvalidValue {
            section: INFO_SECTION.to_string(),
            key: "conf".to_string(),
            expected: "path inside the metadata directory",
            value: c.clone(),
        });
    }

    let mut topics: Vec<String> = Vec::new();
    for topic in field("topics").unwrap_or_default().split_whitespace() {
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }

    Ok(AgentDescriptor {
        version,
        script,
        topics,
        conf,
        license: field("license"),
        maintainer: field("maintainer"),
        description: field("description"),
    })
}
