//! In-memory model of the `[section]` / `key = value` files shared with the
//! bus host (agent list, runtime config, agent info files).
//!
//! Pure functions only — no I/O, no async, no filesystem access. Section and
//! key order is preserved so that rewriting a file the host also edits keeps
//! its layout stable.

use crate::domain::error::ParseError;

/// One `[name]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value for `key`, if present. Keys are case-insensitive.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite `key`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// All entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// A whole section file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a section file. Blank lines and lines starting with `#` or `;`
    /// are ignored; `key = value` and `key: value` are both accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the first malformed line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| ParseError::MalformedSection {
                    line: line_no,
                    text: raw.to_string(),
                })?;
                current = Some(doc.ensure_section(name.trim()));
                continue;
            }

            let (key, value) = split_entry(line).ok_or_else(|| ParseError::MalformedLine {
                line: line_no,
                text: raw.to_string(),
            })?;
            let Some(section_idx) = current else {
                return Err(ParseError::KeyOutsideSection {
                    line: line_no,
                    key: key.to_string(),
                });
            };
            doc.sections[section_idx].set(key, value);
        }

        Ok(doc)
    }

    /// Parse a flat `key = value` block by wrapping it in a synthetic
    /// `[wrapper]` section first.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the first malformed line.
    pub fn parse_flat(text: &str, wrapper: &str) -> Result<Section, ParseError> {
        let doc = Self::parse(&format!("[{wrapper}]\n{text}"))?;
        Ok(doc
            .section(wrapper)
            .cloned()
            .unwrap_or_else(|| Section::new(wrapper)))
    }

    /// Serialise back to text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (k, v) in &section.entries {
                if v.is_empty() {
                    out.push_str(k);
                    out.push_str(" =\n");
                } else {
                    out.push_str(&format!("{k} = {v}\n"));
                }
            }
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Section names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Shorthand for `section(name)?.get(key)`.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    /// Set `key` in `section`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let idx = self.ensure_section(section);
        self.sections[idx].set(key, value);
    }

    /// Add an empty section. Returns `false` if it already existed.
    pub fn add_section(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.sections.push(Section::new(name));
        true
    }

    /// Remove a section. Returns `false` if it did not exist.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        before != self.sections.len()
    }

    fn ensure_section(&mut self, name: &str) -> usize {
        if let Some(idx) = self.sections.iter().position(|s| s.name == name) {
            return idx;
        }
        self.sections.push(Section::new(name));
        self.sections.len() - 1
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
