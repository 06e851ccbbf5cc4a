// lib/crates/hive-common/src/bus.rs

//! Messages hive produces for the bus host.
//!
//! The host speaks a flat `key=value&key=value` line protocol. Values are
//! percent-encoded so that `&`, `=` and newlines inside a feedback text
//! cannot split a field.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters escaped inside a wire value.
const VALUE_ESCAPES: &AsciiSet = &CONTROLS.add(b'&').add(b'=').add(b'%').add(b'\n').add(b'\r');

/// Destination of registration messages (the bus server itself).
pub const SERVER_DST: &str = "server";

/// Destination of user feedback messages.
pub const RELAY_DST: &str = "relay";

/// Error decoding a wire line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("field '{0}' has no '=' separator")]
    MissingSeparator(String),

    #[error("field key is empty")]
    EmptyKey,

    #[error("field '{0}' is not valid UTF-8 after decoding")]
    InvalidUtf8(String),
}

/// A single bus message: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BusMessage {
    fields: Vec<(String, String)>,
}

impl BusMessage {
    /// Empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    /// Registration request telling the bus where a freshly launched agent
    /// listens.
    #[must_use]
    pub fn register(name: &str, host: &str, port: u16) -> Self {
        Self::new()
            .with("dst", SERVER_DST)
            .with("tag", "register")
            .with("name", name)
            .with("host", host)
            .with("port", port.to_string())
    }

    /// Feedback for a human caller, relayed through `channel` (jabber,
    /// telegram, ...) to `user`.
    #[must_use]
    pub fn feedback(channel: &str, user: &str, msg: &str) -> Self {
        Self::new()
            .with("dst", RELAY_DST)
            .with("relayto", channel)
            .with("to", user)
            .with("msg", msg)
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Encode to the host's line format (without trailing newline).
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, VALUE_ESCAPES)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Decode a line produced by [`BusMessage::to_wire`].
    pub fn from_wire(line: &str) -> Result<Self, WireError> {
        let mut msg = Self::new();
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            return Ok(msg);
        }
        for field in line.split('&') {
            let (key, raw) = field
                .split_once('=')
                .ok_or_else(|| WireError::MissingSeparator(field.to_string()))?;
            if key.is_empty() {
                return Err(WireError::EmptyKey);
            }
            let value = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|_| WireError::InvalidUtf8(key.to_string()))?;
            msg.fields.push((key.to_string(), value.into_owned()));
        }
        Ok(msg)
    }
}
