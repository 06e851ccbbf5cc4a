//! Port allocation for new agent sections.
//!
//! Pure function over a snapshot of the runtime config. The caller must write
//! the chosen port back before allocating again.

use crate::domain::error::ParseError;
use crate::domain::runtime_config::RuntimeConfig;

/// Pick the lowest free port at or above the smallest port in use.
///
/// When nothing is in use, `base` (the bus server's own port) seeds the set,
/// so the first agent gets `base + 1`. Holes left by removed agents are
/// reused before the range grows. Returns `None` only when the search runs
/// past `u16::MAX`.
#[must_use]
pub fn allocate_port(used: &[u16], base: u16) -> Option<u16> {
    let mut ports: Vec<u16> = used.to_vec();
    if ports.is_empty() {
        ports.push(base);
    }
    ports.sort_unstable();
    ports.dedup();

    let mut candidate = ports[0];
    while ports.binary_search(&candidate).is_ok() {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// [`allocate_port`] over every `port` value in `config`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidValue`] if a stored port is not numeric.
pub fn allocate_from(config: &RuntimeConfig, base: u16) -> Result<Option<u16>, ParseError> {
    Ok(allocate_port(&config.used_ports()?, base))
}
