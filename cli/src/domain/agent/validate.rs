//! Pure agent name and source validation — no I/O, no async.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::error::LifecycleError;

/// Agent names become path components and section names; checked before
/// any path interpolation to prevent path traversal (CWE-22).
pub static AGENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern — cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]([a-z0-9_-]{0,61}[a-z0-9])?$").expect("valid regex")
});

/// `user/repo` shorthand for a GitHub repository.
static GITHUB_SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^[a-z0-9_-]+/[a-z0-9_.-]+$").expect("valid regex")
});

#[must_use]
pub fn is_valid_agent_name(name: &str) -> bool {
    AGENT_NAME_RE.is_match(name)
}

/// # Errors
///
/// Returns [`LifecycleError::InvalidName`] if `name` fails [`AGENT_NAME_RE`].
pub fn validate_agent_name(name: &str) -> Result<(), LifecycleError> {
    if is_valid_agent_name(name) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidName(name.to_string()))
    }
}

/// Expand `user/repo` to its GitHub clone URL; anything else is returned
/// unchanged (trimmed).
#[must_use]
pub fn normalize_source(source: &str) -> String {
    let source = source.trim();
    if GITHUB_SHORTHAND_RE.is_match(source) {
        let repo = source.strip_suffix(".git").unwrap_or(source);
        format!("https://github.com/{repo}.git")
    } else {
        source.to_string()
    }
}
