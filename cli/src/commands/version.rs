//! Version command

use anyhow::Result;
use serde_json::json;

use crate::output::JsonRenderer;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if json {
        JsonRenderer.emit(&json!({ "version": version }))?;
    } else {
        println!("hive {version}");
    }
    Ok(())
}
