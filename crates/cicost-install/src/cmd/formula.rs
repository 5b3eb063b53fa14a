//! Formula command

use std::path::Path;

use anyhow::{Context as _, Result};
use cicost_core::formula::{FormulaMeta, render};
use cicost_core::resolver::pick_version;

use super::Context;

/// Render the Homebrew formula for `version` (default: newest).
pub fn formula(ctx: &Context, version: Option<&str>, output: Option<&Path>) -> Result<()> {
    let table = ctx.config()?.load_table()?;
    let version = pick_version(&table, version)?;
    let rendered = render(&table, &version, &FormulaMeta::default())?;

    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
