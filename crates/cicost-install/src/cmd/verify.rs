//! Verify command

use std::path::PathBuf;

use anyhow::Result;
use cicost_core::smoke::verify_install;
use crossterm::style::Stylize;

use super::Context;
use crate::ui::Theme;

/// Run the smoke test against an existing install.
pub async fn verify(ctx: &Context, bin_dir: Option<PathBuf>) -> Result<()> {
    let mut config = ctx.config()?;
    if let Some(dir) = bin_dir {
        config = config.bin_dir(dir);
    }
    let binary = config.binary_path();
    let timeout = config.smoke_timeout;

    let output =
        tokio::task::spawn_blocking(move || verify_install(&binary, timeout)).await??;

    let theme = Theme::default();
    println!("{} {output}", theme.icons.success.with(theme.colors.success));
    Ok(())
}
