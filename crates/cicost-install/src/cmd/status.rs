//! Status command

use anyhow::Result;
use cicost_core::receipt::InstallReceipt;
use crossterm::style::Stylize;

use super::Context;
use crate::ui::Theme;
use crate::ui::theme::short_digest;

/// Show the last recorded install and whether it is still intact.
pub fn status(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let theme = Theme::default();
    let w = theme.label_width;

    println!();
    println!("{}", "Installer status".dark_grey());
    println!();
    println!("{:<w$}{}", "Installer:", env!("CICOST_INSTALL_VERSION"));
    println!("{:<w$}{}", "Home:", config.home.display());

    let Some(receipt) = InstallReceipt::load(&config.receipt_path())? else {
        println!();
        println!("{}", "cicost is not installed".dark_grey());
        println!();
        return Ok(());
    };

    let installed_at = chrono::DateTime::parse_from_rfc3339(&receipt.installed_at).map_or_else(
        |_| receipt.installed_at.clone(),
        |t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        },
    );

    println!(
        "{:<w$}{}",
        "Version:",
        receipt.version.to_string().with(theme.colors.primary)
    );
    println!("{:<w$}{}/{}", "Platform:", receipt.os, receipt.arch);
    println!("{:<w$}{}", "Binary:", receipt.binary.display());
    println!("{:<w$}{}", "Installed:", installed_at);
    println!(
        "{:<w$}{}",
        "Archive:",
        short_digest(&receipt.archive_sha256).with(theme.colors.secondary)
    );

    println!();
    if receipt.binary_intact() {
        println!("{}", "Binary matches the install receipt".dark_grey());
    } else {
        println!(
            "{} {}",
            theme.icons.warning.with(theme.colors.warning),
            "Binary is missing or was modified since install".with(theme.colors.warning)
        );
    }
    println!();
    Ok(())
}
