//! Install command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use cicost_core::{Installer, Reporter};
use cicost_core::installer::InstallRequest;
use crossterm::style::Stylize;

use super::Context;
use crate::Target;
use crate::ui::{ConsoleReporter, Theme};

#[derive(Debug, Default)]
pub struct InstallArgs {
    pub target: Target,
    pub bin_dir: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub archive: Option<PathBuf>,
    pub skip_smoke_test: bool,
    pub dry_run: bool,
}

/// Resolve, fetch, verify and install cicost.
pub async fn install(ctx: &Context, args: InstallArgs) -> Result<()> {
    let mut config = ctx.config()?;
    if let Some(dir) = args.bin_dir {
        config = config.bin_dir(dir);
    }
    if let Some(secs) = args.timeout {
        config = config.fetch_timeout(Duration::from_secs(secs));
    }

    let request = InstallRequest {
        version: args.target.version,
        os: args.target.os,
        arch: args.target.arch,
        archive: args.archive,
        skip_smoke_test: args.skip_smoke_test,
    };
    let installer = Installer::new(config, ConsoleReporter::new(ctx.quiet))?;

    if args.dry_run {
        return dry_run(&installer, &request);
    }

    let outcome = installer.run(&request).await?;
    if let Some(output) = &outcome.smoke_output {
        installer.reporter().info(output);
    }
    Ok(())
}

fn dry_run(installer: &Installer<ConsoleReporter>, request: &InstallRequest) -> Result<()> {
    let resolution = installer.resolve(request)?;
    if let Some(requested) = &resolution.platform.arch_fallback {
        installer.reporter().warning(&format!(
            "unrecognized architecture '{requested}', using the {} release",
            resolution.platform.arch
        ));
    }

    let theme = Theme::default();
    let w = theme.label_width;
    let d = &resolution.descriptor;
    let source = request
        .archive
        .as_ref()
        .map_or_else(|| d.url.clone(), |p| p.display().to_string());

    println!("{}", "Dry run, nothing will be changed".dark_grey());
    println!("{:<w$}{}", "Version:", d.version.to_string().with(theme.colors.primary));
    println!("{:<w$}{}", "Platform:", resolution.platform);
    println!("{:<w$}{source}", "Source:");
    println!("{:<w$}{}", "SHA256:", d.sha256);
    println!(
        "{:<w$}{}",
        "Install to:",
        installer.config().binary_path().display()
    );
    if request.skip_smoke_test {
        println!("{:<w$}skipped", "Smoke test:");
    }
    Ok(())
}
