//! Resolve command

use anyhow::Result;
use cicost_core::resolver::{Platform, pick_version, resolve_descriptor};
use cicost_schema::ReleaseDescriptor;

use super::Context;
use crate::Target;

/// Print the release the installer would pick, or every release with `all`.
pub fn resolve(ctx: &Context, target: &Target, all: bool) -> Result<()> {
    let table = ctx.config()?.load_table()?;

    if all {
        for descriptor in table.iter() {
            print_row(descriptor);
        }
        return Ok(());
    }

    let platform = Platform::detect(target.os.as_deref(), target.arch.as_deref())?;
    if let Some(requested) = &platform.arch_fallback {
        eprintln!(
            "warning: unrecognized architecture '{requested}', using the {} release",
            platform.arch
        );
    }
    let version = pick_version(&table, target.version.as_deref())?;
    let descriptor = resolve_descriptor(&table, &version, platform.os, platform.arch)?;
    print_row(descriptor);
    Ok(())
}

fn print_row(d: &ReleaseDescriptor) {
    println!("{}\t{}/{}\t{}\t{}", d.version, d.os, d.arch, d.url, d.sha256);
}
