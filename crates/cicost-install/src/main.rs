//! cicost-install - verified installer for cicost

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cicost_core::InstallError;
use cicost_install::ui::theme::Theme;
use cicost_install::{Cli, Commands, cmd};
use crossterm::style::Stylize;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = cmd::Context::new(cli.home, cli.manifest, cli.quiet);

    let result = match cli.command {
        Commands::Install {
            target,
            bin_dir,
            timeout,
            archive,
            skip_smoke_test,
            dry_run,
        } => {
            cmd::install::install(
                &ctx,
                cmd::install::InstallArgs {
                    target,
                    bin_dir,
                    timeout,
                    archive,
                    skip_smoke_test,
                    dry_run,
                },
            )
            .await
        }
        Commands::Resolve { target, all } => cmd::resolve::resolve(&ctx, &target, all),
        Commands::Verify { bin_dir } => cmd::verify::verify(&ctx, bin_dir).await,
        Commands::Status => cmd::status::status(&ctx),
        Commands::Formula { version, output } => {
            cmd::formula::formula(&ctx, version.as_deref(), output.as_deref())
        }
        Commands::Hash { files } => cmd::hash::hash(&files),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let theme = Theme::default();
            eprintln!(
                "{} {e:#}",
                theme.icons.error.with(theme.colors.error)
            );
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code of the typed error at the root of the chain, or 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<InstallError>())
        .map_or(1, InstallError::exit_code)
}
