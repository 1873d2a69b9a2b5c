//! zibundle - dependency-feed bundler CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zibundle_cli::{Cli, build_config};
use zibundle_core::{SystemRunner, bundle};

fn main() -> Result<()> {
    // Initialize logging; default to info so command echoes show up.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    // Fail early and clearly when the resolver is not installed, rather
    // than at the first probe.
    let resolver = config.locate_resolver()?;
    tracing::debug!("resolver: {}", resolver.display());

    let outcome = bundle::run(&config, &SystemRunner)?;

    if outcome.compile_needed {
        tracing::info!("bundle includes source-compiled dependencies");
    }
    println!("{}", outcome.archive.display());
    Ok(())
}
