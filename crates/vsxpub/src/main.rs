//! vsxpub CLI - Build and publish editor extensions to Open VSX

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ needs a process-wide crypto provider before any TLS use
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let code = match cli.command {
        Commands::Run(args) => commands::run::run(args, &cli.catalogue).await?,
        Commands::Plan(args) => commands::plan::run(args, &cli.catalogue)?,
        Commands::Validate(args) => commands::validate::run(args, &cli.catalogue)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Build progress is logged at info
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
