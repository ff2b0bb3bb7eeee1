//! zdb - inspect workflow engine partition state
//!
//! Exports the state of a partition into a Neo4j graph.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands};

/// Initialize tracing.
///
/// When `stderr_only` is true, log output goes to stderr with ANSI disabled
/// so that machine-readable output on stdout stays intact.
fn init_tracing(verbose: bool, stderr_only: bool) {
    let env_filter = if verbose {
        "zdb=debug,zdb_graph=debug,zdb_state=debug".into()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "zdb=info,zdb_graph=info,zdb_state=info".into())
    };

    if stderr_only {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_mode = matches!(&cli.command, Commands::Neo4j(args) if args.json);
    init_tracing(cli.verbose, json_mode);

    cli.execute().await
}
