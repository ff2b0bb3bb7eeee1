//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod neo4j;

/// zdb - Zeebe partition state inspection
#[derive(Parser)]
#[command(name = "zdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import partition state into Neo4j, replacing the whole graph
    Neo4j(neo4j::Neo4jArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Neo4j(args) => neo4j::execute(args).await,
        }
    }
}
