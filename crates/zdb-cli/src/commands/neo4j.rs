//! Neo4j import command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use zdb_graph::{ExportReport, GraphSink, MemoryGraph, Neo4jSink, run_export};
use zdb_state::{PartitionState, StateStore};

use crate::config::{self, Overrides};
use crate::output;

#[derive(Args, Debug)]
pub struct Neo4jArgs {
    /// The path to the partition data (either runtime or snapshot in partition dir)
    #[arg(short = 'p', long = "path", value_name = "PARTITION_PATH")]
    pub path: PathBuf,

    /// Bolt URI of the target database
    #[arg(long, env = "ZDB_NEO4J_URI")]
    pub uri: Option<String>,

    /// Basic auth user
    #[arg(long, env = "ZDB_NEO4J_USER")]
    pub user: Option<String>,

    /// Basic auth password
    #[arg(long, env = "ZDB_NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long, env = "ZDB_NEO4J_DATABASE")]
    pub database: Option<String>,

    /// TOML file with a [neo4j] table; flags and environment take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project into an in-memory graph instead of Neo4j
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: Neo4jArgs) -> Result<()> {
    let graph_config = config::resolve(
        args.config.as_deref(),
        Overrides {
            uri: args.uri.clone(),
            user: args.user.clone(),
            password: args.password.clone(),
            database: args.database.clone(),
        },
    )
    .context("config: cannot load connection settings")?;

    let state = PartitionState::open(&args.path).context("open: cannot read partition state")?;

    let result = if args.dry_run {
        info!("Dry run, exporting into an in-memory graph");
        export(&state, &MemoryGraph::new()).await
    } else {
        match Neo4jSink::connect(&graph_config).await {
            Ok(sink) => export(&state, &sink).await,
            Err(e) => Err(anyhow::Error::new(e).context("connect: cannot reach graph database")),
        }
    };

    state.close();
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let target = if args.dry_run { "in-memory graph".to_string() } else { graph_config.uri.clone() };
        println!("{} {}", "Exported".bold(), args.path.display().to_string().cyan());
        output::print_report(&report, &target);
    }

    Ok(())
}

async fn export<St, S>(state: &St, sink: &S) -> Result<ExportReport>
where
    St: StateStore + ?Sized,
    S: GraphSink + ?Sized,
{
    run_export(state, sink).await.map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage}: graph export failed"))
    })
}
