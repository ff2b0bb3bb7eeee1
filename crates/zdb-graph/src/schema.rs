//! Graph vocabulary and Neo4j schema initialization.

use neo4rs::Query;
use tracing::info;

pub const WORKFLOW: &str = "Workflow";
pub const INCIDENT: &str = "Incident";
pub const ACTIVE_INCIDENT: &str = "ACTIVE_INCIDENT";

/// Cypher statements for schema initialization.
///
/// The uniqueness constraints also back the key lookups of link writes.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT workflow_key IF NOT EXISTS FOR (w:Workflow) REQUIRE w.key IS UNIQUE",
    "CREATE CONSTRAINT incident_key IF NOT EXISTS FOR (i:Incident) REQUIRE i.key IS UNIQUE",
];

/// Apply [`SCHEMA_STATEMENTS`] to a Neo4j graph.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(graph: &neo4rs::Graph) -> Result<(), neo4rs::Error> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        graph.run(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
