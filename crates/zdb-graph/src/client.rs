//! Neo4j connection client.

use std::fmt;

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Txn};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::schema;
use crate::sink::{GraphCounts, GraphSink, SinkError, WriteOutcome};
use crate::statement::GraphWrite;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://127.0.0.1:7687".to_string(),
            user: "neo4j".to_string(),
            password: "admin".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Graph sink backed by a Neo4j database.
#[derive(Clone)]
pub struct Neo4jSink {
    graph: Graph,
    uri: String,
}

impl Neo4jSink {
    /// Connect to Neo4j.
    ///
    /// Note: neo4rs uses a lazy pool, `Graph::connect` does not establish a
    /// real bolt connection. A `RETURN 1` ping forces the handshake so an
    /// unreachable or misconfigured database fails here instead of at the
    /// first write.
    pub async fn connect(config: &GraphConfig) -> Result<Self, SinkError> {
        let unavailable = |e: neo4rs::Error| SinkError::unavailable(&config.uri, e.to_string());

        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(2)
            .fetch_size(20)
            .build()
            .map_err(unavailable)?;

        let graph = Graph::connect(neo4j_config).await.map_err(unavailable)?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(unavailable)?;

        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph, uri: config.uri.clone() })
    }

    /// Execute a Cypher query and return a single scalar value.
    async fn query_scalar(&self, query: Query, field: &str) -> Result<Option<i64>, neo4rs::Error> {
        let mut result = self.graph.execute(query).await?;
        if let Some(row) = result.next().await? {
            Ok(row.get::<i64>(field).ok())
        } else {
            Ok(None)
        }
    }
}

/// Run one write inside an open transaction.
async fn apply(txn: &mut Txn, write: &GraphWrite) -> Result<WriteOutcome, SinkError> {
    let failed = |e: neo4rs::Error| SinkError::write(write, e.to_string());

    match write {
        GraphWrite::CreateNode { .. } => {
            txn.run(write.to_query()).await.map_err(failed)?;
            Ok(WriteOutcome { nodes_created: 1, relationships_created: 0 })
        }
        GraphWrite::Link { .. } => {
            let mut stream = txn.execute(write.to_query()).await.map_err(failed)?;
            let mut counts = Vec::new();
            while let Some(row) = stream.next(txn.handle()).await.map_err(failed)? {
                counts.push(row.get::<i64>("linked"));
            }
            let relationships_created = total_linked(counts).map_err(|e| SinkError::write(write, e))?;
            Ok(WriteOutcome { nodes_created: 0, relationships_created })
        }
    }
}

/// Sum the `linked` column of a link write.
fn total_linked<E: fmt::Display>(counts: impl IntoIterator<Item = Result<i64, E>>) -> Result<usize, String> {
    let mut total = 0;
    for count in counts {
        let count = count.map_err(|e| format!("unreadable linked count: {e}"))?;
        total += usize::try_from(count).map_err(|_| format!("negative linked count: {count}"))?;
    }
    Ok(total)
}

#[async_trait]
impl GraphSink for Neo4jSink {
    async fn reset_graph(&self) -> Result<(), SinkError> {
        let unavailable = |e: neo4rs::Error| SinkError::unavailable(&self.uri, e.to_string());

        let mut txn = self.graph.start_txn().await.map_err(unavailable)?;
        if let Err(e) = txn.run(Query::new("MATCH (n) DETACH DELETE n".to_string())).await {
            if let Err(rollback) = txn.rollback().await {
                warn!(error = %rollback, "Rollback after failed reset also failed");
            }
            return Err(unavailable(e));
        }
        txn.commit().await.map_err(unavailable)?;

        info!(uri = %self.uri, "Deleted all nodes and relationships");
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), SinkError> {
        schema::initialize_schema(&self.graph)
            .await
            .map_err(|e| SinkError::unavailable(&self.uri, e.to_string()))
    }

    async fn write(&self, write: &GraphWrite) -> Result<WriteOutcome, SinkError> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| SinkError::write(write, e.to_string()))?;

        match apply(&mut txn, write).await {
            Ok(outcome) => {
                txn.commit().await.map_err(|e| SinkError::write(write, e.to_string()))?;
                debug!(statement = %write, ?outcome, "Committed write");
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback after failed write also failed");
                }
                Err(e)
            }
        }
    }

    async fn counts(&self) -> Result<GraphCounts, SinkError> {
        let node_query = Query::new("MATCH (n) RETURN count(n) as count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());
        let unavailable = |e: neo4rs::Error| SinkError::unavailable(&self.uri, e.to_string());

        let nodes = self.query_scalar(node_query, "count").await.map_err(unavailable)?.unwrap_or(0);
        let relationships = self.query_scalar(rel_query, "count").await.map_err(unavailable)?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: usize::try_from(nodes).unwrap_or(0),
            relationships: usize::try_from(relationships).unwrap_or(0),
        })
    }
}
