//! The graph write boundary.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::statement::GraphWrite;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Graph database at {uri} is unavailable: {message}")]
    Unavailable { uri: String, message: String },

    #[error("Graph write failed: {message}\n  statement: {statement}\n  parameters: {params}")]
    Write {
        statement: String,
        params: String,
        message: String,
    },
}

impl SinkError {
    pub fn unavailable(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable { uri: uri.into(), message: message.into() }
    }

    /// A failed write, carrying the offending statement and parameters.
    pub fn write(write: &GraphWrite, message: impl Into<String>) -> Self {
        Self::Write {
            statement: write.statement(),
            params: write.describe_params(),
            message: message.into(),
        }
    }
}

/// What a single committed write changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub nodes_created: usize,
    pub relationships_created: usize,
}

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// A graph database that accepts transactional writes.
///
/// Every call is isolated: one write, one transaction, committed on success
/// and rolled back entirely on failure.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Delete every node and relationship.
    async fn reset_graph(&self) -> Result<(), SinkError>;

    /// Declare key constraints. Safe to repeat.
    async fn ensure_schema(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn write(&self, write: &GraphWrite) -> Result<WriteOutcome, SinkError>;

    async fn counts(&self) -> Result<GraphCounts, SinkError>;
}
