//! In-process graph sink.
//!
//! Applies [`GraphWrite`]s with the same semantics the Cypher statements have
//! against Neo4j under the key constraints: creating a node whose key already
//! exists for its label fails, and a link is created only when both endpoints
//! match. Backs `--dry-run` and the pipeline tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::sink::{GraphCounts, GraphSink, SinkError, WriteOutcome};
use crate::statement::{GraphWrite, NodeRef, Param};

const MEMORY_URI: &str = "memory://";

type Properties = BTreeMap<&'static str, Param>;

#[derive(Debug, Default)]
struct GraphData {
    nodes: BTreeMap<NodeRef, Properties>,
    edges: BTreeSet<(&'static str, NodeRef, NodeRef)>,
    writes: usize,
    resets: usize,
    offline: bool,
    fail_write_at: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryGraph {
    data: Mutex<GraphData>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GraphData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Properties of a node, including its key.
    pub fn node(&self, label: &'static str, key: i64) -> Option<Properties> {
        self.lock().nodes.get(&NodeRef::new(label, key)).cloned()
    }

    /// Keys of every node carrying `label`, ascending.
    pub fn keys(&self, label: &str) -> Vec<i64> {
        self.lock()
            .nodes
            .keys()
            .filter(|node| node.label == label)
            .map(|node| node.key)
            .collect()
    }

    pub fn has_edge(&self, rel_type: &str, from: NodeRef, to: NodeRef) -> bool {
        self.lock()
            .edges
            .iter()
            .any(|(rel, f, t)| *rel == rel_type && *f == from && *t == to)
    }

    /// Writes committed since creation.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn resets(&self) -> usize {
        self.lock().resets
    }

    /// Reject every call as if the database could not be reached.
    #[cfg(test)]
    pub(crate) fn set_offline(&self) {
        self.lock().offline = true;
    }

    /// Fail the `n`th write (1-based) counted from now.
    #[cfg(test)]
    pub(crate) fn fail_write_at(&self, n: usize) {
        let mut data = self.lock();
        data.fail_write_at = Some(data.writes + n);
    }
}

#[async_trait]
impl GraphSink for MemoryGraph {
    async fn reset_graph(&self) -> Result<(), SinkError> {
        let mut data = self.lock();
        if data.offline {
            return Err(SinkError::unavailable(MEMORY_URI, "graph is offline"));
        }
        data.nodes.clear();
        data.edges.clear();
        data.resets += 1;
        Ok(())
    }

    async fn write(&self, write: &GraphWrite) -> Result<WriteOutcome, SinkError> {
        let mut data = self.lock();
        if data.offline {
            return Err(SinkError::unavailable(MEMORY_URI, "graph is offline"));
        }
        if data.fail_write_at == Some(data.writes + 1) {
            return Err(SinkError::write(write, "injected failure"));
        }

        let outcome = match write {
            GraphWrite::CreateNode { node, properties } => {
                if data.nodes.contains_key(node) {
                    return Err(SinkError::write(write, format!("node {node} already exists")));
                }
                let mut props: Properties = properties.iter().cloned().collect();
                props.insert("key", Param::Int(node.key));
                data.nodes.insert(*node, props);
                WriteOutcome { nodes_created: 1, relationships_created: 0 }
            }
            GraphWrite::Link { rel_type, from, to } => {
                if data.nodes.contains_key(from) && data.nodes.contains_key(to) {
                    data.edges.insert((*rel_type, *from, *to));
                    WriteOutcome { nodes_created: 0, relationships_created: 1 }
                } else {
                    WriteOutcome::default()
                }
            }
        };

        data.writes += 1;
        Ok(outcome)
    }

    async fn counts(&self) -> Result<GraphCounts, SinkError> {
        let data = self.lock();
        Ok(GraphCounts { nodes: data.nodes.len(), relationships: data.edges.len() })
    }
}
