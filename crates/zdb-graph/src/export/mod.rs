//! Partition state to graph export pipeline.
//!
//! Wipes the target graph, then runs one inspection pass per entity kind and
//! projects every decoded record. The workflow pass completes before the
//! incident pass starts, so incident links can match their workflow nodes.
//!
//! The reset is unconditional and unconfirmed: whatever the graph held before
//! the run is deleted, and after a successful run it holds exactly what the
//! partition state describes.

pub mod incident;
pub mod workflow;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use zdb_state::{Inspection, KeyedRecord, RecordCodec, ScanError, StateStore};

use crate::projector::{Projectable, Projector};
use crate::sink::{GraphCounts, GraphSink, SinkError};

/// Entity kinds exported, in pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Workflow,
    Incident,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Workflow => "workflow",
            EntityKind::Incident => "incident",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to reset graph: {0}")]
    Reset(#[source] SinkError),

    #[error("Failed to initialize graph schema: {0}")]
    Schema(#[source] SinkError),

    #[error("Failed to scan {kind} records: {source}")]
    Scan {
        kind: EntityKind,
        #[source]
        source: ScanError,
    },

    #[error("Failed to project {kind} {key}: {source}")]
    Project {
        kind: EntityKind,
        key: i64,
        #[source]
        source: SinkError,
    },
}

impl ExportError {
    /// Pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            ExportError::Reset(_) => "reset",
            ExportError::Schema(_) => "schema",
            ExportError::Scan { .. } => "scan",
            ExportError::Project { .. } => "project",
        }
    }
}

/// Result of one inspection pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub kind: EntityKind,
    pub visited: usize,
    pub skipped: usize,
    pub nodes_created: usize,
    pub edges_linked: usize,
    pub links_unmatched: usize,
}

/// Result of a complete export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passes: Vec<PassReport>,
    /// Totals read back from the sink, if it could report them.
    pub graph: Option<GraphCounts>,
}

impl ExportReport {
    pub fn pass(&self, kind: EntityKind) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.kind == kind)
    }

    /// Records skipped across every pass.
    pub fn skipped(&self) -> usize {
        self.passes.iter().map(|p| p.skipped).sum()
    }
}

/// Run a full-replace export of `state` into `sink`.
///
/// Both resources stay owned by the caller, which releases them whatever
/// this returns.
pub async fn run_export<St, S>(state: &St, sink: &S) -> Result<ExportReport, ExportError>
where
    St: StateStore + ?Sized,
    S: GraphSink + ?Sized,
{
    let started_at = Utc::now();
    info!("Starting graph export");

    sink.reset_graph().await.map_err(ExportError::Reset)?;
    sink.ensure_schema().await.map_err(ExportError::Schema)?;

    let passes = vec![
        run_pass(EntityKind::Workflow, Inspection::workflows(state), sink).await?,
        run_pass(EntityKind::Incident, Inspection::incidents(state), sink).await?,
    ];

    let graph = match sink.counts().await {
        Ok(counts) => Some(counts),
        Err(e) => {
            warn!(error = %e, "Could not read graph counts");
            None
        }
    };

    let report = ExportReport { started_at, finished_at: Utc::now(), passes, graph };

    info!(
        skipped = report.skipped(),
        nodes = report.passes.iter().map(|p| p.nodes_created).sum::<usize>(),
        relationships = report.passes.iter().map(|p| p.edges_linked).sum::<usize>(),
        "Graph export complete"
    );

    Ok(report)
}

async fn run_pass<C, S>(
    kind: EntityKind,
    mut inspection: Inspection<'_, C>,
    sink: &S,
) -> Result<PassReport, ExportError>
where
    C: RecordCodec,
    KeyedRecord<C::Record>: Projectable,
    S: GraphSink + ?Sized,
{
    info!(%kind, "Exporting records");
    let mut projector = Projector::new(sink);

    for item in inspection.by_ref() {
        let record = item.map_err(|source| ExportError::Scan { kind, source })?;
        projector
            .project(&record)
            .await
            .map_err(|source| ExportError::Project { kind, key: record.key, source })?;
    }

    let report = PassReport {
        kind,
        visited: inspection.visited(),
        skipped: inspection.skipped(),
        nodes_created: projector.nodes_created(),
        edges_linked: projector.edges_linked(),
        links_unmatched: projector.links_unmatched(),
    };

    info!(
        %kind,
        visited = report.visited,
        skipped = report.skipped,
        linked = report.edges_linked,
        "Pass complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::schema::{ACTIVE_INCIDENT, INCIDENT, WORKFLOW};
    use crate::statement::{GraphWrite, NodeRef, Param};
    use zdb_state::{ColumnFamily, ErrorType, IncidentRecord, MemoryState, WorkflowRecord};

    fn workflow(id: &str, version: i32) -> WorkflowRecord {
        WorkflowRecord {
            key: 0,
            bpmn_process_id: id.to_string(),
            version,
            resource_name: format!("{}.bpmn", id.trim_end_matches("Process")),
        }
    }

    fn scenario_state() -> MemoryState {
        let mut state = MemoryState::new();
        state.insert_workflow(10, &workflow("orderProcess", 2)).unwrap();
        state
            .insert_incident(100, &IncidentRecord::new(10, ErrorType::IoMappingError, "missing variable"))
            .unwrap();
        state
    }

    fn edge(workflow: i64, incident: i64) -> (NodeRef, NodeRef) {
        (NodeRef::new(WORKFLOW, workflow), NodeRef::new(INCIDENT, incident))
    }

    #[tokio::test]
    async fn test_workflow_with_active_incident() {
        let state = scenario_state();
        let graph = MemoryGraph::new();

        let report = run_export(&state, &graph).await.unwrap();

        let node = graph.node(WORKFLOW, 10).unwrap();
        assert_eq!(node["bpmnProcessId"], Param::Str("orderProcess".to_string()));
        assert_eq!(node["version"], Param::Int(2));
        assert_eq!(node["resourceName"], Param::Str("order.bpmn".to_string()));

        let node = graph.node(INCIDENT, 100).unwrap();
        assert_eq!(node["workflowKey"], Param::Int(10));
        assert_eq!(node["errorType"], Param::Str("IO_MAPPING_ERROR".to_string()));
        assert_eq!(node["errorMessage"], Param::Str("missing variable".to_string()));

        let (from, to) = edge(10, 100);
        assert!(graph.has_edge(ACTIVE_INCIDENT, from, to));
        assert_eq!(report.graph, Some(GraphCounts { nodes: 2, relationships: 1 }));
        assert_eq!(report.pass(EntityKind::Incident).unwrap().edges_linked, 1);
    }

    #[tokio::test]
    async fn test_incident_for_unknown_workflow_is_not_linked() {
        let mut state = scenario_state();
        state
            .insert_incident(200, &IncidentRecord::new(999, ErrorType::JobNoRetries, "no retries left"))
            .unwrap();
        let graph = MemoryGraph::new();

        let report = run_export(&state, &graph).await.unwrap();

        assert!(graph.node(INCIDENT, 200).is_some());
        let (from, to) = edge(999, 200);
        assert!(!graph.has_edge(ACTIVE_INCIDENT, from, to));
        let incidents = report.pass(EntityKind::Incident).unwrap();
        assert_eq!(incidents.nodes_created, 2);
        assert_eq!(incidents.edges_linked, 1);
        assert_eq!(incidents.links_unmatched, 1);
        assert_eq!(report.skipped(), 0);
    }

    #[tokio::test]
    async fn test_incident_links_workflow_with_higher_key() {
        let mut state = MemoryState::new();
        state.insert_incident(5, &IncidentRecord::new(500, ErrorType::ConditionError, "")).unwrap();
        state.insert_workflow(500, &workflow("lateProcess", 1)).unwrap();
        let graph = MemoryGraph::new();

        run_export(&state, &graph).await.unwrap();

        let (from, to) = edge(500, 5);
        assert!(graph.has_edge(ACTIVE_INCIDENT, from, to));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_isolated() {
        let mut state = MemoryState::new();
        for key in 1..=3 {
            state.insert_workflow(key, &workflow("p", key as i32)).unwrap();
        }
        state.insert_raw(ColumnFamily::WorkflowCache, 4i64.to_be_bytes().to_vec(), b"garbage".to_vec());
        let graph = MemoryGraph::new();

        let report = run_export(&state, &graph).await.unwrap();

        assert_eq!(graph.keys(WORKFLOW), vec![1, 2, 3]);
        let workflows = report.pass(EntityKind::Workflow).unwrap();
        assert_eq!(workflows.visited, 3);
        assert_eq!(workflows.skipped, 1);
        assert_eq!(report.pass(EntityKind::Incident).unwrap().skipped, 0);
        assert_eq!(report.skipped(), 1);
    }

    #[tokio::test]
    async fn test_second_run_yields_the_same_graph() {
        let state = scenario_state();
        let graph = MemoryGraph::new();

        let first = run_export(&state, &graph).await.unwrap();
        let snapshot = (graph.node(WORKFLOW, 10), graph.node(INCIDENT, 100));

        let second = run_export(&state, &graph).await.unwrap();

        assert_eq!(first.graph, second.graph);
        assert_eq!(snapshot, (graph.node(WORKFLOW, 10), graph.node(INCIDENT, 100)));
        assert_eq!(graph.resets(), 2);
    }

    #[tokio::test]
    async fn test_prior_content_is_deleted() {
        let graph = MemoryGraph::new();
        graph.write(&GraphWrite::create_node(WORKFLOW, 77).with("bpmnProcessId", "stale")).await.unwrap();
        graph.write(&GraphWrite::create_node("Leftover", 1)).await.unwrap();

        let report = run_export(&scenario_state(), &graph).await.unwrap();

        assert!(graph.node(WORKFLOW, 77).is_none());
        assert!(graph.keys("Leftover").is_empty());
        assert_eq!(report.graph, Some(GraphCounts { nodes: 2, relationships: 1 }));
    }

    #[tokio::test]
    async fn test_empty_state_leaves_empty_graph() {
        let graph = MemoryGraph::new();
        graph.write(&GraphWrite::create_node("Leftover", 1)).await.unwrap();

        let report = run_export(&MemoryState::new(), &graph).await.unwrap();

        assert_eq!(report.graph, Some(GraphCounts::default()));
    }

    #[tokio::test]
    async fn test_unavailable_sink_fails_before_any_write() {
        let graph = MemoryGraph::new();
        graph.set_offline();

        let err = run_export(&scenario_state(), &graph).await.unwrap_err();

        assert_eq!(err.stage(), "reset");
        assert!(matches!(err, ExportError::Reset(SinkError::Unavailable { .. })));
        assert_eq!(graph.writes(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_the_run() {
        let mut state = scenario_state();
        state.insert_workflow(11, &workflow("otherProcess", 1)).unwrap();
        let graph = MemoryGraph::new();
        graph.fail_write_at(2);

        let err = run_export(&state, &graph).await.unwrap_err();

        assert_eq!(err.stage(), "project");
        match err {
            ExportError::Project { kind, key, source: SinkError::Write { statement, params, .. } } => {
                assert_eq!(kind, EntityKind::Workflow);
                assert_eq!(key, 11);
                assert!(statement.starts_with("CREATE (n:Workflow"));
                assert!(params.contains("key=11"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(graph.keys(INCIDENT).is_empty());
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal() {
        let mut state = scenario_state();
        state.fail_scan(ColumnFamily::Incidents, "io error");
        let graph = MemoryGraph::new();

        let err = run_export(&state, &graph).await.unwrap_err();

        assert_eq!(err.stage(), "scan");
        assert!(matches!(err, ExportError::Scan { kind: EntityKind::Incident, .. }));
    }
}
