//! Incident projection.
//!
//! Creates nodes and relationships:
//! - (:Incident {key, workflowKey, errorType, errorMessage})
//! - (:Workflow)-[:ACTIVE_INCIDENT]->(:Incident), only if the workflow exists

use zdb_state::{IncidentRecord, KeyedRecord};

use crate::projector::Projectable;
use crate::schema::{ACTIVE_INCIDENT, INCIDENT, WORKFLOW};
use crate::statement::{GraphWrite, NodeRef};

impl Projectable for KeyedRecord<IncidentRecord> {
    fn node(&self) -> GraphWrite {
        GraphWrite::create_node(INCIDENT, self.key)
            .with("workflowKey", self.record.workflow_key)
            .with("errorType", self.record.error_type.as_str())
            .with("errorMessage", self.record.error_message.as_str())
    }

    fn link(&self) -> Option<GraphWrite> {
        Some(GraphWrite::link(
            ACTIVE_INCIDENT,
            NodeRef::new(WORKFLOW, self.record.workflow_key),
            NodeRef::new(INCIDENT, self.key),
        ))
    }
}
