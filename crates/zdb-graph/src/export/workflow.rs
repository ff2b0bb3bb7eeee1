//! Workflow projection.
//!
//! Creates nodes:
//! - (:Workflow {key, bpmnProcessId, version, resourceName})

use zdb_state::{KeyedRecord, WorkflowRecord};

use crate::projector::Projectable;
use crate::schema::WORKFLOW;
use crate::statement::GraphWrite;

impl Projectable for KeyedRecord<WorkflowRecord> {
    fn node(&self) -> GraphWrite {
        GraphWrite::create_node(WORKFLOW, self.key)
            .with("bpmnProcessId", self.record.bpmn_process_id.as_str())
            .with("version", self.record.version)
            .with("resourceName", self.record.resource_name.as_str())
    }
}
