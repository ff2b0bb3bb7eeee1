//! Typed records decoded from partition state.
//!
//! Field names follow the camelCase property names the engine writes into its
//! MessagePack values; properties the exporter does not need are ignored on
//! decode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A record paired with the storage key it was read under.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecord<T> {
    pub key: i64,
    pub record: T,
}

/// A deployed workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    #[serde(default)]
    pub key: i64,
    pub bpmn_process_id: String,
    pub version: i32,
    pub resource_name: String,
}

/// An open incident raised by a workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub error_type: ErrorType,
    #[serde(default)]
    pub error_message: String,
    pub workflow_key: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpmn_process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_instance_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_instance_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_scope_key: Option<i64>,
}

impl IncidentRecord {
    /// An incident carrying only the attributes that are exported.
    pub fn new(workflow_key: i64, error_type: ErrorType, error_message: impl Into<String>) -> Self {
        Self {
            error_type,
            error_message: error_message.into(),
            workflow_key,
            bpmn_process_id: None,
            workflow_instance_key: None,
            element_id: None,
            element_instance_key: None,
            job_key: None,
            variable_scope_key: None,
        }
    }
}

/// The stored incident value wraps the record in an `incidentRecord` property.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredIncident {
    pub incident_record: IncidentRecord,
}

/// Incident error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    IoMappingError,
    JobNoRetries,
    ConditionError,
    ExtractValueError,
    CalledElementError,
    UnhandledErrorEvent,
    MessageSizeExceeded,
    #[serde(other)]
    Unknown,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Unknown => "UNKNOWN",
            ErrorType::IoMappingError => "IO_MAPPING_ERROR",
            ErrorType::JobNoRetries => "JOB_NO_RETRIES",
            ErrorType::ConditionError => "CONDITION_ERROR",
            ErrorType::ExtractValueError => "EXTRACT_VALUE_ERROR",
            ErrorType::CalledElementError => "CALLED_ELEMENT_ERROR",
            ErrorType::UnhandledErrorEvent => "UNHANDLED_ERROR_EVENT",
            ErrorType::MessageSizeExceeded => "MESSAGE_SIZE_EXCEEDED",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
