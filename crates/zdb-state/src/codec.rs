//! MessagePack codecs for the stored workflow and incident values.

use crate::error::RecordDecodeError;
use crate::family::ColumnFamily;
use crate::record::{IncidentRecord, StoredIncident, WorkflowRecord};

/// Decodes the values of one column family into typed records.
pub trait RecordCodec {
    type Record;

    /// Column family whose values this codec understands.
    const FAMILY: ColumnFamily;

    fn decode(&self, key: i64, value: &[u8]) -> Result<Self::Record, RecordDecodeError>;

    fn encode(&self, record: &Self::Record) -> Result<Vec<u8>, rmp_serde::encode::Error>;
}

/// Decode an 8-byte big-endian storage key.
pub fn decode_key(family: ColumnFamily, bytes: &[u8]) -> Result<i64, RecordDecodeError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| RecordDecodeError::Key { family, len: bytes.len() })?;
    Ok(i64::from_be_bytes(raw))
}

/// Encode a storage key the way the engine lays it out.
pub fn encode_key(key: i64) -> [u8; 8] {
    key.to_be_bytes()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCodec;

impl RecordCodec for WorkflowCodec {
    type Record = WorkflowRecord;
    const FAMILY: ColumnFamily = ColumnFamily::WorkflowCache;

    fn decode(&self, key: i64, value: &[u8]) -> Result<WorkflowRecord, RecordDecodeError> {
        let mut workflow: WorkflowRecord = rmp_serde::from_slice(value)
            .map_err(|source| RecordDecodeError::Value { family: Self::FAMILY, key, source })?;
        // The storage key wins over whatever the value carries.
        workflow.key = key;
        Ok(workflow)
    }

    fn encode(&self, record: &WorkflowRecord) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(record)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentCodec;

impl RecordCodec for IncidentCodec {
    type Record = IncidentRecord;
    const FAMILY: ColumnFamily = ColumnFamily::Incidents;

    fn decode(&self, key: i64, value: &[u8]) -> Result<IncidentRecord, RecordDecodeError> {
        let stored: StoredIncident = rmp_serde::from_slice(value)
            .map_err(|source| RecordDecodeError::Value { family: Self::FAMILY, key, source })?;
        Ok(stored.incident_record)
    }

    fn encode(&self, record: &IncidentRecord) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(&StoredIncident { incident_record: record.clone() })
    }
}
