//! In-memory state store.
//!
//! Keeps entries in ordered maps so scans behave like RocksDB's bytewise
//! ordering. Used as a fixture in place of [`PartitionState`](crate::PartitionState).

use std::collections::BTreeMap;

use crate::codec::{IncidentCodec, RecordCodec, WorkflowCodec, encode_key};
use crate::error::ScanError;
use crate::family::ColumnFamily;
use crate::record::{IncidentRecord, WorkflowRecord};
use crate::store::{RawEntry, RawScan, StateStore};

#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    families: BTreeMap<ColumnFamily, BTreeMap<Vec<u8>, Vec<u8>>>,
    failures: BTreeMap<ColumnFamily, String>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw entry, bypassing any codec.
    pub fn insert_raw(&mut self, family: ColumnFamily, key: Vec<u8>, value: Vec<u8>) {
        self.families.entry(family).or_default().insert(key, value);
    }

    pub fn insert_workflow(&mut self, key: i64, workflow: &WorkflowRecord) -> Result<(), rmp_serde::encode::Error> {
        let value = WorkflowCodec.encode(workflow)?;
        self.insert_raw(ColumnFamily::WorkflowCache, encode_key(key).to_vec(), value);
        Ok(())
    }

    pub fn insert_incident(&mut self, key: i64, incident: &IncidentRecord) -> Result<(), rmp_serde::encode::Error> {
        let value = IncidentCodec.encode(incident)?;
        self.insert_raw(ColumnFamily::Incidents, encode_key(key).to_vec(), value);
        Ok(())
    }

    /// Make every scan of `family` end with a storage error after its entries.
    pub fn fail_scan(&mut self, family: ColumnFamily, message: impl Into<String>) {
        self.failures.insert(family, message.into());
    }
}

impl StateStore for MemoryState {
    fn scan(&self, family: ColumnFamily) -> RawScan<'_> {
        let entries = self
            .families
            .get(&family)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .map(|(key, value)| Ok(RawEntry { key: key.clone(), value: value.clone() }));

        let failure = self
            .failures
            .get(&family)
            .map(|message| Err(ScanError::new(family, message.clone())));

        Box::new(entries.chain(failure))
    }
}
