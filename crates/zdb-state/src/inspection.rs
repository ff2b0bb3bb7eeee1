//! Typed traversals over partition state.
//!
//! An [`Inspection`] binds one column family scan to one [`RecordCodec`] and
//! yields decoded records lazily, in stored key order. Entries that fail to
//! decode are logged and counted, then skipped; only a storage failure ends
//! the pass early.

use tracing::{debug, warn};

use crate::codec::{IncidentCodec, RecordCodec, WorkflowCodec, decode_key};
use crate::error::{RecordDecodeError, ScanError};
use crate::record::KeyedRecord;
use crate::store::{RawEntry, RawScan, StateStore};

/// Single-pass iterator over the decoded records of one entity kind.
pub struct Inspection<'s, C: RecordCodec> {
    codec: C,
    entries: RawScan<'s>,
    visited: usize,
    skipped: usize,
}

pub type WorkflowInspection<'s> = Inspection<'s, WorkflowCodec>;
pub type IncidentInspection<'s> = Inspection<'s, IncidentCodec>;

impl<'s, C: RecordCodec> Inspection<'s, C> {
    /// Start scanning `C::FAMILY` of the given state.
    pub fn new<S: StateStore + ?Sized>(state: &'s S, codec: C) -> Self {
        debug!(family = %C::FAMILY, "Starting inspection");
        Self {
            codec,
            entries: state.scan(C::FAMILY),
            visited: 0,
            skipped: 0,
        }
    }

    /// Records decoded and yielded so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Records dropped because they could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode(&self, entry: &RawEntry) -> Result<KeyedRecord<C::Record>, RecordDecodeError> {
        let key = decode_key(C::FAMILY, &entry.key)?;
        let record = self.codec.decode(key, &entry.value)?;
        Ok(KeyedRecord { key, record })
    }
}

impl<'s> WorkflowInspection<'s> {
    pub fn workflows<S: StateStore + ?Sized>(state: &'s S) -> Self {
        Inspection::new(state, WorkflowCodec)
    }
}

impl<'s> IncidentInspection<'s> {
    pub fn incidents<S: StateStore + ?Sized>(state: &'s S) -> Self {
        Inspection::new(state, IncidentCodec)
    }
}

impl<C: RecordCodec> Iterator for Inspection<'_, C> {
    type Item = Result<KeyedRecord<C::Record>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            match self.decode(&entry) {
                Ok(record) => {
                    self.visited += 1;
                    return Some(Ok(record));
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!(family = %C::FAMILY, error = %e, "Skipping undecodable record");
                }
            }
        }
    }
}
