//! The ordered key-value scan contract shared by every state source.

use crate::error::ScanError;
use crate::family::ColumnFamily;

/// One stored key/value pair, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Lazy, finite, single-pass sequence of raw entries in ascending key order.
pub type RawScan<'a> = Box<dyn Iterator<Item = Result<RawEntry, ScanError>> + 'a>;

/// Read-only access to partition state.
pub trait StateStore {
    /// Scan every entry of one column family in ascending key order.
    fn scan(&self, family: ColumnFamily) -> RawScan<'_>;
}
