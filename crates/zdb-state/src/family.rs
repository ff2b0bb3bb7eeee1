//! Column families read by the exporter.

use std::fmt;

/// Logical tables of the partition state, stored as RocksDB column families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnFamily {
    /// Deployed workflow definitions, keyed by workflow key.
    WorkflowCache,
    /// Open incidents, keyed by incident key.
    Incidents,
}

impl ColumnFamily {
    pub const ALL: [ColumnFamily; 2] = [ColumnFamily::WorkflowCache, ColumnFamily::Incidents];

    /// Name of the column family as created by the engine.
    pub fn name(self) -> &'static str {
        match self {
            ColumnFamily::WorkflowCache => "workflow_cache",
            ColumnFamily::Incidents => "incidents",
        }
    }
}

impl fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
