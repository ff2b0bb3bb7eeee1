//! RocksDB-backed partition state.
//!
//! Opens a partition's runtime or snapshot directory and holds the RocksDB
//! `LOCK` file until [`PartitionState::close`] or drop, so a directory a
//! running broker still owns is refused. Only scans are exposed.

use std::path::{Path, PathBuf};

use rocksdb::{DB, IteratorMode, Options};
use tracing::{debug, info};

use crate::error::{ScanError, StateOpenError};
use crate::family::ColumnFamily;
use crate::store::{RawEntry, RawScan, StateStore};

pub struct PartitionState {
    path: PathBuf,
    db: DB,
}

impl PartitionState {
    /// Open the partition state stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateOpenError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(StateOpenError::NotFound(path));
        }
        if !path.is_dir() {
            return Err(StateOpenError::NotADirectory(path));
        }
        if !path.join("CURRENT").is_file() {
            return Err(StateOpenError::MissingLayout(path));
        }

        let mut opts = Options::default();
        opts.create_if_missing(false);
        opts.create_missing_column_families(false);
        let families = DB::list_cf(&opts, &path).map_err(|source| open_error(&path, source))?;
        debug!(path = %path.display(), ?families, "Found column families");

        for family in ColumnFamily::ALL {
            if !families.iter().any(|name| name == family.name()) {
                return Err(StateOpenError::MissingColumnFamily { path, family: family.name() });
            }
        }

        let db = DB::open_cf(&opts, &path, &families)
            .map_err(|source| open_error(&path, source))?;

        info!(path = %path.display(), "Opened partition state");
        Ok(Self { path, db })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the storage handle.
    pub fn close(self) {
        debug!(path = %self.path.display(), "Closing partition state");
        drop(self.db);
    }
}

fn open_error(path: &Path, source: rocksdb::Error) -> StateOpenError {
    let path = path.to_path_buf();
    if source.to_string().to_lowercase().contains("lock") {
        StateOpenError::Locked { path, source }
    } else {
        StateOpenError::Storage { path, source }
    }
}

impl StateStore for PartitionState {
    fn scan(&self, family: ColumnFamily) -> RawScan<'_> {
        let Some(handle) = self.db.cf_handle(family.name()) else {
            return Box::new(std::iter::once(Err(ScanError::new(family, "column family is not open"))));
        };

        let entries = self.db.iterator_cf(handle, IteratorMode::Start).map(move |item| {
            item.map(|(key, value)| RawEntry { key: key.into_vec(), value: value.into_vec() })
                .map_err(|e| ScanError::new(family, e.to_string()))
        });

        Box::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{IncidentCodec, RecordCodec, WorkflowCodec, encode_key};
    use crate::inspection::Inspection;
    use crate::record::{ErrorType, IncidentRecord, WorkflowRecord};
    use tempfile::TempDir;

    fn write_partition(path: &Path, families: &[&str]) -> DB {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        DB::open_cf(&opts, path, families).unwrap()
    }

    #[test]
    fn test_open_and_scan_partition() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runtime");

        {
            let db = write_partition(&path, &["workflow_cache", "incidents"]);
            let workflows = db.cf_handle("workflow_cache").unwrap();
            let incidents = db.cf_handle("incidents").unwrap();

            let workflow = WorkflowRecord {
                key: 10,
                bpmn_process_id: "orderProcess".to_string(),
                version: 2,
                resource_name: "order.bpmn".to_string(),
            };
            db.put_cf(workflows, encode_key(10), WorkflowCodec.encode(&workflow).unwrap()).unwrap();

            let incident = IncidentRecord::new(10, ErrorType::IoMappingError, "missing variable");
            db.put_cf(incidents, encode_key(100), IncidentCodec.encode(&incident).unwrap()).unwrap();
            db.put_cf(incidents, encode_key(101), b"not msgpack at all").unwrap();
        }

        let state = PartitionState::open(&path).unwrap();
        assert_eq!(state.path(), path.as_path());

        let workflows: Vec<_> = Inspection::workflows(&state).map(|r| r.unwrap()).collect();
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].key, 10);
        assert_eq!(workflows[0].record.bpmn_process_id, "orderProcess");

        let mut incidents = Inspection::incidents(&state);
        let decoded: Vec<_> = incidents.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].key, 100);
        assert_eq!(decoded[0].record.workflow_key, 10);
        assert_eq!(incidents.skipped(), 1);
        drop(incidents);

        state.close();
    }

    #[test]
    fn test_partition_held_by_another_handle_is_locked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runtime");
        let _owner = write_partition(&path, &["workflow_cache", "incidents"]);

        let err = PartitionState::open(&path).err().unwrap();
        assert!(matches!(err, StateOpenError::Locked { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_lock_is_released_on_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runtime");
        drop(write_partition(&path, &["workflow_cache", "incidents"]));

        PartitionState::open(&path).unwrap().close();
        PartitionState::open(&path).unwrap().close();
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = PartitionState::open(dir.path().join("nope")).err().unwrap();
        assert!(matches!(err, StateOpenError::NotFound(_)));
    }

    #[test]
    fn test_file_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        let err = PartitionState::open(&file).err().unwrap();
        assert!(matches!(err, StateOpenError::NotADirectory(_)));
    }

    #[test]
    fn test_empty_directory_has_no_layout() {
        let dir = TempDir::new().unwrap();
        let err = PartitionState::open(dir.path()).err().unwrap();
        assert!(matches!(err, StateOpenError::MissingLayout(_)));
    }

    #[test]
    fn test_missing_column_family_is_incompatible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old");
        drop(write_partition(&path, &["workflow_cache"]));

        let err = PartitionState::open(&path).err().unwrap();
        assert!(matches!(err, StateOpenError::MissingColumnFamily { family: "incidents", .. }));
    }
}
