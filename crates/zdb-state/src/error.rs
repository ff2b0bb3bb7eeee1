//! Error types for reading partition state.

use std::path::PathBuf;

use thiserror::Error;

use crate::family::ColumnFamily;

/// The partition directory could not be opened.
#[derive(Error, Debug)]
pub enum StateOpenError {
    #[error("Partition path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Partition path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No state layout found at {} (missing CURRENT metadata)", .0.display())]
    MissingLayout(PathBuf),

    #[error("Incompatible state at {}: column family '{family}' is missing", .path.display())]
    MissingColumnFamily { path: PathBuf, family: &'static str },

    #[error("Partition state at {} is locked by another process: {source}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },

    #[error("Failed to open partition state at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },
}

/// A single stored entry could not be decoded into its typed record.
///
/// Never fatal for a pass: the inspection logs it, counts it and moves on.
#[derive(Error, Debug)]
pub enum RecordDecodeError {
    #[error("{family}: key has {len} bytes, expected 8")]
    Key { family: ColumnFamily, len: usize },

    #[error("{family}: value for key {key} is not a valid record: {source}")]
    Value {
        family: ColumnFamily,
        key: i64,
        #[source]
        source: rmp_serde::decode::Error,
    },
}

/// The underlying storage failed while a scan was in progress.
#[derive(Error, Debug)]
#[error("Failed to read column family '{family}': {message}")]
pub struct ScanError {
    pub family: ColumnFamily,
    pub message: String,
}

impl ScanError {
    pub fn new(family: ColumnFamily, message: impl Into<String>) -> Self {
        Self { family, message: message.into() }
    }
}
