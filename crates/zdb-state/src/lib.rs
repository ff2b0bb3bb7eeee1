//! # zdb state
//!
//! Read-only access to the partition state persisted by the workflow engine.
//!
//! Provides the RocksDB-backed [`PartitionState`], an in-memory
//! [`MemoryState`] fixture store, MessagePack record codecs and the typed
//! [`Inspection`] traversals built on top of them.

pub mod codec;
pub mod error;
pub mod family;
pub mod inspection;
pub mod memory;
pub mod partition;
pub mod record;
pub mod store;

pub use codec::{IncidentCodec, RecordCodec, WorkflowCodec, decode_key, encode_key};
pub use error::{RecordDecodeError, ScanError, StateOpenError};
pub use family::ColumnFamily;
pub use inspection::{IncidentInspection, Inspection, WorkflowInspection};
pub use memory::MemoryState;
pub use partition::PartitionState;
pub use record::{ErrorType, IncidentRecord, KeyedRecord, WorkflowRecord};
pub use store::{RawEntry, RawScan, StateStore};
