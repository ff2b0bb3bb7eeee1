//! # zdb graph
//!
//! Projects partition state into a property graph.
//!
//! Provides the [`GraphSink`] write boundary (Neo4j and in-memory), the
//! record-agnostic [`Projector`] and the full-replace export pipeline.

pub mod client;
pub mod export;
pub mod memory;
pub mod projector;
pub mod schema;
pub mod sink;
pub mod statement;

pub use client::{GraphConfig, Neo4jSink};
pub use export::{EntityKind, ExportError, ExportReport, PassReport, run_export};
pub use memory::MemoryGraph;
pub use projector::{Projectable, Projection, Projector};
pub use sink::{GraphCounts, GraphSink, SinkError, WriteOutcome};
pub use statement::{GraphWrite, NodeRef, Param};
