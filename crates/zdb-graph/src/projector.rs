//! Record to graph projection.
//!
//! A record projects to one node write and, when it carries a foreign
//! reference, one link write. The link is a best-effort join: it is executed
//! after the node write and reports whether the referenced node matched.

use tracing::debug;

use crate::sink::{GraphSink, SinkError};
use crate::statement::GraphWrite;

/// Anything that can be written to the graph as a keyed node.
pub trait Projectable {
    /// The node create for this record.
    fn node(&self) -> GraphWrite;

    /// The dependent link write, if the record references another node.
    fn link(&self) -> Option<GraphWrite> {
        None
    }
}

/// Result of projecting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// `None` when the record has no foreign reference.
    pub linked: Option<bool>,
}

/// Writes records to a sink one at a time, keeping running totals.
pub struct Projector<'g, S: GraphSink + ?Sized> {
    sink: &'g S,
    nodes_created: usize,
    edges_linked: usize,
    links_unmatched: usize,
}

impl<'g, S: GraphSink + ?Sized> Projector<'g, S> {
    pub fn new(sink: &'g S) -> Self {
        Self { sink, nodes_created: 0, edges_linked: 0, links_unmatched: 0 }
    }

    /// Write one record: the node first, then its link.
    ///
    /// Returns once every write for the record has committed; the first
    /// failure is returned and the link is not attempted.
    pub async fn project<P: Projectable + ?Sized>(&mut self, record: &P) -> Result<Projection, SinkError> {
        let node = record.node();
        let outcome = self.sink.write(&node).await?;
        self.nodes_created += outcome.nodes_created;

        let Some(link) = record.link() else {
            return Ok(Projection { linked: None });
        };

        let linked = self.sink.write(&link).await?.relationships_created > 0;
        if linked {
            self.edges_linked += 1;
        } else {
            self.links_unmatched += 1;
            debug!(link = %link, "No matching endpoint, link skipped");
        }

        Ok(Projection { linked: Some(linked) })
    }

    pub fn nodes_created(&self) -> usize {
        self.nodes_created
    }

    pub fn edges_linked(&self) -> usize {
        self.edges_linked
    }

    /// Links whose referenced node did not exist.
    pub fn links_unmatched(&self) -> usize {
        self.links_unmatched
    }
}
