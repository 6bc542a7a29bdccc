//! Graph edge types.
//!
//! An [`Edge`] connects one output port of a source node to one input port of
//! a target node. Samples flow along it through the source's output channel;
//! the edge itself stores no data.

use crate::node::NodeId;

/// Unique identifier for an edge in the signal graph.
///
/// Edge IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A directed connection between two ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Output port on the source node.
    pub from_port: usize,
    /// Destination node.
    pub to: NodeId,
    /// Input port on the destination node.
    pub to_port: usize,
}
