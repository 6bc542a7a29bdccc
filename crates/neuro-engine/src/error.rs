//! Error types for graph operations.

use neuro_core::AttributeError;
use thiserror::Error;

use crate::edge::EdgeId;
use crate::node::{NodeId, NodeType, PortType};

/// Errors returned by structural graph operations.
///
/// Processing itself never fails: nodes that cannot run suspend and report
/// through [`NodeStatus`](crate::NodeStatus) instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The specified edge was not found in the graph.
    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    /// The node has no port with this index.
    #[error("node {node} has no {direction} port {port}")]
    PortNotFound {
        /// Node that was addressed.
        node: NodeId,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// Requested port index.
        port: usize,
    },

    /// Adding this edge would create a cycle.
    #[error("adding this edge would create a cycle")]
    CycleDetected,

    /// An identical edge already exists.
    #[error("edge from {0} to {1} already exists")]
    DuplicateEdge(NodeId, NodeId),

    /// The target input port is already fed by another edge.
    #[error("input port {port} of node {node} is already connected")]
    InputAlreadyConnected {
        /// Target node.
        node: NodeId,
        /// Target input port.
        port: usize,
    },

    /// Source and target ports carry different sample types.
    #[error("cannot connect {from:?} output to {to:?} input")]
    PortTypeMismatch {
        /// Sample type of the source port.
        from: PortType,
        /// Sample type of the target port.
        to: PortType,
    },

    /// The graph has no nodes to process.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// The operation needs a node of another type.
    #[error("node {node} is not a {expected} node")]
    NodeTypeMismatch {
        /// Node that was addressed.
        node: NodeId,
        /// Node type the operation works on.
        expected: NodeType,
    },

    /// An attribute write was rejected.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Reasons an action was skipped.
///
/// A failed action leaves the graph untouched. The caller logs and moves on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    /// The action needs a running graph but none was supplied.
    #[error("cannot set parameter '{0}': no active classifier")]
    NoClassifier(String),

    /// No parameter node carries the configured name.
    #[error("cannot set parameter '{0}': no parameter node with the given name")]
    ParameterNotFound(String),

    /// The parameter node has fewer channels than the configured index.
    #[error("cannot set parameter '{name}': invalid channel index {index}, node has only {len} channels")]
    ParameterChannel {
        /// Parameter node name.
        name: String,
        /// Configured channel index.
        index: usize,
        /// Channels of the node.
        len: usize,
    },

    /// No feedback node carries the configured name.
    #[error("cannot set parameter '{parameter}' from feedback node '{feedback}': no node with the given name")]
    FeedbackNotFound {
        /// Parameter node name.
        parameter: String,
        /// Feedback node name.
        feedback: String,
    },

    /// The feedback node has fewer channels than the configured index.
    #[error("cannot set parameter '{parameter}' from feedback node '{feedback}': invalid channel index {index}, node has only {len} channels")]
    FeedbackChannel {
        /// Parameter node name.
        parameter: String,
        /// Feedback node name.
        feedback: String,
        /// Configured channel index.
        index: usize,
        /// Channels of the node.
        len: usize,
    },
}
