//! Neuro Engine - signal graph, actions and conditions for neurofeedback sessions
//!
//! This crate wires [`neuro_core`] channels and processors into a running
//! graph and adds the event-driven pieces a session state machine fires.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`SignalGraph`] - Node arena, typed connections, topological tick
//! - [`Node`] / [`NodeKind`] - One graph node and its closed set of variants
//! - [`NodeLifecycle`] - `init` / `reinit` / `start` / `update` / `reset` contract
//! - [`Ports`] / [`PortType`] - Named, typed inputs and outputs
//! - [`NodeStatus`] - Sticky error and warning flags shown by the UI
//!
//! ## Node Variants
//!
//! See [`nodes`] for the full table: input, parameter, feedback, delay,
//! freeze, smooth, remap, color wheel, FFT and cloud input.
//!
//! ## Host Context
//!
//! - [`EngineEvent`] / [`EventSink`] - Side effects requested by actions
//! - [`AssetRegistry`] - Which media assets are in use
//! - [`Classifier`] - Named feedback and parameter access, implemented by [`SignalGraph`]
//!
//! ## State Machine Pieces
//!
//! - [`Action`] / [`ActionKind`] - One-shot side effects
//! - [`ParameterFunction`] - Update rules of the parameter action
//! - [`StateTransitionFeedbackCondition`] / [`ConditionFunction`] - Feedback predicates
//!
//! # Errors
//!
//! Structural misuse returns [`GraphError`]. Processing never fails: a node
//! that cannot run suspends until its inputs allow it to re-initialize.
//! Actions that cannot run return [`ActionError`] and change nothing.

pub mod action;
pub mod condition;
pub mod context;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod parameter_action;

// Re-export main types at crate root
pub use action::{Action, ActionKind};
pub use condition::{ConditionFunction, StateTransitionFeedbackCondition};
pub use context::{
    ActionContext, AssetGroup, AssetRegistry, AssetState, Classifier, EngineEvent, EventSink,
    FeedbackReading,
};
pub use edge::{Edge, EdgeId};
pub use error::{ActionError, GraphError};
pub use graph::{DEFAULT_BUFFER_SIZE, SignalGraph};
pub use node::{
    AttributeChange, Node, NodeError, NodeId, NodeKind, NodeLifecycle, NodeStatus, NodeType,
    NodeWarning, Output, Port, PortType, Ports, TickTime,
};
pub use nodes::{
    CloudInputNode, CloudParameter, CloudRequest, CloudValue, ColorWheelNode, DelayNode,
    FeedbackNode, FftNode, FreezeNode, InputNode, ParameterNode, RemapNode, RequestMode,
    SmoothNode, StorageType, TimeRangeType,
};
pub use parameter_action::ParameterFunction;
