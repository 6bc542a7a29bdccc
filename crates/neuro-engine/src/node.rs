//! Graph node types.
//!
//! Every node in the [`SignalGraph`](crate::SignalGraph) has a [`NodeId`], a
//! user-visible name, an [`AttributeSet`], typed [`Ports`] and a
//! [`NodeKind`] holding the variant-specific state. Variants implement the
//! shared [`NodeLifecycle`] contract:
//!
//! ```text
//! init ──► reinit ──► start ──► update ──► update ──► ...
//!            ▲  │ false: suspended, retried every tick
//!            └──┘
//! on_attributes_changed ──► reset_async ──► (next tick) reset ──► reinit ──► start
//! ```
//!
//! A node that cannot run (missing connection, zero sample rate) suspends by
//! returning `false` from `reinit`; the graph retries it on every tick and
//! never calls `update` while it is suspended.

use neuro_core::{AttributeError, AttributeSet, AttributeValue, Channel, Inputs, Spectrum};

use crate::context::EngineEvent;
use crate::nodes::{
    CloudInputNode, ColorWheelNode, DelayNode, FeedbackNode, FftNode, FreezeNode, InputNode,
    ParameterNode, RemapNode, SmoothNode,
};

/// Unique identifier for a node in the signal graph.
///
/// Node IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Sample type carried by a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortType {
    /// `f64` samples.
    Scalar,
    /// [`Spectrum`] samples.
    Spectrum,
}

/// One input or output port.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name. Some nodes rewrite it to show their configuration.
    pub name: String,
    /// Sample type.
    pub port_type: PortType,
}

impl Port {
    /// Scalar port.
    pub fn scalar(id: &'static str, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            port_type: PortType::Scalar,
        }
    }

    /// Spectrum port.
    pub fn spectrum(id: &'static str, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            port_type: PortType::Spectrum,
        }
    }
}

/// Input and output ports of a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ports {
    /// Input ports, indexed by port number.
    pub inputs: Vec<Port>,
    /// Output ports, indexed by port number.
    pub outputs: Vec<Port>,
}

impl Ports {
    /// Renames an output port. Out-of-range indices are ignored.
    pub fn rename_output(&mut self, port: usize, name: impl Into<String>) {
        if let Some(p) = self.outputs.get_mut(port) {
            p.name = name.into();
        }
    }

    /// Renames an input port. Out-of-range indices are ignored.
    pub fn rename_input(&mut self, port: usize, name: impl Into<String>) {
        if let Some(p) = self.inputs.get_mut(port) {
            p.name = name.into();
        }
    }
}

/// Closed set of node types, as named in graph descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Externally fed samples.
    Input,
    /// Named value set by the host or by actions.
    Parameter,
    /// Named sink read by conditions and actions.
    Feedback,
    /// Fixed delay.
    Delay,
    /// Capture and hold.
    Freeze,
    /// Exponential smoothing.
    Smooth,
    /// Range remap.
    Remap,
    /// HSV to RGB.
    ColorWheel,
    /// Spectral transform.
    Fft,
    /// Asynchronously loaded parameter history.
    CloudInput,
}

impl NodeType {
    /// Every node type.
    pub const ALL: [NodeType; 10] = [
        NodeType::Input,
        NodeType::Parameter,
        NodeType::Feedback,
        NodeType::Delay,
        NodeType::Freeze,
        NodeType::Smooth,
        NodeType::Remap,
        NodeType::ColorWheel,
        NodeType::Fft,
        NodeType::CloudInput,
    ];

    /// Identifier used in graph descriptions.
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Parameter => "parameter",
            Self::Feedback => "feedback",
            Self::Delay => "delay",
            Self::Freeze => "freeze",
            Self::Smooth => "smooth",
            Self::Remap => "remap",
            Self::ColorWheel => "color_wheel",
            Self::Fft => "fft",
            Self::CloudInput => "cloud_input",
        }
    }

    /// Parses an identifier produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether the node's port count follows a channel count.
    pub fn has_channels(self) -> bool {
        matches!(self, Self::Parameter | Self::Feedback)
    }
}

impl core::fmt::Display for NodeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sticky error conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeError {
    /// Another node of the same kind uses this name.
    DuplicateName,
    /// The node needs a constant-rate input but the connected stream has none.
    InputConstantSampleRate,
}

/// Sticky warning conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeWarning {
    /// No data has arrived yet.
    NotUpdated,
}

/// User-visible problems of a node. Flags stay set until cleared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStatus {
    errors: Vec<(NodeError, String)>,
    warnings: Vec<(NodeWarning, String)>,
}

impl NodeStatus {
    /// Raises an error flag, replacing its message.
    pub fn set_error(&mut self, code: NodeError, message: impl Into<String>) {
        let message = message.into();
        match self.errors.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = message,
            None => self.errors.push((code, message)),
        }
    }

    /// Clears an error flag.
    pub fn clear_error(&mut self, code: NodeError) {
        self.errors.retain(|(c, _)| *c != code);
    }

    /// Raises a warning flag, replacing its message.
    pub fn set_warning(&mut self, code: NodeWarning, message: impl Into<String>) {
        let message = message.into();
        match self.warnings.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = message,
            None => self.warnings.push((code, message)),
        }
    }

    /// Clears a warning flag.
    pub fn clear_warning(&mut self, code: NodeWarning) {
        self.warnings.retain(|(c, _)| *c != code);
    }

    /// Whether any error flag is raised.
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether any warning flag is raised.
    pub fn has_warning(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Message of a raised error flag.
    pub fn error(&self, code: NodeError) -> Option<&str> {
        self.errors
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, m)| m.as_str())
    }

    /// Message of a raised warning flag.
    pub fn warning(&self, code: NodeWarning) -> Option<&str> {
        self.warnings
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, m)| m.as_str())
    }

    /// Raised error messages.
    pub fn error_messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(_, m)| m.as_str())
    }

    /// Raised warning messages.
    pub fn warning_messages(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(|(_, m)| m.as_str())
    }
}

/// Engine time of the current tick, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickTime {
    /// Time since the engine started.
    pub elapsed: f64,
    /// Time since the previous tick.
    pub delta: f64,
}

/// Borrowed view of an output channel.
#[derive(Clone, Copy, Debug)]
pub enum Output<'a> {
    /// Scalar stream.
    Scalar(&'a Channel<f64>),
    /// Spectrum stream.
    Spectrum(&'a Channel<Spectrum>),
}

/// Handed to [`NodeLifecycle::on_attributes_changed`].
///
/// Collects visibility toggles as [`EngineEvent::AttributeUpdated`] events and
/// records whether the node asked for a deferred reset.
pub struct AttributeChange<'a> {
    node: crate::NodeId,
    attributes: &'a mut AttributeSet,
    ports: &'a mut Ports,
    events: &'a mut Vec<EngineEvent>,
    reset_requested: bool,
}

impl<'a> AttributeChange<'a> {
    pub(crate) fn new(
        node: crate::NodeId,
        attributes: &'a mut AttributeSet,
        ports: &'a mut Ports,
        events: &'a mut Vec<EngineEvent>,
    ) -> Self {
        Self {
            node,
            attributes,
            ports,
            events,
            reset_requested: false,
        }
    }

    /// Current attribute values.
    pub fn attributes(&self) -> &AttributeSet {
        self.attributes
    }

    /// Ports of the node.
    pub fn ports_mut(&mut self) -> &mut Ports {
        self.ports
    }

    /// Writes a value derived from other attributes. No further change
    /// notification follows.
    pub fn set(&mut self, id: &str, value: AttributeValue) -> Result<bool, AttributeError> {
        self.attributes.set(id, value)
    }

    /// Shows or hides an attribute, announcing the toggle.
    pub fn set_visible(&mut self, id: &'static str, visible: bool) {
        if self.attributes.set_visible(id, visible) {
            self.events.push(EngineEvent::AttributeUpdated {
                node: Some(self.node),
                attribute: id,
            });
        }
    }

    /// Schedules a reset for the next tick boundary.
    pub fn reset_async(&mut self) {
        self.reset_requested = true;
    }

    pub(crate) fn reset_requested(&self) -> bool {
        self.reset_requested
    }
}

/// Shared lifecycle of all node variants.
pub trait NodeLifecycle {
    /// Registers attributes and ports. Called once when the node is created.
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports);

    /// Re-derives state from the connected inputs. `false` suspends the node.
    fn reinit(&mut self, inputs: &Inputs<'_>, ports: &mut Ports) -> bool;

    /// Whether the first input must run at a constant sample rate.
    /// The graph flags the node while it does not.
    fn requires_constant_rate(&self) -> bool {
        false
    }

    /// Runs once after the first successful [`reinit`](Self::reinit) following a reset.
    fn start(&mut self, _elapsed: f64, _ports: &mut Ports) {}

    /// Consumes new input samples and produces output samples.
    fn update(&mut self, inputs: &Inputs<'_>, time: TickTime, status: &mut NodeStatus);

    /// Reacts to attribute edits. Must be a no-op when nothing relevant changed.
    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>);

    /// Applies settings snapshotted by a deferred reset and drops all runtime state.
    fn reset(&mut self);

    /// Opens a new output batch and ages the output channels by `delta` seconds.
    fn begin_batch(&mut self, delta: f64);

    /// Output channel behind `port`.
    fn output(&self, port: usize) -> Option<Output<'_>>;
}

/// Variant-specific node state.
pub enum NodeKind {
    /// See [`InputNode`].
    Input(InputNode),
    /// See [`ParameterNode`].
    Parameter(ParameterNode),
    /// See [`FeedbackNode`].
    Feedback(FeedbackNode),
    /// See [`DelayNode`].
    Delay(DelayNode),
    /// See [`FreezeNode`].
    Freeze(FreezeNode),
    /// See [`SmoothNode`].
    Smooth(SmoothNode),
    /// See [`RemapNode`].
    Remap(RemapNode),
    /// See [`ColorWheelNode`].
    ColorWheel(ColorWheelNode),
    /// See [`FftNode`].
    Fft(Box<FftNode>),
    /// See [`CloudInputNode`].
    CloudInput(CloudInputNode),
}

macro_rules! dispatch {
    ($kind:expr, $node:ident => $body:expr) => {
        match $kind {
            NodeKind::Input($node) => $body,
            NodeKind::Parameter($node) => $body,
            NodeKind::Feedback($node) => $body,
            NodeKind::Delay($node) => $body,
            NodeKind::Freeze($node) => $body,
            NodeKind::Smooth($node) => $body,
            NodeKind::Remap($node) => $body,
            NodeKind::ColorWheel($node) => $body,
            NodeKind::Fft($node) => $body,
            NodeKind::CloudInput($node) => $body,
        }
    };
}

impl NodeKind {
    /// Creates a node of `node_type`.
    ///
    /// `channels` sets the port count of parameter and feedback nodes and is
    /// ignored otherwise. `buffer_size` bounds every output channel (`0` keeps
    /// all samples).
    pub fn new(node_type: NodeType, channels: usize, buffer_size: usize) -> Self {
        let channels = channels.max(1);
        match node_type {
            NodeType::Input => Self::Input(InputNode::new(buffer_size)),
            NodeType::Parameter => Self::Parameter(ParameterNode::new(channels, buffer_size)),
            NodeType::Feedback => Self::Feedback(FeedbackNode::new(channels)),
            NodeType::Delay => Self::Delay(DelayNode::new(buffer_size)),
            NodeType::Freeze => Self::Freeze(FreezeNode::new(buffer_size)),
            NodeType::Smooth => Self::Smooth(SmoothNode::new(buffer_size)),
            NodeType::Remap => Self::Remap(RemapNode::new(buffer_size)),
            NodeType::ColorWheel => Self::ColorWheel(ColorWheelNode::new(buffer_size)),
            NodeType::Fft => Self::Fft(Box::new(FftNode::new(buffer_size))),
            NodeType::CloudInput => Self::CloudInput(CloudInputNode::new(buffer_size)),
        }
    }

    /// Type tag of this variant.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Input(_) => NodeType::Input,
            Self::Parameter(_) => NodeType::Parameter,
            Self::Feedback(_) => NodeType::Feedback,
            Self::Delay(_) => NodeType::Delay,
            Self::Freeze(_) => NodeType::Freeze,
            Self::Smooth(_) => NodeType::Smooth,
            Self::Remap(_) => NodeType::Remap,
            Self::ColorWheel(_) => NodeType::ColorWheel,
            Self::Fft(_) => NodeType::Fft,
            Self::CloudInput(_) => NodeType::CloudInput,
        }
    }
}

impl NodeLifecycle for NodeKind {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        dispatch!(self, node => node.init(attributes, ports))
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, ports: &mut Ports) -> bool {
        dispatch!(self, node => node.reinit(inputs, ports))
    }

    fn requires_constant_rate(&self) -> bool {
        dispatch!(self, node => node.requires_constant_rate())
    }

    fn start(&mut self, elapsed: f64, ports: &mut Ports) {
        dispatch!(self, node => node.start(elapsed, ports))
    }

    fn update(&mut self, inputs: &Inputs<'_>, time: TickTime, status: &mut NodeStatus) {
        dispatch!(self, node => node.update(inputs, time, status))
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        dispatch!(self, node => node.on_attributes_changed(change))
    }

    fn reset(&mut self) {
        dispatch!(self, node => node.reset())
    }

    fn begin_batch(&mut self, delta: f64) {
        dispatch!(self, node => node.begin_batch(delta))
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        dispatch!(self, node => node.output(port))
    }
}

/// Where a node is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Lifecycle {
    pub initialized: bool,
    pub started: bool,
    pub reinit_requested: bool,
}

/// A node in the signal graph.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) attributes: AttributeSet,
    pub(crate) ports: Ports,
    pub(crate) status: NodeStatus,
    /// Edge feeding each input port.
    pub(crate) sources: Vec<Option<crate::EdgeId>>,
    /// Edges leaving this node.
    pub(crate) outgoing: Vec<crate::EdgeId>,
    /// Generation and rate of each input as of the last tick.
    pub(crate) seen: Vec<Option<(u32, f64)>>,
    pub(crate) lifecycle: Lifecycle,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, mut kind: NodeKind) -> Self {
        let mut attributes = AttributeSet::new();
        let mut ports = Ports::default();
        kind.init(&mut attributes, &mut ports);
        let num_inputs = ports.inputs.len();
        Self {
            id,
            name,
            kind,
            attributes,
            ports,
            status: NodeStatus::default(),
            sources: vec![None; num_inputs],
            outgoing: Vec::new(),
            seen: vec![None; num_inputs],
            lifecycle: Lifecycle {
                reinit_requested: true,
                ..Lifecycle::default()
            },
        }
    }

    /// Node identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// User-visible name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag.
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Variant-specific state.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Current attributes.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Input and output ports.
    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    /// Error and warning flags.
    pub fn status(&self) -> &NodeStatus {
        &self.status
    }

    /// Whether the node ran its last successful re-init and is not suspended.
    pub fn is_initialized(&self) -> bool {
        self.lifecycle.initialized
    }

    /// Edge feeding input `port`, if connected.
    pub fn source(&self, port: usize) -> Option<crate::EdgeId> {
        self.sources.get(port).copied().flatten()
    }

    /// Output channel behind `port`.
    pub fn output(&self, port: usize) -> Option<Output<'_>> {
        self.kind.output(port)
    }

    /// Scalar output channel behind `port`.
    pub fn scalar_output(&self, port: usize) -> Option<&Channel<f64>> {
        match self.kind.output(port)? {
            Output::Scalar(channel) => Some(channel),
            Output::Spectrum(_) => None,
        }
    }

    /// Spectrum output channel behind `port`.
    pub fn spectrum_output(&self, port: usize) -> Option<&Channel<Spectrum>> {
        match self.kind.output(port)? {
            Output::Spectrum(channel) => Some(channel),
            Output::Scalar(_) => None,
        }
    }

    /// Records the generation and rate of every input and reports whether any
    /// differs from the previous tick.
    pub(crate) fn observe_inputs(&mut self, inputs: &Inputs<'_>) -> bool {
        let mut changed = false;
        for (seen, input) in self.seen.iter_mut().zip(inputs) {
            let now = input.map(|c| (c.generation(), c.sample_rate()));
            if let (Some(before), Some(now)) = (*seen, now) {
                changed |= before != now;
            }
            *seen = now;
        }
        changed
    }
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.node_type())
            .field("initialized", &self.lifecycle.initialized)
            .finish_non_exhaustive()
    }
}
