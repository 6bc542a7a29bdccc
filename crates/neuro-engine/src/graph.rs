//! Signal graph: node arena, connections and the per-tick driver.
//!
//! Nodes and edges live in slot vectors indexed by their IDs. Removing a node
//! leaves a `None` slot; IDs are never reused.
//!
//! # Tick
//!
//! [`SignalGraph::tick`] advances the whole graph by one engine frame:
//!
//! 1. apply deferred resets queued since the last tick
//! 2. recompute the topological order if the topology changed
//! 3. for every node in order: re-initialize when needed, start once after a
//!    successful re-init, open a new output batch, update
//!
//! A node is re-initialized when it was reset, when an input's sample rate
//! changed, when an upstream channel was cleared, or while it is still
//! suspended. Upstream nodes always run before their consumers, so every
//! update sees the samples its producers appended in the same tick.
//!
//! # Example
//!
//! ```rust
//! use neuro_engine::{NodeType, SignalGraph};
//!
//! let mut graph = SignalGraph::new();
//! let input = graph.add(NodeType::Input, "eeg");
//! let smooth = graph.add(NodeType::Smooth, "smooth");
//! graph.connect(input, 0, smooth, 0).unwrap();
//!
//! graph.push_samples(input, &[1.0, 1.0, 1.0]).unwrap();
//! graph.tick(0.1, 0.1).unwrap();
//! assert_eq!(graph.scalar_output(smooth, 0).unwrap().num_samples(), 3);
//! ```

use neuro_core::{AttributeValue, Channel, Spectrum};

use crate::context::{Classifier, EngineEvent, FeedbackReading};
use crate::edge::{Edge, EdgeId};
use crate::error::GraphError;
use crate::node::{
    AttributeChange, Lifecycle, Node, NodeError, NodeId, NodeKind, NodeLifecycle, NodeType,
    TickTime,
};
use crate::nodes::{CloudParameter, CloudRequest};

/// Default ring size of every output channel, in samples.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 14;

/// Directed acyclic graph of signal nodes.
pub struct SignalGraph {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    next_node_slot: u32,
    next_edge_slot: u32,
    buffer_size: usize,
    order: Vec<usize>,
    order_dirty: bool,
    pending_resets: Vec<NodeId>,
    events: Vec<EngineEvent>,
}

impl Default for SignalGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGraph {
    /// Creates an empty graph with [`DEFAULT_BUFFER_SIZE`] output rings.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Creates an empty graph whose output channels keep `buffer_size`
    /// samples (`0` keeps every sample).
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_node_slot: 0,
            next_edge_slot: 0,
            buffer_size,
            order: Vec::new(),
            order_dirty: true,
            pending_resets: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Ring size of output channels created by this graph.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Adds a single-channel node.
    pub fn add(&mut self, node_type: NodeType, name: impl Into<String>) -> NodeId {
        self.add_with_channels(node_type, name, 1)
    }

    /// Adds a node. `channels` sets the port count of parameter and feedback
    /// nodes (at least one) and is ignored by other types.
    pub fn add_with_channels(
        &mut self,
        node_type: NodeType,
        name: impl Into<String>,
        channels: usize,
    ) -> NodeId {
        let id = NodeId(self.next_node_slot);
        self.next_node_slot += 1;
        let name = name.into();
        tracing::debug!("graph_add: {node_type} node {id} '{name}'");

        let kind = NodeKind::new(node_type, channels, self.buffer_size);
        let idx = id.0 as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        self.nodes[idx] = Some(Node::new(id, name, kind));
        self.order_dirty = true;
        id
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.get_node(id)?;
        let edges: Vec<EdgeId> = node
            .sources
            .iter()
            .flatten()
            .chain(&node.outgoing)
            .copied()
            .collect();
        for edge_id in edges {
            if let Some(edge) = self.disconnect_internal(edge_id) {
                if edge.to != id {
                    self.reset_async(edge.to);
                }
            }
        }

        self.nodes[id.0 as usize] = None;
        self.pending_resets.retain(|&pending| pending != id);
        self.order_dirty = true;
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    /// Connects output `from_port` of `from` to input `to_port` of `to`.
    ///
    /// The target node is reset before the next tick.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> Result<EdgeId, GraphError> {
        let from_type = self
            .get_node(from)?
            .ports
            .outputs
            .get(from_port)
            .map(|p| p.port_type)
            .ok_or(GraphError::PortNotFound {
                node: from,
                direction: "output",
                port: from_port,
            })?;
        let target = self.get_node(to)?;
        let to_type = target
            .ports
            .inputs
            .get(to_port)
            .map(|p| p.port_type)
            .ok_or(GraphError::PortNotFound {
                node: to,
                direction: "input",
                port: to_port,
            })?;

        if from_type != to_type {
            return Err(GraphError::PortTypeMismatch {
                from: from_type,
                to: to_type,
            });
        }
        if let Some(existing) = target.source(to_port) {
            if self.edge(existing).is_some_and(|e| e.from == from && e.from_port == from_port) {
                return Err(GraphError::DuplicateEdge(from, to));
            }
            return Err(GraphError::InputAlreadyConnected { node: to, port: to_port });
        }
        // A cycle exists if `to` can already reach `from`; this includes self-loops.
        if self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }

        let edge_id = EdgeId(self.next_edge_slot);
        self.next_edge_slot += 1;
        let edge_idx = edge_id.0 as usize;
        if edge_idx >= self.edges.len() {
            self.edges.resize_with(edge_idx + 1, || None);
        }
        self.edges[edge_idx] = Some(Edge {
            from,
            from_port,
            to,
            to_port,
        });

        if let Some(Some(node)) = self.nodes.get_mut(from.0 as usize) {
            node.outgoing.push(edge_id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(to.0 as usize) {
            node.sources[to_port] = Some(edge_id);
        }
        self.reset_async(to);
        self.order_dirty = true;

        tracing::debug!("graph_connect: {from}:{from_port} → {to}:{to_port}");
        Ok(edge_id)
    }

    /// Removes an edge. The former target is reset before the next tick.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<(), GraphError> {
        let edge = self.disconnect_internal(id).ok_or(GraphError::EdgeNotFound(id))?;
        self.reset_async(edge.to);
        tracing::debug!("graph_disconnect: edge {id}");
        Ok(())
    }

    /// Node with this ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    /// First node called `name`.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|n| n.name == name).map(Node::id)
    }

    /// Every node in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    /// Edge with this ID.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)?.as_ref()
    }

    /// Every edge in creation order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Writes one attribute and lets the node react.
    ///
    /// Returns whether the stored value changed. Numbers are clamped into the
    /// attribute's range.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<bool, GraphError> {
        let node = self.get_node_mut(id)?;
        let changed = node.attributes.set(attribute, value)?;
        if changed {
            self.notify_attributes(id);
        }
        Ok(changed)
    }

    /// Renames a node. Cloud inputs request their values again.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        let name = name.into();
        if node.name == name {
            return Ok(());
        }
        tracing::debug!("graph_rename: node {id} '{}' → '{name}'", node.name);
        node.name = name;
        if node.node_type() == NodeType::CloudInput {
            self.reset_async(id);
        }
        Ok(())
    }

    /// Queues samples on an input node for the next tick.
    pub fn push_samples(&mut self, id: NodeId, samples: &[f64]) -> Result<(), GraphError> {
        match &mut self.get_node_mut(id)?.kind {
            NodeKind::Input(input) => {
                input.push(samples);
                Ok(())
            }
            _ => Err(GraphError::NodeTypeMismatch {
                node: id,
                expected: NodeType::Input,
            }),
        }
    }

    /// Sets one channel of a parameter node. Returns `false` for an
    /// out-of-range channel.
    pub fn set_parameter_value(
        &mut self,
        id: NodeId,
        channel: usize,
        value: f64,
    ) -> Result<bool, GraphError> {
        let Node { kind, ports, .. } = self.get_node_mut(id)?;
        match kind {
            NodeKind::Parameter(parameter) => Ok(parameter.set_value(channel, value, ports)),
            _ => Err(GraphError::NodeTypeMismatch {
                node: id,
                expected: NodeType::Parameter,
            }),
        }
    }

    /// Scalar output channel of a node.
    pub fn scalar_output(&self, id: NodeId, port: usize) -> Option<&Channel<f64>> {
        self.node(id)?.scalar_output(port)
    }

    /// Spectrum output channel of a node.
    pub fn spectrum_output(&self, id: NodeId, port: usize) -> Option<&Channel<Spectrum>> {
        self.node(id)?.spectrum_output(port)
    }

    /// Node IDs in processing order.
    pub fn topological_order(&mut self) -> Result<Vec<NodeId>, GraphError> {
        self.refresh_order()?;
        Ok(self.order.iter().map(|&i| NodeId(i as u32)).collect())
    }

    /// Schedules a reset of every node (graph reload).
    pub fn reset(&mut self) {
        let ids: Vec<NodeId> = self.nodes().map(Node::id).collect();
        for id in ids {
            self.reset_async(id);
        }
    }

    /// Advances the graph to `elapsed` seconds; `delta` is the time since the
    /// previous tick.
    pub fn tick(&mut self, elapsed: f64, delta: f64) -> Result<(), GraphError> {
        self.apply_pending_resets();
        self.refresh_order()?;

        let time = TickTime { elapsed, delta };
        for i in 0..self.order.len() {
            let idx = self.order[i];
            let Some(mut node) = self.nodes[idx].take() else {
                continue;
            };
            self.process_node(&mut node, time);
            self.nodes[idx] = Some(node);
        }
        Ok(())
    }

    /// Takes the requests published by cloud input nodes since the last call.
    pub fn take_cloud_requests(&mut self) -> Vec<CloudRequest> {
        self.nodes
            .iter_mut()
            .flatten()
            .filter_map(|node| match &mut node.kind {
                NodeKind::CloudInput(cloud) => cloud.take_request(node.id, &node.name),
                _ => None,
            })
            .collect()
    }

    /// Appends fetched values to a cloud input node.
    pub fn deposit_cloud_values(&mut self, id: NodeId, values: &[f64]) -> Result<(), GraphError> {
        match &mut self.get_node_mut(id)?.kind {
            NodeKind::CloudInput(cloud) => {
                cloud.deposit(values);
                Ok(())
            }
            _ => Err(GraphError::NodeTypeMismatch {
                node: id,
                expected: NodeType::CloudInput,
            }),
        }
    }

    /// Replaces the values of a cloud input node with the float parameters
    /// matching its name. Returns the number of values loaded.
    pub fn load_cloud_parameters(
        &mut self,
        id: NodeId,
        parameters: &[CloudParameter],
    ) -> Result<usize, GraphError> {
        let Node { kind, name, .. } = self.get_node_mut(id)?;
        match kind {
            NodeKind::CloudInput(cloud) => {
                let count = cloud.load(name, parameters);
                tracing::debug!("cloud_load: node {id} '{name}' matched {count} values");
                Ok(count)
            }
            _ => Err(GraphError::NodeTypeMismatch {
                node: id,
                expected: NodeType::CloudInput,
            }),
        }
    }

    /// Takes the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // --- internals ---

    fn get_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.node(id).ok_or(GraphError::NodeNotFound(id))
    }

    fn get_node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn find_node_of_type(&self, node_type: NodeType, name: &str) -> Option<&Node> {
        self.nodes()
            .find(|n| n.node_type() == node_type && n.name == name)
    }

    fn reset_async(&mut self, id: NodeId) {
        if !self.pending_resets.contains(&id) {
            tracing::debug!("graph_reset_async: node {id}");
            self.pending_resets.push(id);
        }
    }

    fn apply_pending_resets(&mut self) {
        for id in std::mem::take(&mut self.pending_resets) {
            if let Some(Some(node)) = self.nodes.get_mut(id.0 as usize) {
                node.kind.reset();
                node.seen.fill(None);
                node.lifecycle = Lifecycle {
                    reinit_requested: true,
                    ..Lifecycle::default()
                };
            }
        }
    }

    fn notify_attributes(&mut self, id: NodeId) {
        let Some(Some(node)) = self.nodes.get_mut(id.0 as usize) else {
            return;
        };
        let reset = {
            let mut change =
                AttributeChange::new(id, &mut node.attributes, &mut node.ports, &mut self.events);
            node.kind.on_attributes_changed(&mut change);
            change.reset_requested()
        };
        if reset {
            self.reset_async(id);
        }
    }

    fn refresh_order(&mut self) -> Result<(), GraphError> {
        if self.order_dirty {
            self.order = self.kahn_sort()?;
            self.order_dirty = false;
            tracing::debug!("graph_sort: {} nodes in topo order", self.order.len());
        }
        Ok(())
    }

    fn process_node(&self, node: &mut Node, time: TickTime) {
        let inputs: Vec<Option<&Channel<f64>>> = node
            .sources
            .iter()
            .map(|&source| {
                let edge = self.edge(source?)?;
                self.node(edge.from)?.scalar_output(edge.from_port)
            })
            .collect();

        let inputs_changed = node.observe_inputs(&inputs);
        let lifecycle = node.lifecycle;
        if inputs_changed || lifecycle.reinit_requested || !lifecycle.initialized {
            let ok = node.kind.reinit(&inputs, &mut node.ports);
            if ok != lifecycle.initialized {
                if ok {
                    tracing::trace!("node_resume: {} '{}'", node.id, node.name);
                } else {
                    tracing::trace!("node_suspend: {} '{}'", node.id, node.name);
                }
            }
            Self::check_constant_rate(node, &inputs);
            node.lifecycle.initialized = ok;
            node.lifecycle.reinit_requested = false;
            if ok && !lifecycle.started {
                node.kind.start(time.elapsed, &mut node.ports);
                node.lifecycle.started = true;
            }
        }

        node.kind.begin_batch(time.delta);
        if node.lifecycle.initialized {
            node.kind.update(&inputs, time, &mut node.status);
        }

        if node.node_type() == NodeType::CloudInput {
            self.check_unique_name(node);
        }
    }

    /// Flags a node whose connected first input has no constant rate when it needs one.
    fn check_constant_rate(node: &mut Node, inputs: &[Option<&Channel<f64>>]) {
        let missing = node.kind.requires_constant_rate()
            && inputs
                .first()
                .copied()
                .flatten()
                .is_some_and(|input| !input.has_fixed_rate());
        if missing {
            node.status.set_error(
                NodeError::InputConstantSampleRate,
                "Input must have a valid sample rate.",
            );
        } else {
            node.status.clear_error(NodeError::InputConstantSampleRate);
        }
    }

    /// Flags a cloud input whose name another cloud input already uses.
    /// `node` is outside the arena while this runs.
    fn check_unique_name(&self, node: &mut Node) {
        let duplicate = self
            .find_node_of_type(NodeType::CloudInput, &node.name)
            .is_some();
        if duplicate {
            if node.status.error(NodeError::DuplicateName).is_none() {
                tracing::warn!("cloud input name '{}' is not unique", node.name);
            }
            node.status.set_error(NodeError::DuplicateName, "Name is not unique.");
        } else {
            node.status.clear_error(NodeError::DuplicateName);
        }
    }

    /// DFS: whether `to` is reachable from `from` along existing edges.
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(node)) = self.nodes.get(idx) {
                for &edge_id in &node.outgoing {
                    if let Some(edge) = self.edge(edge_id) {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    fn kahn_sort(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.nodes.len();
        let mut in_degree = vec![0u32; n];
        let mut active_count = 0usize;

        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(node) = node {
                active_count += 1;
                in_degree[i] = node.sources.iter().flatten().count() as u32;
            }
        }

        if active_count == 0 {
            return Err(GraphError::EmptyGraph);
        }

        // Seeded in reverse so that sources pop in creation order.
        let mut queue: Vec<usize> = (0..n)
            .rev()
            .filter(|&i| self.nodes[i].is_some() && in_degree[i] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(active_count);

        while let Some(idx) = queue.pop() {
            sorted.push(idx);
            let Some(node) = &self.nodes[idx] else {
                continue;
            };
            for &edge_id in &node.outgoing {
                if let Some(edge) = self.edge(edge_id) {
                    let to_idx = edge.to.0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        queue.push(to_idx);
                    }
                }
            }
        }

        if sorted.len() != active_count {
            return Err(GraphError::CycleDetected);
        }
        Ok(sorted)
    }

    fn disconnect_internal(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.0 as usize)?.take()?;
        if let Some(Some(node)) = self.nodes.get_mut(edge.from.0 as usize) {
            node.outgoing.retain(|&e| e != id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(edge.to.0 as usize) {
            if let Some(slot) = node.sources.get_mut(edge.to_port) {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
        self.order_dirty = true;
        Some(edge)
    }
}

impl Classifier for SignalGraph {
    fn feedback_names(&self) -> Vec<String> {
        self.nodes()
            .filter(|n| n.node_type() == NodeType::Feedback)
            .map(|n| n.name.clone())
            .collect()
    }

    fn feedback(&self, name: &str) -> Option<FeedbackReading<'_>> {
        match &self.find_node_of_type(NodeType::Feedback, name)?.kind {
            NodeKind::Feedback(feedback) => Some(FeedbackReading {
                values: feedback.values(),
                is_empty: feedback.is_empty(),
            }),
            _ => None,
        }
    }

    fn parameter_values(&self, name: &str) -> Option<&[f64]> {
        match &self.find_node_of_type(NodeType::Parameter, name)?.kind {
            NodeKind::Parameter(parameter) => Some(parameter.values()),
            _ => None,
        }
    }

    fn set_parameter_value(&mut self, name: &str, channel: usize, value: f64) -> bool {
        let Some(id) = self
            .find_node_of_type(NodeType::Parameter, name)
            .map(Node::id)
        else {
            return false;
        };
        SignalGraph::set_parameter_value(self, id, channel, value).unwrap_or(false)
    }
}
