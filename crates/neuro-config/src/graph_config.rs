//! Graph file format and the builder that turns it into a running graph.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use neuro_core::AttributeError;
use neuro_engine::{
    Action, DEFAULT_BUFFER_SIZE, GraphError, NodeId, SignalGraph, StateTransitionFeedbackCondition,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::node_config::{ActionConfig, Attributes, ConditionConfig, ConnectionConfig, NodeConfig};

/// A complete session graph description.
///
/// # TOML Format
///
/// ```toml
/// name = "Alpha training"
/// description = "Smoothed alpha power drives the background color"
///
/// [[nodes]]
/// id = "eeg"
/// kind = "input"
///
/// [[nodes]]
/// id = "calm"
/// kind = "smooth"
/// [nodes.attributes]
/// speed = 0.9
///
/// [[nodes]]
/// id = "score"
/// kind = "feedback"
///
/// [[connections]]
/// from = "eeg"
/// to = "calm"
///
/// [[connections]]
/// from = "calm"
/// to = "score"
///
/// [[actions]]
/// kind = "set_background_color"
/// [actions.attributes]
/// color = "#20A040"
///
/// [[conditions]]
/// [conditions.attributes]
/// feedback = "score"
/// test_function = 0
/// test_value = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Name of the session graph.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Connections between node ports.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,

    /// Actions available to the session.
    #[serde(default)]
    pub actions: Vec<ActionConfig>,

    /// Feedback conditions available to the session.
    #[serde(default)]
    pub conditions: Vec<ConditionConfig>,
}

/// The engine objects produced by [`GraphConfig::build`].
pub struct BuiltGraph {
    /// The connected signal graph.
    pub graph: SignalGraph,
    /// Configured node id to engine node id.
    pub node_ids: HashMap<String, NodeId>,
    /// Actions in declaration order.
    pub actions: Vec<Action>,
    /// Conditions in declaration order.
    pub conditions: Vec<StateTransitionFeedbackCondition>,
}

impl BuiltGraph {
    /// Engine id of a configured node.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.node_ids.get(id).copied()
    }
}

impl GraphConfig {
    /// Create an empty graph description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            connections: Vec::new(),
            actions: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Load a graph description from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&contents)
    }

    /// Parse a graph description from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Save the graph description to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), graph = %self.name, "graph saved");
        Ok(())
    }

    /// Serialize the graph description to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a node.
    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a connection.
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connections.push(connection);
        self
    }

    /// Append an action.
    pub fn with_action(mut self, action: ActionConfig) -> Self {
        self.actions.push(action);
        self
    }

    /// Append a condition.
    pub fn with_condition(mut self, condition: ConditionConfig) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Check node kinds, node id uniqueness, connection endpoints and action
    /// kinds without building anything.
    ///
    /// Port indices, port types and cycles are only checked by [`build`](Self::build).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            node.node_type()?;
            if !ids.insert(node.id.as_str()) {
                return Err(ConfigError::DuplicateNodeId(node.id.clone()));
            }
        }
        for connection in &self.connections {
            for end in [&connection.from, &connection.to] {
                if !ids.contains(end.as_str()) {
                    return Err(ConfigError::UnknownNode(end.clone()));
                }
            }
        }
        for action in &self.actions {
            action.action_kind()?;
        }
        Ok(())
    }

    /// Build the graph with the default channel buffer size.
    pub fn build(&self) -> Result<BuiltGraph, ConfigError> {
        self.build_with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Build the graph, its actions and its conditions.
    ///
    /// Nodes are created in declaration order, so duplicate display names
    /// flag the later node as not unique.
    pub fn build_with_buffer_size(&self, buffer_size: usize) -> Result<BuiltGraph, ConfigError> {
        self.validate()?;

        let mut graph = SignalGraph::with_buffer_size(buffer_size);
        let mut node_ids = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let node_type = node.node_type()?;
            let id = graph.add_with_channels(
                node_type,
                node.display_name(),
                node.channels.unwrap_or(1),
            );
            for (attribute, value) in &node.attributes {
                let value = value
                    .to_value()
                    .map_err(|reason| ConfigError::invalid_attribute(&node.id, attribute, reason))?;
                graph
                    .set_attribute(id, attribute, value)
                    .map_err(|e| match e {
                        GraphError::Attribute(e) => {
                            ConfigError::invalid_attribute(&node.id, attribute, e)
                        }
                        other => ConfigError::Graph(other),
                    })?;
            }
            node_ids.insert(node.id.clone(), id);
        }

        for connection in &self.connections {
            let from = lookup(&node_ids, &connection.from)?;
            let to = lookup(&node_ids, &connection.to)?;
            graph.connect(from, connection.from_port, to, connection.to_port)?;
        }
        // Construction-time visibility events are of no interest to the host.
        graph.drain_events();

        let mut actions = Vec::with_capacity(self.actions.len());
        for (i, config) in self.actions.iter().enumerate() {
            let mut action = Action::new(config.action_kind()?);
            apply(&config.attributes, &format!("actions[{i}]"), |id, value| {
                action.set_attribute(id, value)
            })?;
            action.drain_events();
            actions.push(action);
        }

        let mut conditions = Vec::with_capacity(self.conditions.len());
        for (i, config) in self.conditions.iter().enumerate() {
            let mut condition = StateTransitionFeedbackCondition::new();
            apply(&config.attributes, &format!("conditions[{i}]"), |id, value| {
                condition.set_attribute(id, value)
            })?;
            condition.drain_events();
            conditions.push(condition);
        }

        tracing::info!(
            graph = %self.name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            actions = actions.len(),
            conditions = conditions.len(),
            "graph built"
        );

        Ok(BuiltGraph {
            graph,
            node_ids,
            actions,
            conditions,
        })
    }
}

fn lookup(node_ids: &HashMap<String, NodeId>, id: &str) -> Result<NodeId, ConfigError> {
    node_ids
        .get(id)
        .copied()
        .ok_or_else(|| ConfigError::UnknownNode(id.to_string()))
}

fn apply(
    attributes: &Attributes,
    owner: &str,
    mut set: impl FnMut(&str, neuro_core::AttributeValue) -> Result<bool, AttributeError>,
) -> Result<(), ConfigError> {
    for (attribute, value) in attributes {
        let value = value
            .to_value()
            .map_err(|reason| ConfigError::invalid_attribute(owner, attribute, reason))?;
        set(attribute, value).map_err(|e| ConfigError::invalid_attribute(owner, attribute, e))?;
    }
    Ok(())
}
