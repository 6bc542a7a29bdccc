//! Per-item configuration types: nodes, connections, actions, conditions.

use std::collections::BTreeMap;

use neuro_core::AttributeValue;
use neuro_engine::{ActionKind, NodeType};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An attribute value as written in a graph file.
///
/// Colors are written as `"#RRGGBB"` strings and choices as either their
/// index or their label; the attribute set converts both on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeConfig {
    /// `true` / `false`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Text(String),
}

impl AttributeConfig {
    /// Converts to an engine attribute value.
    pub fn to_value(&self) -> Result<AttributeValue, String> {
        Ok(match self {
            Self::Bool(b) => AttributeValue::Bool(*b),
            Self::Int(i) => AttributeValue::Int(
                i32::try_from(*i).map_err(|_| format!("integer {i} is out of range"))?,
            ),
            Self::Float(f) => AttributeValue::Float(*f),
            Self::Text(s) => AttributeValue::Text(s.clone()),
        })
    }
}

impl From<f64> for AttributeConfig {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for AttributeConfig {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AttributeConfig {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeConfig {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Attribute table of a node, action or condition.
pub type Attributes = BTreeMap<String, AttributeConfig>;

/// One node of a graph file.
///
/// ```rust
/// use neuro_config::NodeConfig;
///
/// let node = NodeConfig::new("calm", "smooth").with_attribute("speed", 0.9);
/// assert_eq!(node.display_name(), "calm");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Identifier referenced by connections.
    pub id: String,

    /// Node kind (`input`, `smooth`, ...).
    pub kind: String,

    /// Display name; defaults to the id. Feedback and parameter nodes are
    /// looked up by this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Channel count of parameter and feedback nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<usize>,

    /// Attribute values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl NodeConfig {
    /// Create a node configuration.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            channels: None,
            attributes: Attributes::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Add an attribute value.
    pub fn with_attribute(mut self, id: impl Into<String>, value: impl Into<AttributeConfig>) -> Self {
        self.attributes.insert(id.into(), value.into());
        self
    }

    /// Name the node is created with.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Parsed node kind.
    pub fn node_type(&self) -> Result<NodeType, ConfigError> {
        NodeType::from_name(&self.kind).ok_or_else(|| ConfigError::UnknownNodeKind(self.kind.clone()))
    }
}

fn is_zero(port: &usize) -> bool {
    *port == 0
}

/// One connection of a graph file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Source node id.
    pub from: String,
    /// Output port of the source.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub from_port: usize,
    /// Target node id.
    pub to: String,
    /// Input port of the target.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub to_port: usize,
}

impl ConnectionConfig {
    /// Connect port 0 of `from` to port 0 of `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            from_port: 0,
            to: to.into(),
            to_port: 0,
        }
    }

    /// Set both port indices.
    pub fn with_ports(mut self, from_port: usize, to_port: usize) -> Self {
        self.from_port = from_port;
        self.to_port = to_port;
        self
    }
}

/// One action of a graph file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Action kind (`play_audio`, `parameter`, ...).
    pub kind: String,

    /// Attribute values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl ActionConfig {
    /// Create an action configuration.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute value.
    pub fn with_attribute(mut self, id: impl Into<String>, value: impl Into<AttributeConfig>) -> Self {
        self.attributes.insert(id.into(), value.into());
        self
    }

    /// Parsed action kind.
    pub fn action_kind(&self) -> Result<ActionKind, ConfigError> {
        ActionKind::from_name(&self.kind)
            .ok_or_else(|| ConfigError::UnknownActionKind(self.kind.clone()))
    }
}

/// One feedback condition of a graph file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// Attribute values (`feedback`, `test_function`, `test_value`, `range_value`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl ConditionConfig {
    /// Create an empty condition configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute value.
    pub fn with_attribute(mut self, id: impl Into<String>, value: impl Into<AttributeConfig>) -> Self {
        self.attributes.insert(id.into(), value.into());
        self
    }
}
