//! TOML session graph descriptions for the neuro engine.
//!
//! A graph file lists nodes with their attributes, the connections between
//! their ports, and the actions and feedback conditions a session uses.
//! [`GraphConfig::build`] turns it into a connected [`SignalGraph`].
//!
//! # Example
//!
//! ```rust
//! use neuro_config::{ConnectionConfig, GraphConfig, NodeConfig};
//! use neuro_engine::Classifier;
//!
//! let config = GraphConfig::new("Relaxation")
//!     .with_node(NodeConfig::new("eeg", "input"))
//!     .with_node(NodeConfig::new("calm", "smooth").with_attribute("speed", 0.9))
//!     .with_node(NodeConfig::new("score", "feedback"))
//!     .with_connection(ConnectionConfig::new("eeg", "calm"))
//!     .with_connection(ConnectionConfig::new("calm", "score"));
//!
//! let mut built = config.build().unwrap();
//! let eeg = built.node("eeg").unwrap();
//! built.graph.push_samples(eeg, &[1.0, 1.0]).unwrap();
//! built.graph.tick(0.1, 0.1).unwrap();
//! assert!(!built.graph.feedback("score").unwrap().is_empty);
//! ```
//!
//! [`SignalGraph`]: neuro_engine::SignalGraph

mod error;
mod graph_config;
mod node_config;

pub use error::ConfigError;
pub use graph_config::{BuiltGraph, GraphConfig};
pub use node_config::{
    ActionConfig, AttributeConfig, Attributes, ConditionConfig, ConnectionConfig, NodeConfig,
};
