//! Error types for configuration operations.

use std::path::PathBuf;

use neuro_engine::GraphError;
use thiserror::Error;

/// Errors that can occur while loading, saving or building a graph description.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Unknown node kind
    #[error("unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// Unknown action kind
    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    /// Two nodes share an id
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// A connection names a node id that is not declared
    #[error("connection references unknown node: {0}")]
    UnknownNode(String),

    /// An attribute value was rejected
    #[error("invalid attribute '{attribute}' on {node}: {reason}")]
    InvalidAttribute {
        /// Node id, or `actions[i]` / `conditions[i]`.
        node: String,
        /// Attribute id.
        attribute: String,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// The graph rejected a connection
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(
        node: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ConfigError::InvalidAttribute {
            node: node.into(),
            attribute: attribute.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn create_dir_display_names_path() {
        let err = ConfigError::create_dir("/graphs", mock_io_err());
        assert_eq!(
            err.to_string(),
            "failed to create directory '/graphs': mock"
        );
    }

    #[test]
    fn invalid_attribute_display() {
        let err = ConfigError::invalid_attribute("smooth", "speed", "expects float, got text");
        assert_eq!(
            err.to_string(),
            "invalid attribute 'speed' on smooth: expects float, got text"
        );
    }

    #[test]
    fn graph_error_is_transparent() {
        let err = ConfigError::from(GraphError::CycleDetected);
        assert_eq!(err.to_string(), "adding this edge would create a cycle");
    }
}
