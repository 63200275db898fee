//! Error types for rust-coach-mcp.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors a tool handler can return to the dispatcher.
///
/// These map onto the protocol error taxonomy: `InvalidParams` becomes a
/// `-32602` response, `Execution` becomes `-32603`. Bridge failures never
/// appear here — the bridge degrades instead of erroring.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The params passed schema validation but are still unusable.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The handler failed while doing its work.
    #[error("tool execution failed: {0}")]
    Execution(String),
}
