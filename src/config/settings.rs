//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// External analyzer settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analyzer.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "analyzer.timeout_secs must be at least 1".to_string(),
            });
        }
        if self
            .transport
            .bind_address
            .parse::<std::net::IpAddr>()
            .is_err()
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "transport.bind_address '{}' is not a valid IP address",
                    self.transport.bind_address
                ),
            });
        }
        Ok(())
    }
}

/// External analyzer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Path to the external analyzer executable. When unset, every
    /// analysis degrades to the local heuristic checks.
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Deadline for one analyzer run, in seconds.
    /// Default: 10
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    10
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Address the TCP transport binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the TCP transport. When unset (and no `--tcp` flag is
    /// given), the server speaks over stdio.
    #[serde(default)]
    pub tcp_port: Option<u16>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            tcp_port: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
