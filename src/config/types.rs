// Configuration types module
// Defines the file/environment configuration structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure, as loaded from file, environment and CLI
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerSection,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Listener and content root
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Directory served read-only; canonicalized when the server config is built
    pub root: PathBuf,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default)]
    pub access_log_format: AccessLogFormat,
}

/// Performance configuration, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub header_read_timeout: u64,
    /// Seconds without any bytes moving before a connection is closed
    pub connection_timeout: u64,
    pub shutdown_grace_period: u64,
    pub max_connections: Option<usize>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` header; empty disables it
    pub server_name: String,
    /// Files tried, in order, when a request names a directory
    pub index_files: Vec<String>,
}

/// Access log line format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    /// Apache/Nginx combined format
    #[default]
    Combined,
    /// Common Log Format (CLF)
    Common,
    /// One JSON object per line
    Json,
}
