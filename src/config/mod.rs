// Configuration module entry point
// Loads layered configuration and builds the immutable server configuration

mod server;
mod types;

use std::path::PathBuf;
use std::time::Duration;

pub use server::ServerConfig;
pub use types::{AccessLogFormat, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerSection};

use crate::error::BindError;

/// Values supplied on the command line; they take precedence over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
}

impl Config {
    /// Load configuration from the given file path (without extension)
    ///
    /// Sources, lowest precedence first: built-in defaults, the optional file,
    /// `FILESERVER__*` environment variables, then `overrides`.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let root = overrides
            .root
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FILESERVER").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.root", "./www")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 10)?
            .set_default("performance.connection_timeout", 60)?
            .set_default("performance.shutdown_grace_period", 5)?
            .set_default("http.server_name", "simple-fileserver")?
            .set_default("http.index_files", vec!["index.html"])?
            .set_override_option("server.root", root)?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(u64::from))?
            .set_override_option(
                "server.workers",
                overrides.workers.and_then(|w| u64::try_from(w).ok()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    /// Build the immutable server configuration, canonicalizing the root directory
    pub fn server_config(&self) -> Result<ServerConfig, BindError> {
        let perf = &self.performance;
        let access_log = self
            .logging
            .access_log
            .then_some(self.logging.access_log_format);

        Ok(
            ServerConfig::new(&self.server.root, self.server.host.clone(), self.server.port)?
                .with_index_files(self.http.index_files.clone())
                .with_server_name(self.http.server_name.clone())
                .with_keep_alive(perf.keep_alive)
                .with_timeouts(
                    Duration::from_secs(perf.header_read_timeout),
                    Duration::from_secs(perf.connection_timeout),
                )
                .with_shutdown_grace(Duration::from_secs(perf.shutdown_grace_period))
                .with_max_connections(perf.max_connections)
                .with_access_log(access_log),
        )
    }
}
