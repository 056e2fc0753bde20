//! Immutable server configuration
//!
//! Built once before `FileServer::start` and shared read-only by every
//! connection for the lifetime of the server.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::AccessLogFormat;
use crate::error::BindError;

const DEFAULT_HEADER_READ_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Root directory, listen address and serving options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    root: PathBuf,
    host: String,
    port: u16,
    index_files: Vec<String>,
    server_name: Option<String>,
    keep_alive: bool,
    header_read_timeout: Duration,
    connection_timeout: Duration,
    shutdown_grace: Duration,
    max_connections: Option<usize>,
    access_log: Option<AccessLogFormat>,
}

impl ServerConfig {
    /// Create a configuration serving `root` on `host:port`.
    ///
    /// The root is canonicalized here, so it must exist and be a readable
    /// directory. Port 0 binds an ephemeral port.
    pub fn new(
        root: impl AsRef<Path>,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Self, BindError> {
        Ok(Self {
            root: canonical_root(root.as_ref())?,
            host: host.into(),
            port,
            index_files: vec!["index.html".to_string()],
            server_name: None,
            keep_alive: true,
            header_read_timeout: DEFAULT_HEADER_READ_TIMEOUT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            max_connections: None,
            access_log: None,
        })
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    /// Set the `Server` response header; an empty name disables it.
    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.server_name = (!name.is_empty()).then_some(name);
        self
    }

    #[must_use]
    pub const fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Header read timeout, and how long a connection may sit with no bytes
    /// moving before it is closed.
    #[must_use]
    pub const fn with_timeouts(mut self, header_read: Duration, connection: Duration) -> Self {
        self.header_read_timeout = header_read;
        self.connection_timeout = connection;
        self
    }

    /// How long `stop()` waits for in-flight connections before closing them.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max: Option<usize>) -> Self {
        self.max_connections = max;
        self
    }

    #[must_use]
    pub const fn with_access_log(mut self, format: Option<AccessLogFormat>) -> Self {
        self.access_log = format;
        self
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn index_files(&self) -> &[String] {
        &self.index_files
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub const fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub const fn header_read_timeout(&self) -> Duration {
        self.header_read_timeout
    }

    pub const fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub const fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }

    pub const fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }

    pub const fn access_log(&self) -> Option<AccessLogFormat> {
        self.access_log
    }

    /// Resolve `host:port` to the address the listener binds.
    ///
    /// IP literals (IPv6 with or without brackets) are parsed directly; only
    /// host names go through the asynchronous resolver.
    pub async fn socket_addr(&self) -> Result<SocketAddr, BindError> {
        let literal = self.host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        let invalid = |source| BindError::InvalidAddress {
            addr: format!("{}:{}", self.host, self.port),
            source,
        };
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(invalid)?
            .next()
            .ok_or_else(|| invalid(std::io::Error::other("no address resolved")))
    }

    /// Check that the root is still a readable directory.
    pub fn verify_root(&self) -> Result<(), BindError> {
        canonical_root(&self.root).map(|_| ())
    }
}

/// Canonicalize `path` and make sure it is a directory whose entries can be listed.
fn canonical_root(path: &Path) -> Result<PathBuf, BindError> {
    let inaccessible = |source| BindError::RootInaccessible {
        path: path.to_path_buf(),
        source,
    };

    let canonical = path.canonicalize().map_err(inaccessible)?;
    let metadata = std::fs::metadata(&canonical).map_err(inaccessible)?;
    if !metadata.is_dir() {
        return Err(BindError::RootNotDirectory { path: canonical });
    }
    std::fs::read_dir(&canonical).map_err(inaccessible)?;

    Ok(canonical)
}
