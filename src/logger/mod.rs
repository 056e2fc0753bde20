//! Logger module
//!
//! Logging helpers for the file server, emitted as `tracing` events:
//! - Server lifecycle logging
//! - Access logging (target `access`) in several formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::{AccessLogFormat, ServerConfig};

/// Install the global `fmt` subscriber
///
/// `RUST_LOG` takes precedence over `level` when set. Should be called once
/// at application startup.
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &ServerConfig) {
    tracing::info!("======================================");
    tracing::info!("File server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Serving root: {}", config.root().display());
    tracing::info!("Index files: {}", config.index_files().join(", "));
    if let Some(max) = config.max_connections() {
        tracing::info!("Max connections: {max}");
    }
    tracing::info!("======================================");
}

pub fn log_shutdown_started(active: usize, grace: Duration) {
    tracing::info!(
        active_connections = active,
        "[Shutdown] Stopped accepting connections, waiting up to {}ms for in-flight requests",
        grace.as_millis()
    );
}

pub fn log_shutdown_complete(addr: &SocketAddr) {
    tracing::info!("[Shutdown] Server on {addr} stopped");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!("[Connection] Failed to serve connection: {err}");
}

pub fn log_traversal_blocked(request_path: &str, resolved: &Path) {
    tracing::warn!(
        "Path traversal attempt blocked: {request_path} -> {}",
        resolved.display()
    );
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
