// Server module entry
// Binds the listener, runs the accept loop and coordinates graceful shutdown

pub mod connection;
pub mod idle;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::error::BindError;
use crate::logger;
use connection::ConnectionContext;

pub use listener::create_listener;
pub use server_loop::run_accept_loop;

/// A running file server.
///
/// Created by [`FileServer::start`]; the listener is bound and accepting
/// when `start` returns. Dropping the handle without calling [`FileServer::stop`]
/// still stops the accept loop, but does not wait for open connections.
pub struct FileServer {
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
    force_close: CancellationToken,
    tracker: TaskTracker,
    active: Arc<AtomicUsize>,
    accept_task: Option<JoinHandle<()>>,
}

impl FileServer {
    /// Bind to the configured address and start serving `config.root()`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] if the root is no longer an accessible directory,
    /// the address is invalid, or the socket cannot be bound.
    pub async fn start(config: ServerConfig) -> Result<Self, BindError> {
        config.verify_root()?;
        let addr = config.socket_addr().await?;

        let listener = create_listener(addr).map_err(|source| BindError::Socket { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| BindError::Socket { addr, source })?;

        let config = Arc::new(config);
        let ctx = ConnectionContext {
            config: Arc::clone(&config),
            shutdown: CancellationToken::new(),
            force_close: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
            tracker: TaskTracker::new(),
        };

        let shutdown = ctx.shutdown.clone();
        let force_close = ctx.force_close.clone();
        let tracker = ctx.tracker.clone();
        let active = Arc::clone(&ctx.active);

        logger::log_server_start(&local_addr, &config);
        let accept_task = tokio::spawn(run_accept_loop(listener, ctx));

        Ok(Self {
            local_addr,
            config,
            shutdown,
            force_close,
            tracker,
            active,
            accept_task: Some(accept_task),
        })
    }

    /// The bound address, with the real port when port 0 was requested
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Serve until `signal` resolves, then stop gracefully
    pub async fn run_until<F>(self, signal: F)
    where
        F: Future<Output = ()>,
    {
        signal.await;
        self.stop().await;
    }

    /// Stop the server.
    ///
    /// The listener is closed before anything else, so new connection attempts
    /// are refused once this starts. In-flight requests get the configured
    /// grace period to finish; connections still open after it are dropped.
    /// Returns when every connection task has exited.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                logger::log_error(&format!("Accept loop terminated abnormally: {e}"));
            }
        }

        self.tracker.close();
        let grace = self.config.shutdown_grace();
        logger::log_shutdown_started(self.active_connections(), grace);

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            logger::log_warning(&format!(
                "[Shutdown] {} connection(s) still open after grace period, closing",
                self.active_connections()
            ));
            self.force_close.cancel();
            self.tracker.wait().await;
        }

        logger::log_shutdown_complete(&self.local_addr);
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
