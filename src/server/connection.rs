// Connection handling module
// Serves one accepted TCP connection until it closes, times out or is shut down

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::idle::{ActivityClock, ActivityStream};
use crate::config::ServerConfig;
use crate::handler;
use crate::logger;

/// State shared by the accept loop and every connection task
#[derive(Clone)]
pub struct ConnectionContext {
    pub config: Arc<ServerConfig>,
    /// Cancelled by `stop()`: stop accepting, finish in-flight requests
    pub shutdown: CancellationToken,
    /// Cancelled when the grace period runs out: drop connections now
    pub force_close: CancellationToken,
    pub active: Arc<AtomicUsize>,
    pub tracker: TaskTracker,
}

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `ctx` - Shared server state
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, ctx: &ConnectionContext) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = ctx.active.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = ctx.config.max_connections() {
        if prev_count >= max_conn {
            ctx.active.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    ctx.tracker.spawn(serve_connection(stream, peer_addr, ctx.clone()));
}

/// Serve HTTP/1.1 on `stream` in its own task.
///
/// On shutdown the connection switches to hyper's graceful mode: the response
/// being written completes, then the connection closes instead of waiting for
/// another keep-alive request. Force-close drops the connection immediately,
/// as does the idle timeout once no byte has moved in either direction for
/// `connection_timeout`. A response that keeps streaming is never cut off.
async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, ctx: ConnectionContext) {
    let clock = ActivityClock::new();
    let io = TokioIo::new(ActivityStream::new(stream, Arc::clone(&clock)));

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .keep_alive(ctx.config.keep_alive())
        .header_read_timeout(ctx.config.header_read_timeout());

    let service_config = Arc::clone(&ctx.config);
    let service = service_fn(move |req| {
        handler::handle_request(req, Arc::clone(&service_config), peer_addr)
    });

    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let idle_timeout = ctx.config.connection_timeout();
    let idle_check = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle_check);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    logger::log_connection_error(&err);
                }
                break;
            }
            () = ctx.shutdown.cancelled(), if !draining => {
                conn.as_mut().graceful_shutdown();
                draining = true;
            }
            () = ctx.force_close.cancelled() => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} force-closed after shutdown grace period"
                ));
                break;
            }
            () = &mut idle_check => {
                let idle = clock.idle_for();
                if idle >= idle_timeout {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} closed after {}ms idle",
                        idle.as_millis()
                    ));
                    break;
                }
                idle_check.as_mut().reset(Instant::now() + (idle_timeout - idle));
            }
        }
    }

    // Decrement active connection counter
    ctx.active.fetch_sub(1, Ordering::SeqCst);
}
