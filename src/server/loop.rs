// Server loop module
// Accepts connections until shutdown is requested, then releases the listener

use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::{accept_connection, ConnectionContext};
use crate::logger;

/// Pause after a failed accept, e.g. when the process is out of file descriptors
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Accept loop for one listener.
///
/// Returns once `ctx.shutdown` is cancelled. The listener is dropped on
/// return, so the bound address is free as soon as this future completes.
pub async fn run_accept_loop(listener: TcpListener, ctx: ConnectionContext) {
    loop {
        tokio::select! {
            biased;

            () = ctx.shutdown.cancelled() => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &ctx),
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::select! {
                            () = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                            () = ctx.shutdown.cancelled() => break,
                        }
                    }
                }
            }
        }
    }

    drop(listener);
}
