// Connection handling module
// Accepts a single TCP connection and serves it with the request handler

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use crate::config;
use crate::handler;
use crate::logger;

/// Accept a connection unless the connection limit is reached.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection in a local task.
///
/// Wraps the stream in `TokioIo` and serves HTTP/1.1, decrementing the
/// connection counter when done. `keep_alive_timeout` only switches
/// keep-alive on (non-zero) or off; it is not an idle timer. The deadline
/// from [`connection_deadline`] covers the connection as a whole, so a
/// keep-alive client is cut off once it has been connected that long,
/// however many requests it has sent.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let timeout_duration = connection_deadline(&state.config);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Lifetime cap for one connection: the larger of the read and write timeouts
fn connection_deadline(cfg: &config::Config) -> Duration {
    let performance = &cfg.performance;
    Duration::from_secs(std::cmp::max(
        performance.read_timeout,
        performance.write_timeout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_deadline_takes_larger_timeout() {
        let mut cfg = crate::config::Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(connection_deadline(&cfg), Duration::from_secs(30));

        cfg.performance.read_timeout = 5;
        cfg.performance.write_timeout = 45;
        // keep_alive_timeout plays no part in the deadline
        cfg.performance.keep_alive_timeout = 600;
        assert_eq!(connection_deadline(&cfg), Duration::from_secs(45));
    }
}
