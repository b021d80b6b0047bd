//! Replay server
//!
//! Accepts TCP connections, reads the HTTP request head and hands every
//! `POST` to its own [`Session`]. The buffer and session settings are built
//! before the listener binds and are shared with each session through `Arc`.

pub mod request;
pub mod response;

use crate::buffer::LineBuffer;
use crate::error::ReplayError;
use crate::session::{Session, SessionConfig, SessionOutcome};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// How connections are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// One task per connection
    Concurrent,
    /// One client at a time, for runtimes without worker threads
    Serial,
}

/// HTTP replay server
pub struct ReplayServer {
    listener: TcpListener,
    config: Arc<SessionConfig>,
    buffer: Arc<LineBuffer>,
    concurrency: Concurrency,
}

impl ReplayServer {
    /// Bind the listener
    ///
    /// The buffer must be fully loaded by now; sessions only ever read it.
    pub async fn bind(addr: SocketAddr, config: SessionConfig, buffer: Arc<LineBuffer>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind replay server on {}", addr))?;

        Ok(Self {
            listener,
            config: Arc::new(config),
            buffer,
            concurrency: Concurrency::Concurrent,
        })
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("Failed to read listener address")
    }

    /// Accept connections forever
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    // e.g. fd exhaustion
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };
            debug!("{} connected", peer);

            let config = Arc::clone(&self.config);
            let buffer = Arc::clone(&self.buffer);

            match self.concurrency {
                Concurrency::Concurrent => {
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, config, buffer).await {
                            log_session_error(peer, &e);
                        }
                    });
                }
                Concurrency::Serial => {
                    if let Err(e) = handle_connection(stream, peer, config, buffer).await {
                        log_session_error(peer, &e);
                    }
                }
            }
        }
    }
}

fn log_session_error(peer: SocketAddr, err: &ReplayError) {
    if err.is_disconnect() {
        info!("{} has disconnected, hanging up", peer);
    } else {
        error!("{} session failed: {}", peer, err);
    }
}

/// Serve one connection from request head to end of stream
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<SessionConfig>,
    buffer: Arc<LineBuffer>,
) -> Result<Option<SessionOutcome>, ReplayError> {
    let _ = stream.set_nodelay(true);
    let mut stream = BufReader::new(stream);

    let head = match request::read_head(&mut stream).await {
        Ok(Some(head)) => head,
        Ok(None) => {
            debug!("{} closed without sending a request", peer);
            return Ok(None);
        }
        Err(ReplayError::MalformedRequest(reason)) => {
            let response = response::error_response(400, "Bad Request", &reason);
            let _ = stream.write_all(response.as_bytes()).await;
            return Err(ReplayError::MalformedRequest(reason));
        }
        Err(e) => return Err(e),
    };

    if head.method != "POST" {
        info!("{} \"{} {}\" 501", peer, head.method, head.path);
        let message = format!("Unsupported method ('{}')", head.method);
        let response = response::error_response(501, "Not Implemented", &message);
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
        return Ok(None);
    }

    info!("{} \"{} {} {}\" 200", peer, head.method, head.path, head.version);

    let outcome = Session::new(peer, config, buffer).run(&mut stream).await?;
    if let SessionOutcome::Completed { .. } = outcome {
        // Best effort; the peer may already be gone
        let _ = stream.shutdown().await;
    }

    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::GammaDistribution;
    use crate::strategy::Strategy;
    use tokio::io::AsyncReadExt;

    fn session_config() -> SessionConfig {
        SessionConfig {
            strategy: Strategy::Dump,
            delay: Duration::ZERO,
            jitter: GammaDistribution::new("jitter", 0.01, 0.005).unwrap(),
            seed: Some(0),
        }
    }

    #[tokio::test]
    async fn test_serial_server_serves_clients_in_turn() {
        let buffer = Arc::new(LineBuffer::from_lines(["a", "b"]));
        let server = ReplayServer::bind("127.0.0.1:0".parse().unwrap(), session_config(), buffer)
            .await
            .unwrap()
            .with_concurrency(Concurrency::Serial);
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(server.serve());

        for _ in 0..2 {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"POST / HTTP/1.1\r\n\r\n").await.unwrap();

            let mut raw = String::new();
            stream.read_to_string(&mut raw).await.unwrap();
            assert!(raw.ends_with("\r\n\r\na\nb\n"));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_connection_closed_without_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();
        drop(client);

        let outcome = handle_connection(
            stream,
            peer,
            Arc::new(session_config()),
            Arc::new(LineBuffer::default()),
        )
        .await
        .unwrap();
        assert_eq!(outcome, None);
    }
}
