//! Message-socket transport over TCP.
//!
//! Accepts any number of concurrent connections; each connection is an
//! independent session speaking one JSON value per newline-delimited
//! frame, in either dialect.
//!
//! Send policy: responses go to the originating connection only. Each
//! session owns a private outbound channel, so broadcast is impossible by
//! construction.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpListener;

use crate::protocol::Dispatcher;
use crate::session;

/// The TCP socket transport.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (in use, or needs
    /// elevated permissions).
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(%addr, error = %e, "failed to bind TCP listener");
            e
        })?;
        tracing::info!(%addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// The locally-bound address (useful when binding port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be determined.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until shutdown, one session per connection.
    ///
    /// Accept errors are logged and accepting continues — most are
    /// transient. A failing session never affects its siblings.
    ///
    /// # Errors
    ///
    /// Currently only ends via shutdown signal; the return type leaves room
    /// for fatal listener errors.
    pub async fn run(self, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
        session::with_shutdown(self.accept_loop(dispatcher)).await
    }

    async fn accept_loop(self, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept TCP connection");
                    continue;
                }
            };

            tracing::info!(%peer_addr, "client connected");

            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let (read_half, write_half) = stream.into_split();
                let reader = BufReader::new(read_half);

                match session::run(reader, write_half, dispatcher).await {
                    Ok(()) => tracing::info!(%peer_addr, "client disconnected"),
                    Err(e) => tracing::warn!(%peer_addr, error = %e, "session ended with error"),
                }
            });
        }
    }
}
