//! Stream transport over stdin/stdout.
//!
//! Messages are UTF-8 encoded JSON values, one per line, in either dialect:
//!
//! - stdin: receives requests from the client
//! - stdout: sends responses to the client
//! - stderr: carries logging only, never protocol messages
//!
//! A malformed line yields a parse-error response; it never closes the
//! stream. The session ends when stdin reaches EOF or a shutdown signal
//! arrives.

use std::io;
use std::sync::Arc;

use tokio::io::BufReader;

use crate::protocol::Dispatcher;
use crate::session;

/// The stdio transport.
///
/// There is exactly one session per process: the stream itself.
pub struct StdioTransport;

impl StdioTransport {
    /// Runs the stdio session until EOF or shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin or writing stdout fails fatally.
    pub async fn run(dispatcher: Arc<Dispatcher>) -> io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();

        tracing::info!("stdio transport ready");
        session::with_shutdown(session::run(reader, writer, dispatcher)).await
    }
}
