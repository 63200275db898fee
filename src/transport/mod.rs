//! Transports: how raw message frames reach the dispatcher.
//!
//! Two implementations share one contract — newline-delimited JSON frames
//! in, frames out, errors reported without killing the process:
//!
//! - [`stdio::StdioTransport`]: one session over stdin/stdout
//! - [`tcp::TcpTransport`]: one session per TCP connection
//!
//! Both delegate their per-session plumbing to [`crate::session`].

pub mod stdio;
pub mod tcp;

pub use stdio::StdioTransport;
pub use tcp::TcpTransport;
