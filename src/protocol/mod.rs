//! Protocol dispatch for the two coexisting wire dialects.
//!
//! This module is the core router. Raw lines from any transport pass
//! through one pipeline:
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌─────────────┐   ┌───────────┐
//! │  decode   │──▶│  classify  │──▶│   resolve   │──▶│  validate │
//! │  (JSON)   │   │  (dialect) │   │ (method /   │   │  (schema) │
//! └───────────┘   └────────────┘   │  tool name) │   └─────┬─────┘
//!                                  └─────────────┘         │
//!                       ┌────────────┐   ┌────────────┐    │
//!                       │   encode   │◀──│   invoke   │◀───┘
//!                       │ (same tag) │   │ (handler)  │
//!                       └────────────┘   └────────────┘
//! ```
//!
//! The dialect decided at classify time is captured in a [`ReplyContext`]
//! and reused verbatim at encode time, so a response can never drift into
//! the other dialect.

pub mod dispatcher;
pub mod encoder;
pub mod envelope;

pub use dispatcher::Dispatcher;
pub use envelope::{
    ErrorCode, Inbound, Outbound, ProtocolError, ReplyContext, RequestId, PROTOCOL_VERSION,
    SERVER_NAME,
};
