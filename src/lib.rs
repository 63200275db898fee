//! rust-coach-mcp: MCP server exposing Rust code analysis to AI assistants
//!
//! The server accepts JSON messages in two envelope dialects — an RPC-shape
//! (`{"version":"2.0","id":...,"method":...}`) and a legacy shape
//! (`{"type":...,"data":...}`) — over two transports (newline-delimited
//! stdio and TCP), routes them through one dispatcher, and delegates the
//! heavy analysis to an external analyzer process, one short-lived process
//! per request.
//!
//! # Architecture
//!
//! - Transports feed raw frames into per-session channels
//! - The [`protocol::Dispatcher`] classifies the dialect once, resolves the
//!   method or tool, validates params, and encodes the response in the
//!   dialect of the request
//! - Tool handlers delegate to the [`bridge::AnalyzerBridge`], which
//!   normalises every subprocess failure into a degraded-but-valid report
//!
//! # Modules
//!
//! - [`analysis`] — diagnostic/report types, heuristic checks, history
//! - [`bridge`] — external analyzer process bridge
//! - [`config`] — configuration loading and validation
//! - [`error`] — error types
//! - [`protocol`] — envelope dialects and the dispatcher
//! - [`session`] — per-connection reader/writer wiring
//! - [`tools`] — tool/resource registries and the built-in catalog
//! - [`transport`] — stdio and TCP transports

pub mod analysis;
pub mod bridge;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
