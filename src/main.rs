//! rust-coach-mcp: MCP server exposing Rust code analysis to AI assistants
//!
//! Speaks newline-delimited JSON over stdio by default, or over TCP with
//! `--tcp <PORT>`. The analysis itself runs in an external analyzer
//! process when one is configured; otherwise local heuristics answer.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use rust_coach_mcp::analysis::history::HistoryStore;
use rust_coach_mcp::bridge::AnalyzerBridge;
use rust_coach_mcp::config;
use rust_coach_mcp::protocol::Dispatcher;
use rust_coach_mcp::tools;
use rust_coach_mcp::transport::{StdioTransport, TcpTransport};

/// MCP server exposing Rust code analysis tools to AI assistants.
///
/// Accepts RPC-shape and legacy-shape JSON messages over stdio or TCP and
/// delegates analysis to an external analyzer process.
#[derive(Parser, Debug)]
#[command(name = "rust-coach-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Listen on a TCP port instead of stdio (overrides the config file)
    #[arg(long, value_name = "PORT")]
    tcp: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr: stdout is the protocol channel.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the rust-coach-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration (missing default config means bare defaults)
    let cfg = match config::load_config_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "rust-coach-mcp {}  Copyright (C) 2026  The rust-coach contributors",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting rust-coach-mcp server"
    );

    match &cfg.analyzer.binary_path {
        Some(path) => info!(analyzer = %path.display(), "External analyzer configured"),
        None => info!("No external analyzer configured; analysis will use local heuristics"),
    }

    // Wire up the registries and the dispatcher
    let bridge = Arc::new(AnalyzerBridge::new(
        cfg.analyzer.binary_path.clone(),
        Duration::from_secs(cfg.analyzer.timeout_secs),
    ));
    let history = Arc::new(HistoryStore::default());
    let tool_registry = Arc::new(tools::build_tool_registry(bridge, history));
    let resource_registry = Arc::new(tools::build_resource_registry());
    let dispatcher = Arc::new(Dispatcher::new(tool_registry, resource_registry));

    // Run the server
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let tcp_port = args.tcp.or(cfg.transport.tcp_port);
    let result = runtime.block_on(async move {
        match tcp_port {
            Some(port) => {
                let addr: SocketAddr = format!("{}:{port}", cfg.transport.bind_address)
                    .parse()
                    .map_err(|e| {
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            format!("invalid bind address: {e}"),
                        )
                    })?;
                TcpTransport::bind(addr).await?.run(dispatcher).await
            }
            None => StdioTransport::run(dispatcher).await,
        }
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
