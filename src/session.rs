//! Session wiring: one transport connection plus the shared dispatcher.
//!
//! A session owns two halves joined by a channel:
//!
//! - a **reader loop** that takes newline-delimited JSON frames off the
//!   connection and spawns one dispatch task per frame, and
//! - a **writer task** that owns the write half and serialises outbound
//!   frames onto it, one per line.
//!
//! Because every dispatch runs on its own task and funnels its response
//! through the channel, slow invocations never block fast ones and
//! responses may leave in any order — clients correlate by id, not by
//! arrival order. The writer task ends once the reader loop has finished
//! and every in-flight dispatch has dropped its sender, which drains all
//! pending responses before the session closes.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::protocol::Dispatcher;

/// Outbound channel depth per session. Dispatch tasks briefly back-pressure
/// on a slow peer once this many responses are queued.
const OUTBOUND_BUFFER: usize = 64;

/// Runs one session until the peer disconnects.
///
/// Transport-level read errors end the session (the underlying resource is
/// gone); malformed message content does not — it produces a parse-error
/// response and the session keeps going.
///
/// # Errors
///
/// Returns an error if reading from the connection fails.
pub async fn run<R, W>(mut reader: R, writer: W, dispatcher: Arc<Dispatcher>) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
    let writer_task = tokio::spawn(write_frames(writer, rx));

    let result = read_loop(&mut reader, &tx, &dispatcher).await;

    // Dropping our sender lets the writer finish once every in-flight
    // dispatch task has sent its response and dropped its own clone.
    drop(tx);
    let _ = writer_task.await;

    result
}

async fn read_loop<R>(
    reader: &mut R,
    tx: &mpsc::Sender<String>,
    dispatcher: &Arc<Dispatcher>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            // EOF - peer closed the connection
            return Ok(());
        }

        let frame = line.trim();
        if frame.is_empty() {
            continue;
        }

        let raw = frame.to_string();
        let dispatcher = Arc::clone(dispatcher);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = dispatcher.dispatch_line(&raw).await;
            match response.to_line() {
                Ok(encoded) => {
                    // A closed channel means the session is gone; the
                    // response has nowhere to go.
                    let _ = tx.send(encoded).await;
                }
                Err(e) => tracing::error!(error = %e, "failed to serialise response"),
            }
        });
    }
}

async fn write_frames<W>(mut writer: W, mut rx: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        debug_assert!(
            !frame.contains('\n'),
            "frames must not contain embedded newlines"
        );
        if let Err(e) = write_frame(&mut writer, &frame).await {
            tracing::warn!(error = %e, "failed to write response frame");
            return;
        }
    }
}

async fn write_frame<W>(writer: &mut W, frame: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Runs a session (or accept loop) until it finishes or a shutdown signal
/// arrives.
///
/// # Errors
///
/// Propagates the inner future's error; signal installation failures are
/// mapped to `io::Error`.
#[cfg(unix)]
pub async fn with_shutdown<F>(fut: F) -> io::Result<()>
where
    F: std::future::Future<Output = io::Result<()>>,
{
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

    tokio::select! {
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
            Ok(())
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
            Ok(())
        }
        result = fut => result,
    }
}

/// Runs a session (or accept loop) until it finishes or Ctrl+C arrives.
///
/// # Errors
///
/// Propagates the inner future's error.
#[cfg(windows)]
pub async fn with_shutdown<F>(fut: F) -> io::Result<()>
where
    F: std::future::Future<Output = io::Result<()>>,
{
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = &mut ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            Ok(())
        }
        result = fut => result,
    }
}
