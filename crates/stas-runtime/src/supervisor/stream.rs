//! Async stream log readers (non-UTF8-safe).
//!
//! The stas server is Python tooling that can emit non-UTF8 bytes on
//! stdout/stderr. `BufReader::lines()` would kill the reader task on
//! invalid UTF-8, so lines are read as bytes and decoded lossily. Each
//! line is scanned for the readiness marker and optionally forwarded to
//! the log sink.

use super::state::ServerState;
use stas_core::ports::ServerLogSinkPort;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info};

/// Substring in server output signaling it accepts requests.
pub const READY_MARKER: &str = "| INFO | Server | Listening on";

pub(crate) fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    stream_type: &'static str,
    generation: u64,
    state: Arc<Mutex<ServerState>>,
    sink: Option<Arc<dyn ServerLogSinkPort>>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    // Trim trailing newline(s)
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).to_string();

                    if line.contains(READY_MARKER) {
                        let became_ready = {
                            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
                            guard.mark_ready(generation)
                        };
                        if became_ready {
                            info!("stas-server is up and ready to accept requests");
                        }
                    }

                    if let Some(ref s) = sink {
                        s.append(stream_type, line);
                    }
                }
                Err(e) => {
                    debug!(%stream_type, error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(%stream_type, "log stream reader task exiting");
    });
}
