//! Tracing-backed server log sink.

use stas_core::ports::ServerLogSinkPort;
use tracing::info;

/// Forwards captured server output lines into the tracing pipeline.
pub struct TracingLogSink;

impl ServerLogSinkPort for TracingLogSink {
    fn append(&self, stream_type: &str, line: String) {
        info!(target: "stas_server", %stream_type, "{line}");
    }
}
