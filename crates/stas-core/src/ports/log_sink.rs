//! Server log sink port.

/// Port for forwarding captured server output lines to a log destination.
///
/// Implementations should be thread-safe and non-blocking where possible;
/// the stream readers call this from their own tasks.
pub trait ServerLogSinkPort: Send + Sync {
    /// Append one captured output line.
    ///
    /// # Arguments
    ///
    /// * `stream_type` - Either "stdout" or "stderr"
    /// * `line` - The line content without its trailing newline
    fn append(&self, stream_type: &str, line: String);
}
