//! Port traits for external collaborators.
//!
//! Each port is a narrow seam the endpoint consumes: configuration lookup,
//! the HTTP transport, the server log sink and the host translation context.
//! Adapters (CLI, plugin host) provide the implementations.

mod host;
mod log_sink;
mod settings;
mod transport;

pub use host::HostContextPort;
pub use log_sink::ServerLogSinkPort;
pub use settings::SettingsProviderPort;
pub use transport::{HttpRequestSpec, TranslateTransportPort, TransportError};
