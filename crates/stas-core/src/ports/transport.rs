//! Translate transport port.
//!
//! The core builds a full request description but never sends it; the
//! transport adapter owns the HTTP client.

use async_trait::async_trait;
use thiserror::Error;

/// A fully-described HTTP request, ready for a transport to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSpec {
    /// HTTP method. Always POST for translation requests.
    pub method: &'static str,
    /// Target URL.
    pub url: String,
    /// Request headers as (name, value) pairs.
    pub headers: Vec<(&'static str, &'static str)>,
    /// Request body.
    pub body: String,
}

impl HttpRequestSpec {
    /// Build a JSON POST request with the headers the stas server expects.
    #[must_use]
    pub fn post_json(url: String, body: String) -> Self {
        Self {
            method: "POST",
            url,
            headers: vec![("Content-Type", "application/json"), ("Accept", "*/*")],
            body,
        }
    }
}

/// Errors a transport implementation can surface.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be performed at all.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP status {status}")]
    Status { status: u16 },
}

/// Port for dispatching a translation request and returning the raw body.
#[async_trait]
pub trait TranslateTransportPort: Send + Sync {
    /// Send the request and return the raw response body.
    async fn send(&self, request: &HttpRequestSpec) -> Result<String, TransportError>;
}
