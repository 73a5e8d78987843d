//! reqwest implementation of the translate transport port.

use async_trait::async_trait;
use stas_core::ports::{HttpRequestSpec, TranslateTransportPort, TransportError};
use std::time::Duration;

/// Per-request timeout. Batches against a CPU-only model can be slow, so
/// this is deliberately generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TranslateTransportPort for ReqwestTransport {
    async fn send(&self, request: &HttpRequestSpec) -> Result<String, TransportError> {
        let mut builder = self.client.post(&request.url).body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}
