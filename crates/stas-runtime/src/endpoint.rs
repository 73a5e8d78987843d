//! Translation endpoint orchestration.
//!
//! Sequences one translation call end to end: make sure the server is
//! ready, encode the request, hand it to the transport port, decode the
//! response and return the outputs in their original order.

use crate::supervisor::{ReadinessPolicy, ServerConfig, ServerSupervisor, SupervisorError};
use stas_core::codec::{CodecError, PayloadShape, RequestCodec};
use stas_core::filter::{NameSubstitutionRule, RetranslationFilter};
use stas_core::ports::{
    HostContextPort, HttpRequestSpec, ServerLogSinkPort, SettingsProviderPort,
    TranslateTransportPort, TransportError,
};
use stas_core::settings::{EndpointSettings, SettingsError};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// The only language pair the stas server models support.
const SOURCE_LANGUAGE: &str = "ja";
const DESTINATION_LANGUAGE: &str = "en";

/// Delay requested from the host when the short-delay toggle is on.
const SHORT_DELAY_SECONDS: f32 = 0.1;

/// Errors surfaced to translation callers.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The host is configured for a source language other than ja.
    #[error("only ja is supported as source language, got {0:?}")]
    UnsupportedSourceLanguage(String),

    /// The host is configured for a destination language other than en.
    #[error("only en is supported as destination language, got {0:?}")]
    UnsupportedDestinationLanguage(String),

    /// Executable or models path is not configured; the server was never
    /// set up.
    #[error("stas-server executable or models folder is not configured")]
    NotConfigured,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered a batch with the wrong number of translations.
    #[error("batch response length {got} does not match request length {expected}")]
    BatchLengthMismatch { expected: usize, got: usize },
}

/// Orchestrator for translation calls against the supervised server.
pub struct TranslationEndpoint {
    settings: EndpointSettings,
    codec: RequestCodec,
    filter: RetranslationFilter,
    transport: Arc<dyn TranslateTransportPort>,
    /// None when the launch paths are not configured.
    supervisor: Option<ServerSupervisor>,
    url: String,
}

impl TranslationEndpoint {
    /// Initialize the endpoint against the host.
    ///
    /// Verifies the language pair, loads all settings, applies the host
    /// toggles, and sets up the server supervisor when both launch paths
    /// are configured (validating them fail-fast). With either path empty
    /// the endpoint is constructed without a supervisor and logs guidance;
    /// translation calls then fail with [`EndpointError::NotConfigured`].
    pub fn initialize(
        host: &dyn HostContextPort,
        provider: &dyn SettingsProviderPort,
        transport: Arc<dyn TranslateTransportPort>,
        log_sink: Arc<dyn ServerLogSinkPort>,
    ) -> Result<Self, EndpointError> {
        if host.source_language() != SOURCE_LANGUAGE {
            return Err(EndpointError::UnsupportedSourceLanguage(
                host.source_language().to_string(),
            ));
        }
        if host.destination_language() != DESTINATION_LANGUAGE {
            return Err(EndpointError::UnsupportedDestinationLanguage(
                host.destination_language().to_string(),
            ));
        }

        let settings = EndpointSettings::load(provider)?;

        if settings.enable_short_delay {
            host.set_translation_delay(SHORT_DELAY_SECONDS);
        }
        if settings.disable_spam_checks {
            host.disable_spam_checks();
        }

        Self::with_settings(settings, transport, log_sink, ReadinessPolicy::default())
    }

    /// Build the endpoint from already-loaded settings.
    pub fn with_settings(
        settings: EndpointSettings,
        transport: Arc<dyn TranslateTransportPort>,
        log_sink: Arc<dyn ServerLogSinkPort>,
        policy: ReadinessPolicy,
    ) -> Result<Self, EndpointError> {
        let supervisor = if settings.is_configured() {
            let config = ServerConfig::from_settings(&settings);
            let sink = settings.log_server_messages.then_some(log_sink);
            Some(ServerSupervisor::new(config, policy, sink)?)
        } else {
            info!(
                "StasServerExePath or ModelsFolderPath (or both) are not specified; \
                 the translation server will not be started"
            );
            None
        };

        let filter = RetranslationFilter::new(NameSubstitutionRule::new(
            settings.player_jp_name.clone(),
            settings.player_translated_name.clone(),
        ));
        let codec = RequestCodec::new(PayloadShape::from_max_batch_size(settings.max_batch_size));
        let url = settings.endpoint_url();

        Ok(Self {
            settings,
            codec,
            filter,
            transport,
            supervisor,
            url,
        })
    }

    /// Batch ceiling the endpoint was configured with.
    #[must_use]
    pub const fn max_batch_size(&self) -> u32 {
        self.settings.max_batch_size
    }

    /// The supervisor, when the server is configured.
    #[must_use]
    pub const fn supervisor(&self) -> Option<&ServerSupervisor> {
        self.supervisor.as_ref()
    }

    /// Translate the given inputs, preserving order.
    ///
    /// Suspends until the supervised server is ready (or the readiness
    /// policy gives up), then performs one request/response round trip.
    pub async fn translate(&self, inputs: &[String]) -> Result<Vec<String>, EndpointError> {
        let started = Instant::now();

        let supervisor = self.supervisor.as_ref().ok_or(EndpointError::NotConfigured)?;
        supervisor.ensure_ready().await?;

        let filter = self
            .settings
            .prevent_retranslation
            .then_some(&self.filter);
        let body = self.codec.encode(inputs, filter)?;
        let request = HttpRequestSpec::post_json(self.url.clone(), body);

        let raw = self.transport.send(&request).await?;
        let outputs = self.codec.decode(&raw)?;

        // The server must answer index-for-index; a short or long reply is
        // an error, never a silent truncation.
        if self.codec.shape() == PayloadShape::Batch && outputs.len() != inputs.len() {
            return Err(EndpointError::BatchLengthMismatch {
                expected: inputs.len(),
                got: outputs.len(),
            });
        }

        if self.settings.log_server_messages {
            info!(
                elapsed_secs = started.elapsed().as_secs_f64(),
                count = inputs.len(),
                "translate complete"
            );
        }

        Ok(outputs)
    }

    /// Tear the endpoint down: dispose the supervised process, if any.
    pub async fn shutdown(&self) {
        if let Some(supervisor) = &self.supervisor {
            supervisor.dispose().await;
        }
    }
}

impl std::fmt::Debug for TranslationEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationEndpoint")
            .field("url", &self.url)
            .field("shape", &self.codec.shape())
            .field("configured", &self.supervisor.is_some())
            .finish_non_exhaustive()
    }
}
