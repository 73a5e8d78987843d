//! Endpoint settings surface and validation.
//!
//! Settings are read through the [`SettingsProviderPort`] seam so the same
//! loading code works against a host configuration store or a local file.
//! All keys live under one section and carry the defaults the original
//! endpoint shipped with.

use crate::ports::SettingsProviderPort;
use thiserror::Error;

/// Configuration section all endpoint settings live under.
pub const SETTINGS_SECTION: &str = "StasServer";

/// Default port the stas server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 14367;

/// Default batch ceiling per translation request.
pub const DEFAULT_MAX_BATCH_SIZE: u32 = 10;

/// Typed endpoint settings, loaded once at initialization and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    /// Path to the stas-server executable. Empty means not configured.
    pub exe_path: String,
    /// Path to the models folder handed to the server. Empty means not configured.
    pub models_path: String,
    /// Pass `--no-cache` to the server.
    pub disable_cache: bool,
    /// Filter already-translated text out of requests.
    pub prevent_retranslation: bool,
    /// Source-language player name to substitute before the script check.
    pub player_jp_name: String,
    /// Replacement for the player name.
    pub player_translated_name: String,
    /// Port the server is started on and requests are sent to.
    pub server_port: u16,
    /// Pass `--cuda` to the server.
    pub enable_cuda: bool,
    /// Batch ceiling; a value of 1 selects the single wire shape.
    pub max_batch_size: u32,
    /// Ask the host for a short (0.1s) translation delay.
    pub enable_short_delay: bool,
    /// Ask the host to disable its spam checks.
    pub disable_spam_checks: bool,
    /// Forward captured server output lines to the log sink.
    pub log_server_messages: bool,
}

impl EndpointSettings {
    /// Load all settings from a provider, applying defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidPort`] if the configured port does not
    /// parse as a TCP port, or [`SettingsError::InvalidBatchSize`] for a zero
    /// batch ceiling.
    pub fn load(provider: &dyn SettingsProviderPort) -> Result<Self, SettingsError> {
        let port_raw = provider.get_string(
            SETTINGS_SECTION,
            "ServerPort",
            &DEFAULT_SERVER_PORT.to_string(),
        );
        let server_port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| SettingsError::InvalidPort(port_raw))?;

        let max_batch_size =
            provider.get_u32(SETTINGS_SECTION, "MaxBatchSize", DEFAULT_MAX_BATCH_SIZE);
        if max_batch_size == 0 {
            return Err(SettingsError::InvalidBatchSize(max_batch_size));
        }

        Ok(Self {
            exe_path: provider.get_string(SETTINGS_SECTION, "StasServerExePath", ""),
            models_path: provider.get_string(SETTINGS_SECTION, "ModelsFolderPath", ""),
            disable_cache: provider.get_bool(SETTINGS_SECTION, "DisableCache", false),
            prevent_retranslation: provider.get_bool(
                SETTINGS_SECTION,
                "EnablePreventRetranslation",
                false,
            ),
            player_jp_name: provider.get_string(SETTINGS_SECTION, "PlayerJPName", "プレーヤー"),
            player_translated_name: provider.get_string(
                SETTINGS_SECTION,
                "PlayerTranslatedName",
                "Player",
            ),
            server_port,
            enable_cuda: provider.get_bool(SETTINGS_SECTION, "EnableCuda", false),
            max_batch_size,
            enable_short_delay: provider.get_bool(SETTINGS_SECTION, "EnableShortDelay", false),
            disable_spam_checks: provider.get_bool(SETTINGS_SECTION, "DisableSpamChecks", true),
            log_server_messages: provider.get_bool(SETTINGS_SECTION, "LogServerMessages", false),
        })
    }

    /// Whether both launch paths are set. When false the server is never
    /// started and translation calls are rejected up front.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.exe_path.is_empty() && !self.models_path.is_empty()
    }

    /// URL translation requests are posted to.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.server_port)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    #[error("ServerPort is not a valid TCP port: {0:?}")]
    InvalidPort(String),

    #[error("MaxBatchSize must be at least 1, got {0}")]
    InvalidBatchSize(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Provider backed by a flat `key -> value` map (section is fixed).
    struct MapProvider(HashMap<&'static str, String>);

    impl MapProvider {
        fn new(entries: &[(&'static str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (*k, (*v).to_string()))
                    .collect(),
            )
        }
    }

    impl SettingsProviderPort for MapProvider {
        fn get_string(&self, _section: &str, key: &str, default: &str) -> String {
            self.0.get(key).cloned().unwrap_or_else(|| default.to_string())
        }

        fn get_bool(&self, _section: &str, key: &str, default: bool) -> bool {
            self.0
                .get(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_u32(&self, _section: &str, key: &str, default: u32) -> u32 {
            self.0
                .get(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    #[test]
    fn test_defaults() {
        let settings = EndpointSettings::load(&MapProvider::new(&[])).unwrap();
        assert_eq!(settings.exe_path, "");
        assert_eq!(settings.models_path, "");
        assert!(!settings.disable_cache);
        assert!(!settings.prevent_retranslation);
        assert_eq!(settings.player_jp_name, "プレーヤー");
        assert_eq!(settings.player_translated_name, "Player");
        assert_eq!(settings.server_port, DEFAULT_SERVER_PORT);
        assert!(!settings.enable_cuda);
        assert_eq!(settings.max_batch_size, DEFAULT_MAX_BATCH_SIZE);
        assert!(!settings.enable_short_delay);
        assert!(settings.disable_spam_checks);
        assert!(!settings.log_server_messages);
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_configured_when_both_paths_set() {
        let settings = EndpointSettings::load(&MapProvider::new(&[
            ("StasServerExePath", "/opt/stas/stas-server"),
            ("ModelsFolderPath", "/opt/stas/models"),
        ]))
        .unwrap();
        assert!(settings.is_configured());
    }

    #[test]
    fn test_one_path_is_not_configured() {
        let settings = EndpointSettings::load(&MapProvider::new(&[(
            "StasServerExePath",
            "/opt/stas/stas-server",
        )]))
        .unwrap();
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = EndpointSettings::load(&MapProvider::new(&[("ServerPort", "not-a-port")]));
        assert!(matches!(result, Err(SettingsError::InvalidPort(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = EndpointSettings::load(&MapProvider::new(&[("MaxBatchSize", "0")]));
        assert!(matches!(result, Err(SettingsError::InvalidBatchSize(0))));
    }

    #[test]
    fn test_endpoint_url() {
        let settings = EndpointSettings::load(&MapProvider::new(&[("ServerPort", "9100")])).unwrap();
        assert_eq!(settings.endpoint_url(), "http://127.0.0.1:9100/");
    }
}
