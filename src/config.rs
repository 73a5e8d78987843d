//! JSON settings file provider.
//!
//! Implements the `(section, key, default)` lookup the endpoint expects on
//! top of a small JSON file shaped as `{ "StasServer": { "key": value } }`.
//! A missing file yields pure defaults so `stas-bridge doctor` can explain
//! what to configure.

use anyhow::{Context, Result};
use serde_json::Value;
use stas_core::ports::SettingsProviderPort;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

pub struct JsonSettingsProvider {
    sections: HashMap<String, serde_json::Map<String, Value>>,
}

impl JsonSettingsProvider {
    /// Load settings from a JSON file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self {
                sections: HashMap::new(),
            });
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let root: Value = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;

        let mut sections = HashMap::new();
        if let Value::Object(map) = root {
            for (name, section) in map {
                if let Value::Object(entries) = section {
                    sections.insert(name, entries);
                }
            }
        }

        Ok(Self { sections })
    }

    fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }
}

impl SettingsProviderPort for JsonSettingsProvider {
    fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        match self.get(section, key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => default.to_string(),
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get(section, key) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    fn get_u32(&self, section: &str, key: &str, default: u32) -> u32 {
        self.get(section, key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stas_core::EndpointSettings;

    #[test]
    fn test_missing_file_yields_defaults() {
        let provider = JsonSettingsProvider::load(Path::new("/no/such/file.json")).unwrap();
        let settings = EndpointSettings::load(&provider).unwrap();
        assert_eq!(settings.server_port, 14367);
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_section_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stas-bridge.json");
        fs::write(
            &path,
            r#"{
                "StasServer": {
                    "StasServerExePath": "/opt/stas/stas-server",
                    "ModelsFolderPath": "/opt/stas/models",
                    "MaxBatchSize": 25,
                    "EnableCuda": true,
                    "ServerPort": "9100"
                }
            }"#,
        )
        .unwrap();

        let provider = JsonSettingsProvider::load(&path).unwrap();
        let settings = EndpointSettings::load(&provider).unwrap();
        assert!(settings.is_configured());
        assert_eq!(settings.max_batch_size, 25);
        assert!(settings.enable_cuda);
        assert_eq!(settings.server_port, 9100);
        // Untouched keys keep their defaults.
        assert!(settings.disable_spam_checks);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        assert!(JsonSettingsProvider::load(&path).is_err());
    }
}
