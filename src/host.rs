//! CLI stand-in for the host translation context.
//!
//! The CLI always translates ja -> en and has no batching framework, so
//! the delay and spam-check toggles are acknowledged in the log and
//! otherwise ignored.

use stas_core::ports::HostContextPort;
use tracing::debug;

pub struct CliHostContext {
    source: &'static str,
    destination: &'static str,
}

impl Default for CliHostContext {
    fn default() -> Self {
        Self {
            source: "ja",
            destination: "en",
        }
    }
}

impl HostContextPort for CliHostContext {
    fn source_language(&self) -> &str {
        self.source
    }

    fn destination_language(&self) -> &str {
        self.destination
    }

    fn set_translation_delay(&self, seconds: f32) {
        debug!(seconds, "translation delay requested (no-op in CLI)");
    }

    fn disable_spam_checks(&self) {
        debug!("spam checks disabled (no-op in CLI)");
    }
}
