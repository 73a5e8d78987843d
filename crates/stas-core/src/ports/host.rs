//! Host translation-context port.

/// Port onto the translation host's initialization context.
///
/// Exposes the configured language pair and the two behavior toggles the
/// endpoint may apply during initialization.
pub trait HostContextPort: Send + Sync {
    /// Source language code the host is translating from (e.g. "ja").
    fn source_language(&self) -> &str;

    /// Destination language code the host is translating to (e.g. "en").
    fn destination_language(&self) -> &str;

    /// Request a fixed delay between translation calls.
    fn set_translation_delay(&self, seconds: f32);

    /// Ask the host to skip its spam heuristics for this endpoint.
    fn disable_spam_checks(&self);
}
