//! Settings provider port.

/// Port for typed configuration lookup by `(section, key, default)`.
///
/// Mirrors the host's get-or-create settings semantics: a missing key yields
/// the default (and implementations may persist it).
pub trait SettingsProviderPort: Send + Sync {
    /// Look up a string setting.
    fn get_string(&self, section: &str, key: &str, default: &str) -> String;

    /// Look up a boolean setting.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Look up an unsigned integer setting.
    fn get_u32(&self, section: &str, key: &str, default: u32) -> u32;
}
