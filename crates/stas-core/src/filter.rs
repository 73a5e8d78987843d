//! Retranslation suppression filter.
//!
//! Detects text that is still in the source script so already-translated
//! strings are not sent back to the server. Detection is purely lexical:
//! a string counts as untranslated if, after substituting the configured
//! player name, it still contains at least one Japanese-script character.

use regex::Regex;
use std::sync::OnceLock;

/// Character classes treated as Japanese script: CJK Unified Ideographs,
/// CJK Symbols and Punctuation, Hiragana and Katakana.
const JAPANESE_SCRIPT_PATTERN: &str =
    "[\u{3000}-\u{303F}\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{4E00}-\u{9FFF}]";

fn japanese_script() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(JAPANESE_SCRIPT_PATTERN).expect("static pattern is valid"))
}

/// A (source-name, replacement-name) substitution applied before the
/// script check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSubstitutionRule {
    /// Name as it appears in source-language text.
    pub source: String,
    /// Translated counterpart.
    pub replacement: String,
}

impl NameSubstitutionRule {
    pub fn new(source: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            replacement: replacement.into(),
        }
    }
}

/// Pure text filter deciding whether a string still needs translation.
#[derive(Debug, Clone)]
pub struct RetranslationFilter {
    rule: NameSubstitutionRule,
}

impl RetranslationFilter {
    #[must_use]
    pub fn new(rule: NameSubstitutionRule) -> Self {
        Self { rule }
    }

    fn substitute(&self, text: &str) -> String {
        text.replace(&self.rule.source, &self.rule.replacement)
    }

    /// True if the text still contains source-script characters after the
    /// name substitution.
    #[must_use]
    pub fn looks_untranslated(&self, text: &str) -> bool {
        japanese_script().is_match(&self.substitute(text))
    }

    /// Returns the substituted text when it is presumed already translated,
    /// or the original text untouched when it still needs translation.
    ///
    /// The asymmetry is deliberate: substitution is only applied on the
    /// pass-through path, so text that goes to the server arrives exactly
    /// as the caller supplied it.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let substituted = self.substitute(text);
        if japanese_script().is_match(&substituted) {
            text.to_string()
        } else {
            substituted
        }
    }
}
