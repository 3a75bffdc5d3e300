//! Locale-keyed strings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale used when a manifest literal carries no locale
pub const DEFAULT_LOCALE: &str = "en";

/// A string with one translation per locale
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedString(BTreeMap<String, String>);

impl LocalizedString {
    /// A string holding only the default-locale text
    pub fn new(default: impl Into<String>) -> Self {
        Self::with_locale(DEFAULT_LOCALE, default)
    }

    pub fn with_locale(locale: &str, text: impl Into<String>) -> Self {
        let mut m = BTreeMap::new();
        m.insert(locale.to_string(), text.into());
        Self(m)
    }

    /// Literal text for `default_locale`, overridden by every locale the
    /// overlay defines
    pub fn merged(
        literal: Option<&str>,
        default_locale: &str,
        overlay: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut m = BTreeMap::new();
        if let Some(text) = literal {
            m.insert(default_locale.to_string(), text.to_string());
        }
        m.extend(overlay);
        Self(m)
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// The default-locale text
    pub fn string(&self) -> Option<&str> {
        self.get(DEFAULT_LOCALE)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<&str> for LocalizedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_wins_for_its_locales() {
        let s = LocalizedString::merged(
            Some("Marker"),
            DEFAULT_LOCALE,
            vec![
                ("ja".to_string(), "マーカー".to_string()),
                ("en".to_string(), "Pin".to_string()),
            ],
        );
        assert_eq!(s.get("ja"), Some("マーカー"));
        assert_eq!(s.string(), Some("Pin"));
    }

    #[test]
    fn test_literal_fills_default_locale() {
        let s = LocalizedString::merged(Some("Marker"), "en", Vec::new());
        assert_eq!(s, LocalizedString::new("Marker"));
        assert!(LocalizedString::merged(None, "en", Vec::new()).is_empty());
    }
}
