// Localized messages carried by DomainError

use std::collections::BTreeMap;

/// Locale used when the requested one has no message
pub const FALLBACK_LOCALE: &str = "ru";

/// Locale used by `Display` for `DomainError`
pub const DEFAULT_LOCALE: &str = "en";

/// Locale code -> human readable message.
///
/// Always contains the fallback locale: the only constructor takes the
/// Russian message, and `insert` never removes entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedMessages {
    messages: BTreeMap<String, String>,
}

impl LocalizedMessages {
    /// Russian + English pair, the shape every built-in message uses
    pub fn new(ru: impl Into<String>, en: impl Into<String>) -> Self {
        let mut messages = BTreeMap::new();
        messages.insert(FALLBACK_LOCALE.to_string(), ru.into());
        messages.insert(DEFAULT_LOCALE.to_string(), en.into());
        Self { messages }
    }

    /// Add or replace the message for `locale`
    pub fn insert(&mut self, locale: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(locale.into(), message.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, locale: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(locale, message);
        self
    }

    /// Message for `locale`, or the Russian message when absent
    pub fn message_for(&self, locale: &str) -> &str {
        self.messages
            .get(locale)
            .or_else(|| self.messages.get(FALLBACK_LOCALE))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.messages.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_for_known_locale() {
        let messages = LocalizedMessages::new("Запись не найдена", "Record not found");
        assert_eq!(messages.message_for("en"), "Record not found");
        assert_eq!(messages.message_for("ru"), "Запись не найдена");
    }

    #[test]
    fn test_message_for_unknown_locale_falls_back_to_russian() {
        let messages = LocalizedMessages::new("Запись не найдена", "Record not found");
        assert_eq!(messages.message_for("de"), "Запись не найдена");
        assert_eq!(messages.message_for(""), "Запись не найдена");
    }

    #[test]
    fn test_insert_extra_locale() {
        let messages = LocalizedMessages::new("Дедлок", "Deadlock").with("de", "Verklemmung");
        assert_eq!(messages.message_for("de"), "Verklemmung");
        assert!(messages.contains("ru"));
        assert_eq!(messages.locales().collect::<Vec<_>>(), vec!["de", "en", "ru"]);
    }

    #[test]
    fn test_insert_cannot_drop_fallback() {
        let mut messages = LocalizedMessages::new("a", "b");
        messages.insert("ru", "c");
        assert_eq!(messages.message_for("xx"), "c");
    }
}
