//! Localized message lookup

use std::collections::HashMap;

/// Message bundle lookup keyed by base name, locale and message key
pub trait MessageSource: Send + Sync {
    /// Look up a message; `None` when the bundle or key is absent
    fn get_message(&self, base_name: &str, locale: &str, key: &str) -> Option<String>;
}

/// Message source backed by in-memory bundles.
///
/// An empty source is valid: callers fall back to their built-in English
/// defaults when lookup returns `None`.
#[derive(Debug, Default)]
pub struct InMemoryMessageSource {
    bundles: HashMap<(String, String), HashMap<String, String>>,
}

impl InMemoryMessageSource {
    /// Create an empty message source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one message to a bundle
    pub fn add_message(
        &mut self,
        base_name: impl Into<String>,
        locale: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.bundles
            .entry((base_name.into(), locale.into()))
            .or_default()
            .insert(key.into(), message.into());
    }
}

impl MessageSource for InMemoryMessageSource {
    fn get_message(&self, base_name: &str, locale: &str, key: &str) -> Option<String> {
        self.bundles
            .get(&(base_name.to_string(), locale.to_string()))?
            .get(key)
            .cloned()
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template
pub(crate) fn format_message(template: &str, args: &[&str]) -> String {
    let mut message = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{}}}", i), arg);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit_and_miss() {
        let mut source = InMemoryMessageSource::new();
        source.add_message("trellis", "de", "field-required", "{0} ist erforderlich");
        assert_eq!(
            source.get_message("trellis", "de", "field-required").as_deref(),
            Some("{0} ist erforderlich")
        );
        assert!(source.get_message("trellis", "en", "field-required").is_none());
        assert!(source.get_message("other", "de", "field-required").is_none());
    }

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("{0} must be at least {1} characters", &["Name", "4"]),
            "Name must be at least 4 characters"
        );
    }
}
