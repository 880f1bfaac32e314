//! String-keyed attribute storage shared by every control
//!
//! Attributes keep their insertion order so rendered markup is stable. The
//! `class` attribute is treated as a space-delimited ordered set and the
//! `style` attribute as a `;`-delimited order-preserving `name:value` map,
//! with dedicated helpers for both.

use crate::render::HtmlBuffer;
use crate::utils::{Result, TrellisError};

/// Name of the CSS class attribute
const CLASS_ATTR: &str = "class";
/// Name of the inline style attribute
const STYLE_ATTR: &str = "style";

/// Ordered string attribute map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    attrs: Vec<(String, String)>,
}

impl AttributeBag {
    /// Create an empty attribute bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the bag holds no attributes
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute value; a `None` value removes the attribute.
    ///
    /// An empty attribute name is an invalid argument.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        if name.is_empty() {
            return Err(TrellisError::invalid_argument("attribute name is empty"));
        }
        match value {
            Some(value) => {
                if let Some(entry) = self.attrs.iter_mut().find(|(n, _)| n == name) {
                    entry.1 = value.to_string();
                } else {
                    self.attrs.push((name.to_string(), value.to_string()));
                }
            }
            None => self.attrs.retain(|(n, _)| n != name),
        }
        Ok(())
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Add a CSS class token to the `class` attribute.
    ///
    /// No-op if the token is empty or already present; matching is per whole
    /// token, never by substring.
    pub fn add_style_class(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match self.get(CLASS_ATTR) {
            Some(existing) => {
                if existing.split_ascii_whitespace().any(|t| t == value) {
                    return;
                }
                let combined = format!("{} {}", existing, value);
                // name is a known constant, never empty
                let _ = self.set(CLASS_ATTR, Some(&combined));
            }
            None => {
                let _ = self.set(CLASS_ATTR, Some(value));
            }
        }
    }

    /// Remove a CSS class token from the `class` attribute.
    ///
    /// Whole-token matching: removing `"foo"` leaves `"foobar"` untouched.
    /// Removing the last token removes the attribute itself.
    pub fn remove_style_class(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let Some(existing) = self.get(CLASS_ATTR) else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_ascii_whitespace()
            .filter(|t| *t != value)
            .collect();
        if remaining.is_empty() {
            let _ = self.set(CLASS_ATTR, None);
        } else {
            let joined = remaining.join(" ");
            let _ = self.set(CLASS_ATTR, Some(&joined));
        }
    }

    /// Get one CSS style value out of the `style` attribute
    pub fn get_style(&self, name: &str) -> Option<String> {
        let styles = self.get(STYLE_ATTR)?;
        for entry in styles.split(';') {
            let mut parts = entry.splitn(2, ':');
            let n = parts.next()?.trim();
            if n == name {
                return parts.next().map(|v| v.trim().to_string());
            }
        }
        None
    }

    /// Set one CSS style inside the `style` attribute, preserving the order
    /// of the other styles. A `None` value removes that style; removing the
    /// last style removes the whole attribute.
    pub fn set_style(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        if name.is_empty() {
            return Err(TrellisError::invalid_argument("style name is empty"));
        }
        let mut entries: Vec<(String, String)> = self
            .get(STYLE_ATTR)
            .map(|styles| {
                styles
                    .split(';')
                    .filter_map(|entry| {
                        let mut parts = entry.splitn(2, ':');
                        let n = parts.next()?.trim();
                        let v = parts.next()?.trim();
                        if n.is_empty() {
                            None
                        } else {
                            Some((n.to_string(), v.to_string()))
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        match value {
            Some(value) => {
                if let Some(entry) = entries.iter_mut().find(|(n, _)| n == name) {
                    entry.1 = value.to_string();
                } else {
                    entries.push((name.to_string(), value.to_string()));
                }
            }
            None => entries.retain(|(n, _)| n != name),
        }

        if entries.is_empty() {
            self.set(STYLE_ATTR, None)
        } else {
            let joined = entries
                .iter()
                .map(|(n, v)| format!("{}:{}", n, v))
                .collect::<Vec<_>>()
                .join(";");
            self.set(STYLE_ATTR, Some(&joined))
        }
    }

    /// Render all attributes into the buffer, skipping the given names
    /// (used when `id` or `name` are rendered explicitly by the control)
    pub fn render_to(&self, buf: &mut HtmlBuffer, skip: &[&str]) {
        for (name, value) in self.iter() {
            if !skip.contains(&name) {
                buf.attr(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut bag = AttributeBag::new();
        bag.set("title", Some("First name")).unwrap();
        assert_eq!(bag.get("title"), Some("First name"));
        assert_eq!(bag.get("missing"), None);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_set_none_removes() {
        let mut bag = AttributeBag::new();
        bag.set("title", Some("x")).unwrap();
        bag.set("title", None).unwrap();
        assert!(bag.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut bag = AttributeBag::new();
        assert!(bag.set("", Some("x")).is_err());
    }

    #[test]
    fn test_add_style_class() {
        let mut bag = AttributeBag::new();
        bag.add_style_class("error");
        bag.add_style_class("hint");
        assert_eq!(bag.get("class"), Some("error hint"));
        // duplicate add is a no-op
        bag.add_style_class("error");
        assert_eq!(bag.get("class"), Some("error hint"));
        // blank add is a no-op
        bag.add_style_class("  ");
        assert_eq!(bag.get("class"), Some("error hint"));
    }

    #[test]
    fn test_remove_style_class_whole_token() {
        let mut bag = AttributeBag::new();
        bag.add_style_class("foobar");
        bag.add_style_class("foo");
        bag.remove_style_class("foo");
        assert_eq!(bag.get("class"), Some("foobar"));
    }

    #[test]
    fn test_remove_last_class_drops_attribute() {
        let mut bag = AttributeBag::new();
        bag.add_style_class("only");
        bag.remove_style_class("only");
        assert_eq!(bag.get("class"), None);
    }

    #[test]
    fn test_set_style_preserves_order() {
        let mut bag = AttributeBag::new();
        bag.set_style("color", Some("red")).unwrap();
        bag.set_style("width", Some("100px")).unwrap();
        bag.set_style("color", Some("blue")).unwrap();
        assert_eq!(bag.get("style"), Some("color:blue;width:100px"));
        assert_eq!(bag.get_style("width").as_deref(), Some("100px"));
    }

    #[test]
    fn test_remove_style() {
        let mut bag = AttributeBag::new();
        bag.set_style("color", Some("red")).unwrap();
        bag.set_style("width", Some("100px")).unwrap();
        bag.set_style("color", None).unwrap();
        assert_eq!(bag.get("style"), Some("width:100px"));
        bag.set_style("width", None).unwrap();
        assert_eq!(bag.get("style"), None);
    }

    #[test]
    fn test_render_to_skips_names() {
        let mut bag = AttributeBag::new();
        bag.set("id", Some("custom")).unwrap();
        bag.set("title", Some("hover")).unwrap();
        let mut buf = HtmlBuffer::new();
        bag.render_to(&mut buf, &["id"]);
        assert_eq!(buf.as_str(), r#" title="hover""#);
    }
}
