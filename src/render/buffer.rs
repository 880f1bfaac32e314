//! Shared string buffer for recursive HTML rendering

use std::borrow::Cow;

/// Characters that must never reach markup unescaped
fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'')
}

/// HTML-escape a value for use in element content or attribute values.
///
/// Returns a borrowed string when no escaping is required, which is the
/// common case for field values.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Append-only string buffer with element and attribute helpers.
///
/// Attribute values and element text are escaped on the way in; raw markup
/// produced by the controls themselves goes through [`HtmlBuffer::append`].
#[derive(Debug, Default)]
pub struct HtmlBuffer {
    buf: String,
}

impl HtmlBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer pre-sized from a control's size estimate
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Append raw markup
    pub fn append(&mut self, markup: &str) {
        self.buf.push_str(markup);
    }

    /// Append element text, HTML-escaped
    pub fn append_escaped(&mut self, text: &str) {
        self.buf.push_str(&escape_html(text));
    }

    /// Append the start of an element: `<tag`
    pub fn elem_start(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
    }

    /// Close a start tag: `>`
    pub fn close_tag(&mut self) {
        self.buf.push('>');
    }

    /// Close an empty element: `/>`
    pub fn close_empty(&mut self) {
        self.buf.push_str("/>");
    }

    /// Append an end tag: `</tag>`
    pub fn elem_end(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    /// Append an attribute with an escaped value: ` name="value"`.
    ///
    /// Empty values still render (`value=""` is meaningful for fields).
    pub fn attr(&mut self, name: &str, value: &str) {
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        self.buf.push_str(&escape_html(value));
        self.buf.push('"');
    }

    /// Append a boolean attribute in the `name="name"` form used by
    /// `disabled` and `readonly`
    pub fn flag_attr(&mut self, name: &str) {
        self.attr(name, name);
    }

    /// Append a newline
    pub fn newline(&mut self) {
        self.buf.push('\n');
    }

    /// Current buffer length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been rendered yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the rendered markup
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the buffer into the rendered markup
    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html_passthrough() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_html_special_chars() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_element_helpers() {
        let mut buf = HtmlBuffer::new();
        buf.elem_start("input");
        buf.attr("type", "text");
        buf.attr("value", "<script>");
        buf.close_empty();
        assert_eq!(
            buf.as_str(),
            r#"<input type="text" value="&lt;script&gt;"/>"#
        );
    }

    #[test]
    fn test_flag_attr() {
        let mut buf = HtmlBuffer::new();
        buf.elem_start("input");
        buf.flag_attr("disabled");
        buf.close_empty();
        assert_eq!(buf.as_str(), r#"<input disabled="disabled"/>"#);
    }

    #[test]
    fn test_with_capacity_preallocates() {
        let buf = HtmlBuffer::with_capacity(512);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }
}
