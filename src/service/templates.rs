//! Template rendering seam
//!
//! The core hands the renderer a template path and the merged model map and
//! receives bytes back. The in-memory implementation performs plain `$key`
//! substitution, which is all the tests and the demo binary need; a real
//! deployment plugs in an actual templating engine behind the same trait.

use crate::utils::{Result, TrellisError};
use serde_json::Value;
use std::collections::HashMap;

/// Renders a template against a string-keyed model map
pub trait TemplateRenderer: Send + Sync {
    /// Render the template at `path` with the given model
    fn render(&self, path: &str, model: &HashMap<String, Value>) -> Result<Vec<u8>>;
}

/// Renderer backed by an in-memory template map with `$key` substitution.
///
/// Unknown `$key` references are left verbatim in the output. String model
/// values substitute unquoted; other values substitute in their JSON form.
#[derive(Debug, Default)]
pub struct InMemoryTemplateRenderer {
    templates: HashMap<String, String>,
}

impl InMemoryTemplateRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a path
    pub fn add_template(&mut self, path: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(path.into(), body.into());
    }

    fn display(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl TemplateRenderer for InMemoryTemplateRenderer {
    fn render(&self, path: &str, model: &HashMap<String, Value>) -> Result<Vec<u8>> {
        let template = self.templates.get(path).ok_or_else(|| TrellisError::Template {
            path: path.to_string(),
            message: "template not found".to_string(),
        })?;

        let mut output = String::with_capacity(template.len() + 64);
        let mut rest = template.as_str();
        while let Some(pos) = rest.find('$') {
            output.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let end = after
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(after.len());
            let key = &after[..end];
            match model.get(key) {
                Some(value) if !key.is_empty() => {
                    output.push_str(&Self::display(value));
                }
                _ => {
                    output.push('$');
                    output.push_str(key);
                }
            }
            rest = &after[end..];
        }
        output.push_str(rest);
        Ok(output.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_substitution() {
        let mut renderer = InMemoryTemplateRenderer::new();
        renderer.add_template("home.htm", "<h1>$title</h1><p>count: $count</p>");
        let mut model = HashMap::new();
        model.insert("title".to_string(), json!("Home"));
        model.insert("count".to_string(), json!(3));
        let bytes = renderer.render("home.htm", &model).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "<h1>Home</h1><p>count: 3</p>"
        );
    }

    #[test]
    fn test_unknown_key_left_verbatim() {
        let mut renderer = InMemoryTemplateRenderer::new();
        renderer.add_template("t.htm", "hello $nobody!");
        let bytes = renderer.render("t.htm", &HashMap::new()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "hello $nobody!");
    }

    #[test]
    fn test_missing_template_is_error() {
        let renderer = InMemoryTemplateRenderer::new();
        let err = renderer.render("missing.htm", &HashMap::new()).unwrap_err();
        assert!(matches!(err, TrellisError::Template { .. }));
    }
}
