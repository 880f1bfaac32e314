//! Copy-on-write response header map
//!
//! Pages start from a header map shared process-wide (the controller's
//! configured defaults). An explicit `edited` state guards a lazy clone on
//! the first write, so unmodified pages never copy the defaults.

use std::collections::HashMap;
use std::sync::Arc;

/// String header map that clones its shared defaults on first write
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    defaults: Arc<HashMap<String, String>>,
    edited: Option<HashMap<String, String>>,
}

impl HeaderMap {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a header map backed by shared defaults
    pub fn with_defaults(defaults: Arc<HashMap<String, String>>) -> Self {
        Self {
            defaults,
            edited: None,
        }
    }

    /// Whether the first write has happened yet
    pub fn is_edited(&self) -> bool {
        self.edited.is_some()
    }

    /// Get a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        let map = self.edited.as_ref().unwrap_or(&self.defaults);
        map.get(name).map(String::as_str)
    }

    /// Set a header, cloning the shared defaults on the first write
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let map = self
            .edited
            .get_or_insert_with(|| self.defaults.as_ref().clone());
        map.insert(name.into(), value.into());
    }

    /// Remove a header, cloning the shared defaults on the first write
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let map = self
            .edited
            .get_or_insert_with(|| self.defaults.as_ref().clone());
        map.remove(name)
    }

    /// Iterate the effective headers
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let map = self.edited.as_ref().unwrap_or(&self.defaults);
        map.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of effective headers
    pub fn len(&self) -> usize {
        self.edited.as_ref().unwrap_or(&self.defaults).len()
    }

    /// Whether no headers are present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Arc<HashMap<String, String>> {
        let mut map = HashMap::new();
        map.insert("Cache-Control".to_string(), "no-cache".to_string());
        Arc::new(map)
    }

    #[test]
    fn test_reads_do_not_clone() {
        let shared = defaults();
        let headers = HeaderMap::with_defaults(shared.clone());
        assert_eq!(headers.get("Cache-Control"), Some("no-cache"));
        assert!(!headers.is_edited());
        assert_eq!(Arc::strong_count(&shared), 2);
    }

    #[test]
    fn test_first_write_clones_once() {
        let headers_shared = defaults();
        let mut headers = HeaderMap::with_defaults(headers_shared.clone());
        headers.set("Pragma", "no-cache");
        assert!(headers.is_edited());
        assert_eq!(headers.get("Pragma"), Some("no-cache"));
        assert_eq!(headers.get("Cache-Control"), Some("no-cache"));
        // the shared defaults were not mutated
        assert_eq!(headers_shared.get("Pragma"), None);
    }

    #[test]
    fn test_remove_from_defaults() {
        let mut headers = HeaderMap::with_defaults(defaults());
        assert_eq!(headers.remove("Cache-Control").as_deref(), Some("no-cache"));
        assert_eq!(headers.get("Cache-Control"), None);
    }
}
