//! Per-request facade: request, response, session and dispatch state
//!
//! The [`Context`] is constructed once per request by the front controller
//! and threaded through every lifecycle hook. It carries the action scope
//! stack explicitly (no thread-local state), so nested dispatch for
//! forwarded requests is plain data flow.

mod headers;

pub use headers::HeaderMap;

use crate::action::ActionStack;
use crate::service::{InMemoryMessageSource, MessageSource};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

/// Incoming request facade.
///
/// Parameters are multi-valued; `param` returns the first value the way
/// form binding consumes them.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    params: HashMap<String, Vec<String>>,
    attributes: HashMap<String, Value>,
    content_type: Option<String>,
    forward: bool,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            attributes: HashMap::new(),
            content_type: None,
            forward: false,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Add a parameter value (builder style)
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Set the content type (builder style)
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The request method
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Re-target the request, used for internal forwards
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// First value of a parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)?.first().map(String::as_str)
    }

    /// All values of a parameter
    pub fn params(&self, name: &str) -> &[String] {
        self.params.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether a parameter is present at all
    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Add a parameter value in place
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.entry(name.into()).or_default().push(value.into());
    }

    /// Remove every value of a parameter
    pub fn remove_param(&mut self, name: &str) -> bool {
        self.params.remove(name).is_some()
    }

    /// Get a request-scoped attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set a request-scoped attribute
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// The request content type, if declared
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether this request is a forward continuation
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Mark this request as a forward continuation
    pub fn set_forward(&mut self, forward: bool) {
        self.forward = forward;
    }
}

/// Session-scoped attribute storage
#[derive(Debug, Clone, Default)]
pub struct Session {
    attributes: HashMap<String, Value>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a session attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get a session attribute as a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)?.as_str()
    }

    /// Set a session attribute
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Remove a session attribute
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// Iterate all session attributes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Outgoing response
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and body
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Create a 200 HTML response
    pub fn html(body: impl Into<String>) -> Self {
        let mut response = Self::new(200, body.into().into_bytes());
        response
            .headers
            .set("Content-Type", "text/html; charset=UTF-8");
        response
    }

    /// Create a 302 redirect response
    pub fn redirect(location: impl Into<String>) -> Self {
        let mut response = Self::new(302, Vec::new());
        response.headers.set("Location", location.into());
        response
    }

    /// Create a 404 response
    pub fn not_found(path: &str) -> Self {
        Self::new(404, format!("page not found: {}", path).into_bytes())
    }

    /// The status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the response is a redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// The response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace the headers wholesale (page headers moved onto the response)
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    /// The response body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The response body as UTF-8 text, lossy
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Per-request facade handed to every lifecycle hook.
///
/// Owns the request, the session for its duration, the action scope stack,
/// and the localized message source. The effective disabled/readonly flags
/// are maintained by the tree while it walks the controls.
pub struct Context {
    /// The incoming request
    pub request: Request,
    /// Session attributes, swapped in by the controller for the request
    pub session: Session,
    /// Deferred action dispatch scopes
    pub actions: ActionStack,
    messages: Arc<dyn MessageSource>,
    locale: String,
    effective_disabled: bool,
    effective_readonly: bool,
}

impl Context {
    /// Create a context with an empty session and default messages
    pub fn new(request: Request) -> Self {
        Self {
            request,
            session: Session::new(),
            actions: ActionStack::new(),
            messages: Arc::new(InMemoryMessageSource::new()),
            locale: "en".to_string(),
            effective_disabled: false,
            effective_readonly: false,
        }
    }

    /// Swap in an existing session (builder style)
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Use a configured message source (builder style)
    pub fn with_messages(mut self, messages: Arc<dyn MessageSource>) -> Self {
        self.messages = messages;
        self
    }

    /// Use a locale other than the default (builder style)
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Whether the request is an HTTP POST
    pub fn is_post(&self) -> bool {
        self.request.method() == Method::Post
    }

    /// Whether the request is a forward continuation
    pub fn is_forward(&self) -> bool {
        self.request.is_forward()
    }

    /// The request locale tag
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Look up a localized message, falling back to the given default
    pub fn message(&self, key: &str, default: &str) -> String {
        self.messages
            .get_message("trellis", &self.locale, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Whether the control currently processing is disabled, directly or
    /// through an ancestor
    pub fn effective_disabled(&self) -> bool {
        self.effective_disabled
    }

    /// Whether the control currently processing is readonly, directly or
    /// through an ancestor
    pub fn effective_readonly(&self) -> bool {
        self.effective_readonly
    }

    /// Set the effective flags for the control about to process; returns
    /// the previous pair for restoration
    pub(crate) fn set_effective(&mut self, disabled: bool, readonly: bool) -> (bool, bool) {
        let previous = (self.effective_disabled, self.effective_readonly);
        self.effective_disabled = disabled;
        self.effective_readonly = readonly;
        previous
    }

    /// Take the session back out at the end of the request
    pub fn take_session(&mut self) -> Session {
        std::mem::take(&mut self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_params_multi_valued() {
        let request = Request::post("/save")
            .with_param("tag", "a")
            .with_param("tag", "b")
            .with_param("name", "Steve");
        assert_eq!(request.param("tag"), Some("a"));
        assert_eq!(request.params("tag"), &["a", "b"]);
        assert_eq!(request.param("name"), Some("Steve"));
        assert!(request.has_param("tag"));
        assert!(!request.has_param("missing"));
    }

    #[test]
    fn test_session_attributes() {
        let mut session = Session::new();
        session.set("user", json!("steve"));
        assert_eq!(session.get_str("user"), Some("steve"));
        assert_eq!(session.remove("user"), Some(json!("steve")));
        assert!(session.get("user").is_none());
    }

    #[test]
    fn test_response_redirect() {
        let response = Response::redirect("/login.htm");
        assert_eq!(response.status(), 302);
        assert!(response.is_redirect());
        assert_eq!(response.headers().get("Location"), Some("/login.htm"));
    }

    #[test]
    fn test_context_post_and_forward_flags() {
        let ctx = Context::new(Request::post("/save"));
        assert!(ctx.is_post());
        assert!(!ctx.is_forward());

        let mut request = Request::get("/target");
        request.set_forward(true);
        let ctx = Context::new(request);
        assert!(ctx.is_forward());
    }
}
