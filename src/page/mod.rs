//! Page state, behavior trait and the submit-check token
//!
//! A page owns a fresh control tree for the duration of one request plus the
//! model handed to the template renderer and the outcome fields (redirect,
//! forward or template path) the lifecycle driver resolves in priority
//! order. Page behavior lives in a [`PageClass`] implementation registered
//! with the front controller; state and behavior are split so the driver can
//! hand both to the hooks without aliasing.

pub mod driver;

pub use driver::{FrontController, FrontControllerConfig, Mode};

use crate::context::{Context, HeaderMap};
use crate::control::{Control, ControlId, ControlTree};
use crate::field::HiddenField;
use crate::form::Form;
use crate::utils::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;

/// Model keys the driver injects at render time; user entries under these
/// names are overwritten with a warning
pub const RESERVED_KEYS: &[&str] = &["request", "response", "session", "context", "format"];

const SUBMIT_CHECK_PREFIX: &str = "SUBMIT_CHECK_";
const STATE_PREFIX: &str = "page_state_";

/// Per-request page state: control tree, model and outcome
pub struct Page {
    tree: ControlTree,
    roots: Vec<ControlId>,
    model: HashMap<String, Value>,
    headers: HeaderMap,
    template: Option<String>,
    redirect: Option<String>,
    forward: Option<String>,
    format: String,
    stateful: bool,
}

impl Page {
    /// Create an empty page with no template path set
    pub fn new() -> Self {
        Self {
            tree: ControlTree::new(),
            roots: Vec::new(),
            model: HashMap::new(),
            headers: HeaderMap::new(),
            template: None,
            redirect: None,
            forward: None,
            format: "html".to_string(),
            stateful: false,
        }
    }

    /// The page's control tree
    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    /// Mutable access to the control tree
    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    /// Add a top-level control. Page roots process in addition order and can
    /// never be re-parented into another container.
    pub fn add_control(&mut self, control: Box<dyn Control>) -> ControlId {
        let id = self.tree.insert(control);
        self.tree.mark_page_root(id);
        self.roots.push(id);
        id
    }

    /// The top-level control ids, in addition order
    pub fn roots(&self) -> &[ControlId] {
        &self.roots
    }

    /// Find a top-level control by name
    pub fn root_by_name(&self, name: &str) -> Option<ControlId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.tree.name(id) == Some(name))
    }

    /// Add a model entry for the template. Reserved keys are accepted but
    /// the driver overwrites them at render time, so a warning is logged.
    pub fn add_model(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            log::warn!(
                "model key {:?} is reserved and will be overwritten at render time",
                key
            );
        }
        self.model.insert(key, value);
    }

    /// The template model entries added so far
    pub fn model(&self) -> &HashMap<String, Value> {
        &self.model
    }

    /// The response headers for this page
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace the headers wholesale, used to seed the shared defaults
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    /// The template path, if set
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Set the template path to render
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    /// The redirect target, if set
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Request an HTTP redirect; wins over forward and template rendering
    pub fn set_redirect(&mut self, location: impl Into<String>) {
        self.redirect = Some(location.into());
    }

    /// The internal forward target, if set
    pub fn forward(&self) -> Option<&str> {
        self.forward.as_deref()
    }

    /// Request an internal forward to another page path
    pub fn set_forward(&mut self, path: impl Into<String>) {
        self.forward = Some(path.into());
    }

    /// The response format tag exposed to templates
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Set the response format tag
    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    /// Whether form state persists in the session between requests
    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    /// Make the page stateful
    pub fn set_stateful(&mut self, stateful: bool) {
        self.stateful = stateful;
    }

    /// One-time submit token check for a form on this page.
    ///
    /// The first call installs a hidden token field on the form and stores
    /// the expected value in the session. Later POST submissions must echo
    /// the token: a match consumes it and issues a fresh one, a mismatch or
    /// a stripped token marks the submission stale and redirects to
    /// `invalid_path`. Non-POST requests never fail the check; a fresh GET
    /// of the page simply receives a new token. That leniency tolerates
    /// bookmarked GETs of a posting path but also means a replay is only
    /// caught on POSTs.
    pub fn on_submit_check(
        &mut self,
        ctx: &mut Context,
        form: ControlId,
        invalid_path: &str,
    ) -> bool {
        let Some(form_name) = self.tree.name(form).map(str::to_string) else {
            return true;
        };
        let key = format!("{}{}_{}", SUBMIT_CHECK_PREFIX, form_name, ctx.request.path());

        let Some(hidden) = self.tree.child_by_name(form, &key) else {
            let hidden = self.tree.insert(Box::new(HiddenField::new(&key)));
            if let Err(error) = self.tree.add(form, hidden) {
                log::warn!("could not install submit-check field: {}", error);
                return true;
            }
            self.issue_token(ctx, hidden, &key);
            return true;
        };

        if !ctx.is_post() {
            self.issue_token(ctx, hidden, &key);
            return true;
        }
        let expected = ctx.session.get_str(&key).map(str::to_string);
        let submitted = ctx.request.param(&key).map(str::to_string);
        match (expected, submitted) {
            (Some(expected), Some(submitted)) if expected == submitted => {
                self.issue_token(ctx, hidden, &key);
                true
            }
            _ => {
                log::debug!("stale submit detected for form {:?}", form_name);
                self.set_redirect(invalid_path);
                false
            }
        }
    }

    fn issue_token(&mut self, ctx: &mut Context, hidden: ControlId, key: &str) {
        let bytes: [u8; 16] = rand::rng().random();
        let token = URL_SAFE_NO_PAD.encode(bytes);
        if let Some(field) = self.tree.get_mut(hidden).and_then(Control::as_field_mut) {
            field.field_mut().set_value(token.clone());
        }
        ctx.session.set(key, Value::String(token));
    }

    /// Park every root form's state in the session (stateful pages only)
    pub fn save_state(&self, ctx: &mut Context) {
        if !self.stateful {
            return;
        }
        for &root in &self.roots {
            if self.tree.downcast_ref::<Form>(root).is_some() {
                if let Some(name) = self.tree.name(root) {
                    let key = format!("{}{}", STATE_PREFIX, name);
                    ctx.session.set(key, self.tree.form_state(root));
                }
            }
        }
    }

    /// Restore root form state saved by an earlier request
    pub fn restore_state(&mut self, ctx: &Context) {
        if !self.stateful {
            return;
        }
        for root in self.roots.clone() {
            let Some(name) = self.tree.name(root).map(str::to_string) else {
                continue;
            };
            if let Some(state) = ctx.session.get(&format!("{}{}", STATE_PREFIX, name)) {
                let state = state.clone();
                self.tree.restore_form_state(root, &state);
            }
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// Page behavior hooks invoked by the lifecycle driver.
///
/// The driver instantiates one value per request from the registered
/// factory, so implementations may carry per-request scratch state.
pub trait PageClass {
    /// Build the page's controls and initial model
    fn on_init(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Authorization gate. `false` skips control processing, action firing
    /// and the get/post hooks; the outcome fields still resolve.
    fn on_security_check(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<bool> {
        Ok(true)
    }

    /// GET handler, run after controls processed and actions fired
    fn on_get(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// POST handler, run after controls processed and actions fired
    fn on_post(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Last hook before template rendering
    fn on_render(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Always runs at the end of the request, whatever the outcome
    fn on_destroy(&mut self, _page: &mut Page, _ctx: &mut Context) {}
}
