//! Front controller: the per-request lifecycle state machine
//!
//! One `handle` call runs init, security check, control processing,
//! deferred action firing, the get/post hook and outcome resolution in that
//! order, with the destroy phase guaranteed to run whatever branch was
//! taken. Outcomes resolve by priority: redirect, then internal forward
//! (re-dispatched under a nested action scope), then template rendering;
//! a page that sets none of the three is a configuration error.

use super::{Page, PageClass, RESERVED_KEYS};
use crate::context::{Context, HeaderMap, Request, Response, Session};
use crate::service::{InMemoryMessageSource, MessageSource, ResourceDeployer, TemplateRenderer};
use crate::utils::{Result, TrellisError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Forward chains longer than this are treated as a routing loop
const MAX_FORWARD_DEPTH: usize = 5;

/// Controller operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generic error responses, no diagnostics leaked
    Production,
    /// Error responses carry the failure detail
    Debug,
}

/// Process-wide controller configuration, built once and read-only after
/// startup
#[derive(Debug, Clone)]
pub struct FrontControllerConfig {
    mode: Mode,
    charset: String,
    error_template: Option<String>,
    auto_deploy: bool,
    default_headers: HashMap<String, String>,
}

impl FrontControllerConfig {
    /// Production defaults: UTF-8, auto-deploy on, no error template
    pub fn new() -> Self {
        Self {
            mode: Mode::Production,
            charset: "UTF-8".to_string(),
            error_template: None,
            auto_deploy: true,
            default_headers: HashMap::new(),
        }
    }

    /// Set the operating mode (builder style)
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the response charset (builder style)
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the error page template path (builder style)
    pub fn with_error_template(mut self, template: impl Into<String>) -> Self {
        self.error_template = Some(template.into());
        self
    }

    /// Control resource auto-deployment at registration time (builder style)
    pub fn with_auto_deploy(mut self, auto_deploy: bool) -> Self {
        self.auto_deploy = auto_deploy;
        self
    }

    /// Add a default response header shared by every page (builder style)
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// The operating mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The response charset
    pub fn charset(&self) -> &str {
        &self.charset
    }
}

impl Default for FrontControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct PageEntry {
    template: String,
    factory: Box<dyn Fn() -> Box<dyn PageClass>>,
}

/// Maps request paths to page classes and drives the request lifecycle
pub struct FrontController {
    config: FrontControllerConfig,
    renderer: Box<dyn TemplateRenderer>,
    deployer: Option<Box<dyn ResourceDeployer>>,
    messages: Arc<dyn MessageSource>,
    pages: HashMap<String, PageEntry>,
    error_page: Option<PageEntry>,
    default_headers: Arc<HashMap<String, String>>,
    session: Session,
}

impl FrontController {
    /// Create a controller over a template renderer
    pub fn new(config: FrontControllerConfig, renderer: Box<dyn TemplateRenderer>) -> Self {
        let default_headers = Arc::new(config.default_headers.clone());
        Self {
            config,
            renderer,
            deployer: None,
            messages: Arc::new(InMemoryMessageSource::new()),
            pages: HashMap::new(),
            error_page: None,
            default_headers,
            session: Session::new(),
        }
    }

    /// Attach a resource deployer (builder style)
    pub fn with_deployer(mut self, deployer: Box<dyn ResourceDeployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    /// Use a configured message source (builder style)
    pub fn with_messages(mut self, messages: Arc<dyn MessageSource>) -> Self {
        self.messages = messages;
        self
    }

    /// Register a page class under a request path.
    ///
    /// When auto-deploy is on and a deployer is attached, the page is
    /// instantiated once here and its controls get their deploy hook.
    pub fn register_page(
        &mut self,
        path: impl Into<String>,
        template: impl Into<String>,
        factory: Box<dyn Fn() -> Box<dyn PageClass>>,
    ) {
        let path = path.into();
        if self.config.auto_deploy {
            if let Some(deployer) = &self.deployer {
                let mut page_class = factory();
                let mut page = Page::new();
                let mut ctx = Context::new(Request::get(path.clone()))
                    .with_messages(Arc::clone(&self.messages));
                match page_class.on_init(&mut page, &mut ctx) {
                    Ok(()) => {
                        for root in page.roots().to_vec() {
                            if let Err(error) = page.tree().deploy(root, deployer.as_ref()) {
                                log::warn!("resource deploy for {:?} failed: {}", path, error);
                            }
                        }
                    }
                    Err(error) => {
                        log::warn!("skipping deploy for {:?}: init failed: {}", path, error)
                    }
                }
            }
        }
        self.pages.insert(
            path,
            PageEntry {
                template: template.into(),
                factory,
            },
        );
    }

    /// Register the page class used to render failed requests.
    ///
    /// The error page runs a reduced cycle: init, render, template. Its
    /// model starts with an `error` entry (detail gated by the operating
    /// mode) and the failing request `path`. When no error page is
    /// registered the configured error template is rendered directly.
    pub fn register_error_page(
        &mut self,
        template: impl Into<String>,
        factory: Box<dyn Fn() -> Box<dyn PageClass>>,
    ) {
        self.error_page = Some(PageEntry {
            template: template.into(),
            factory,
        });
    }

    /// Handle one request end to end.
    ///
    /// The controller's session is swapped into the context for the duration
    /// of the request. An error anywhere in the lifecycle routes once to the
    /// configured error page; a second failure while rendering the error
    /// page is logged and returned wrapped.
    pub fn handle(&mut self, request: Request) -> Result<Response> {
        log::debug!("handling {:?} {}", request.method(), request.path());
        let session = std::mem::take(&mut self.session);
        let mut ctx = Context::new(request)
            .with_session(session)
            .with_messages(Arc::clone(&self.messages));
        ctx.actions.push_scope();
        let outcome = self.dispatch(&mut ctx, 0);
        ctx.actions.pop_scope();
        let outcome = match outcome {
            Ok(response) => Ok(response),
            Err(error) => self.render_error_page(error, &mut ctx),
        };
        self.session = ctx.take_session();
        outcome
    }

    fn dispatch(&self, ctx: &mut Context, depth: usize) -> Result<Response> {
        if depth > MAX_FORWARD_DEPTH {
            return Err(TrellisError::Config(format!(
                "forward chain exceeded {} hops at {:?}",
                MAX_FORWARD_DEPTH,
                ctx.request.path()
            )));
        }
        let path = ctx.request.path().to_string();
        let Some(entry) = self.pages.get(&path) else {
            log::debug!("no page registered for {:?}", path);
            return Ok(Response::not_found(&path));
        };
        let mut page_class = (entry.factory)();
        let mut page = Page::new();
        page.set_template(entry.template.clone());
        page.set_headers(HeaderMap::with_defaults(Arc::clone(&self.default_headers)));

        let outcome = self.run_lifecycle(&mut page, page_class.as_mut(), ctx, depth);
        for root in page.roots().to_vec() {
            page.tree_mut().destroy(root, ctx);
        }
        page_class.on_destroy(&mut page, ctx);
        outcome
    }

    fn run_lifecycle(
        &self,
        page: &mut Page,
        page_class: &mut dyn PageClass,
        ctx: &mut Context,
        depth: usize,
    ) -> Result<Response> {
        page_class.on_init(page, ctx)?;
        page.restore_state(ctx);
        for root in page.roots().to_vec() {
            page.tree_mut().init(root, ctx);
        }

        if page_class.on_security_check(page, ctx)? {
            let mut proceed = true;
            if !ctx.is_forward() {
                for root in page.roots().to_vec() {
                    if !page.tree_mut().process(root, ctx) {
                        proceed = false;
                        break;
                    }
                }
            }
            if proceed {
                proceed = ctx.actions.fire(page.tree_mut());
            }
            if proceed {
                if ctx.is_post() {
                    page_class.on_post(page, ctx)?;
                } else {
                    page_class.on_get(page, ctx)?;
                }
            }
        }

        self.resolve_outcome(page, page_class, ctx, depth)
    }

    fn resolve_outcome(
        &self,
        page: &mut Page,
        page_class: &mut dyn PageClass,
        ctx: &mut Context,
        depth: usize,
    ) -> Result<Response> {
        page.save_state(ctx);

        if let Some(location) = page.redirect().map(str::to_string) {
            let mut response = Response::redirect(location);
            apply_page_headers(page, &mut response);
            return Ok(response);
        }

        if let Some(target) = page.forward().map(str::to_string) {
            log::debug!("forwarding {:?} -> {:?}", ctx.request.path(), target);
            ctx.request.set_path(target);
            ctx.request.set_forward(true);
            ctx.actions.push_scope();
            let response = self.dispatch(ctx, depth + 1);
            ctx.actions.pop_scope();
            return response;
        }

        if let Some(template) = page.template().map(str::to_string) {
            page_class.on_render(page, ctx)?;
            for root in page.roots().to_vec() {
                page.tree_mut().render_pass(root, ctx);
            }
            let model = self.merged_model(page, ctx);
            let bytes = self.renderer.render(&template, &model)?;
            let mut response = Response::new(200, bytes);
            response.headers_mut().set(
                "Content-Type",
                format!("text/html; charset={}", self.config.charset),
            );
            apply_page_headers(page, &mut response);
            return Ok(response);
        }

        Err(TrellisError::Config(format!(
            "page for {:?} resolved no redirect, forward or template",
            ctx.request.path()
        )))
    }

    /// Merge the page model with the rendered root controls and the reserved
    /// keys. Reserved entries always win; a user entry under a reserved name
    /// is overwritten with a warning.
    fn merged_model(&self, page: &Page, ctx: &Context) -> HashMap<String, Value> {
        let mut model = page.model().clone();
        for &root in page.roots() {
            if let Some(name) = page.tree().name(root).filter(|n| !n.is_empty()) {
                model.insert(name.to_string(), Value::String(page.tree().to_html(root)));
            }
        }
        for &key in RESERVED_KEYS {
            if model.contains_key(key) {
                log::warn!("model entry {:?} overwritten by the reserved value", key);
            }
        }
        let session: serde_json::Map<String, Value> = ctx
            .session
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        model.insert(
            "request".to_string(),
            json!({
                "method": format!("{:?}", ctx.request.method()),
                "path": ctx.request.path(),
            }),
        );
        model.insert("response".to_string(), Value::Null);
        model.insert("session".to_string(), Value::Object(session));
        model.insert(
            "context".to_string(),
            json!({
                "locale": ctx.locale(),
                "post": ctx.is_post(),
                "forward": ctx.is_forward(),
            }),
        );
        model.insert("format".to_string(), Value::String(page.format().into()));
        model
    }

    fn render_error_page(&self, error: TrellisError, ctx: &mut Context) -> Result<Response> {
        log::warn!("request {:?} failed: {}", ctx.request.path(), error);
        let detail = match self.config.mode {
            Mode::Debug => error.to_string(),
            Mode::Production => "an internal error occurred".to_string(),
        };

        if let Some(entry) = &self.error_page {
            return match self.run_error_page(entry, &detail, ctx) {
                Ok(response) => Ok(response),
                Err(second) => {
                    log::error!(
                        "error page {:?} failed: {} (while handling: {})",
                        entry.template,
                        second,
                        error
                    );
                    Err(TrellisError::ErrorPage(format!(
                        "{} (while handling: {})",
                        second, error
                    )))
                }
            };
        }

        let Some(template) = self.config.error_template.clone() else {
            return Err(error);
        };
        let mut model = HashMap::new();
        model.insert("error".to_string(), Value::String(detail));
        model.insert(
            "path".to_string(),
            Value::String(ctx.request.path().to_string()),
        );
        match self.renderer.render(&template, &model) {
            Ok(bytes) => {
                let mut response = Response::new(500, bytes);
                response.headers_mut().set(
                    "Content-Type",
                    format!("text/html; charset={}", self.config.charset),
                );
                Ok(response)
            }
            Err(second) => {
                log::error!(
                    "error page {:?} failed: {} (while handling: {})",
                    template,
                    second,
                    error
                );
                Err(TrellisError::ErrorPage(format!(
                    "{} (while handling: {})",
                    second, error
                )))
            }
        }
    }

    fn run_error_page(
        &self,
        entry: &PageEntry,
        detail: &str,
        ctx: &mut Context,
    ) -> Result<Response> {
        let mut page_class = (entry.factory)();
        let mut page = Page::new();
        page.set_template(entry.template.clone());
        page.set_headers(HeaderMap::with_defaults(Arc::clone(&self.default_headers)));
        page.add_model("error", Value::String(detail.to_string()));
        page.add_model("path", Value::String(ctx.request.path().to_string()));

        let outcome = self.error_page_cycle(&mut page, page_class.as_mut(), ctx);
        for root in page.roots().to_vec() {
            page.tree_mut().destroy(root, ctx);
        }
        page_class.on_destroy(&mut page, ctx);
        outcome
    }

    fn error_page_cycle(
        &self,
        page: &mut Page,
        page_class: &mut dyn PageClass,
        ctx: &mut Context,
    ) -> Result<Response> {
        page_class.on_init(page, ctx)?;
        for root in page.roots().to_vec() {
            page.tree_mut().init(root, ctx);
        }
        page_class.on_render(page, ctx)?;
        for root in page.roots().to_vec() {
            page.tree_mut().render_pass(root, ctx);
        }
        let Some(template) = page.template().map(str::to_string) else {
            return Err(TrellisError::Config(
                "error page resolved no template".to_string(),
            ));
        };
        let model = self.merged_model(page, ctx);
        let bytes = self.renderer.render(&template, &model)?;
        let mut response = Response::new(500, bytes);
        response.headers_mut().set(
            "Content-Type",
            format!("text/html; charset={}", self.config.charset),
        );
        apply_page_headers(page, &mut response);
        Ok(response)
    }
}

fn apply_page_headers(page: &Page, response: &mut Response) {
    for (name, value) in page.headers().iter() {
        response.headers_mut().set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Button, Field, TextField};
    use crate::form::Form;
    use crate::service::InMemoryTemplateRenderer;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn renderer(templates: &[(&str, &str)]) -> Box<InMemoryTemplateRenderer> {
        let mut renderer = InMemoryTemplateRenderer::new();
        for (path, body) in templates {
            renderer.add_template(*path, *body);
        }
        Box::new(renderer)
    }

    struct HelloPage;

    impl PageClass for HelloPage {
        fn on_init(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            page.add_model("title", json!("Hello"));
            Ok(())
        }
    }

    #[test]
    fn test_get_renders_template_with_model() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("hello.htm", "<h1>$title</h1>")]),
        );
        controller.register_page("/hello.htm", "hello.htm", Box::new(|| Box::new(HelloPage)));

        let response = controller.handle(Request::get("/hello.htm")).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body_str(), "<h1>Hello</h1>");
        assert_eq!(
            response.headers().get("Content-Type"),
            Some("text/html; charset=UTF-8")
        );
    }

    #[test]
    fn test_unknown_path_is_404() {
        let mut controller =
            FrontController::new(FrontControllerConfig::new(), renderer(&[]));
        let response = controller.handle(Request::get("/missing.htm")).unwrap();
        assert_eq!(response.status(), 404);
    }

    struct GuardedPage {
        got: Rc<RefCell<bool>>,
    }

    impl PageClass for GuardedPage {
        fn on_init(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            page.add_model("title", json!("secret"));
            Ok(())
        }

        fn on_security_check(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<bool> {
            page.set_redirect("/login.htm");
            Ok(false)
        }

        fn on_get(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
            *self.got.borrow_mut() = true;
            Ok(())
        }
    }

    #[test]
    fn test_security_check_false_skips_get_but_resolves_outcome() {
        let got = Rc::new(RefCell::new(false));
        let got_handle = got.clone();
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("secret.htm", "$title")]),
        );
        controller.register_page(
            "/secret.htm",
            "secret.htm",
            Box::new(move || {
                Box::new(GuardedPage {
                    got: got_handle.clone(),
                })
            }),
        );

        let response = controller.handle(Request::get("/secret.htm")).unwrap();
        assert!(response.is_redirect());
        assert_eq!(response.headers().get("Location"), Some("/login.htm"));
        assert!(!*got.borrow());
    }

    struct BouncePage;

    impl PageClass for BouncePage {
        fn on_get(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            page.set_forward("/hello.htm");
            // redirect-less forward: the forward target produces the body
            Ok(())
        }
    }

    #[test]
    fn test_forward_re_dispatches_to_target_page() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("hello.htm", "<h1>$title</h1>"), ("bounce.htm", "never")]),
        );
        controller.register_page("/hello.htm", "hello.htm", Box::new(|| Box::new(HelloPage)));
        controller.register_page("/bounce.htm", "bounce.htm", Box::new(|| Box::new(BouncePage)));

        let response = controller.handle(Request::get("/bounce.htm")).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body_str(), "<h1>Hello</h1>");
    }

    struct LoopPage;

    impl PageClass for LoopPage {
        fn on_get(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            page.set_forward("/loop.htm");
            Ok(())
        }
    }

    #[test]
    fn test_forward_loop_is_a_config_error() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("loop.htm", "never")]),
        );
        controller.register_page("/loop.htm", "loop.htm", Box::new(|| Box::new(LoopPage)));
        let err = controller.handle(Request::get("/loop.htm")).unwrap_err();
        assert!(matches!(err, TrellisError::Config(_)));
    }

    struct OrderPage {
        saved: Rc<RefCell<Option<String>>>,
    }

    impl PageClass for OrderPage {
        fn on_init(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            let form = page.add_control(Box::new(Form::new("order")));
            let item = page.tree_mut().insert(Box::new(TextField::new("item")));
            let saved = self.saved.clone();
            let save = page.tree_mut().insert(Box::new(
                Button::submit("save").with_listener(move |tree, _| {
                    let value = tree
                        .downcast_ref::<TextField>(item)
                        .map(|f| f.field().value().to_string());
                    *saved.borrow_mut() = value;
                    true
                }),
            ));
            page.tree_mut().add(form, item)?;
            page.tree_mut().add(form, save)?;
            Ok(())
        }
    }

    #[test]
    fn test_post_fires_deferred_action_after_binding() {
        let saved = Rc::new(RefCell::new(None));
        let saved_handle = saved.clone();
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("order.htm", "$order")]),
        );
        controller.register_page(
            "/order.htm",
            "order.htm",
            Box::new(move || {
                Box::new(OrderPage {
                    saved: saved_handle.clone(),
                })
            }),
        );

        let response = controller
            .handle(
                Request::post("/order.htm")
                    .with_param("item", "widget")
                    .with_param("save", "Save"),
            )
            .unwrap();
        assert_eq!(response.status(), 200);
        // the listener observed the value bound during processing
        assert_eq!(saved.borrow().as_deref(), Some("widget"));
        assert!(response.body_str().contains(r#"name="item""#));
    }

    struct FailingPage;

    impl PageClass for FailingPage {
        fn on_get(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
            Err(TrellisError::Page("boom".to_string()))
        }
    }

    #[test]
    fn test_error_routes_to_error_page() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new()
                .with_mode(Mode::Debug)
                .with_error_template("error.htm"),
            renderer(&[("fail.htm", "never"), ("error.htm", "failed: $error")]),
        );
        controller.register_page("/fail.htm", "fail.htm", Box::new(|| Box::new(FailingPage)));

        let response = controller.handle(Request::get("/fail.htm")).unwrap();
        assert_eq!(response.status(), 500);
        assert!(response.body_str().contains("boom"));
    }

    #[test]
    fn test_error_page_double_failure_is_wrapped() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new().with_error_template("missing-error.htm"),
            renderer(&[("fail.htm", "never")]),
        );
        controller.register_page("/fail.htm", "fail.htm", Box::new(|| Box::new(FailingPage)));

        let err = controller.handle(Request::get("/fail.htm")).unwrap_err();
        assert!(matches!(err, TrellisError::ErrorPage(_)));
    }

    struct SupportErrorPage;

    impl PageClass for SupportErrorPage {
        fn on_init(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
            page.add_model("support", json!("help@example.com"));
            Ok(())
        }
    }

    #[test]
    fn test_registered_error_page_runs_its_own_cycle() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new().with_mode(Mode::Debug),
            renderer(&[("fail.htm", "never"), ("error.htm", "$error / $support")]),
        );
        controller.register_page("/fail.htm", "fail.htm", Box::new(|| Box::new(FailingPage)));
        controller.register_error_page("error.htm", Box::new(|| Box::new(SupportErrorPage)));

        let response = controller.handle(Request::get("/fail.htm")).unwrap();
        assert_eq!(response.status(), 500);
        // the failure detail and the error page's own model both render
        assert!(response.body_str().contains("boom"));
        assert!(response.body_str().contains("help@example.com"));
    }

    struct TearDownPage {
        fail: bool,
        destroyed: Rc<RefCell<bool>>,
    }

    impl PageClass for TearDownPage {
        fn on_get(&mut self, _page: &mut Page, _ctx: &mut Context) -> Result<()> {
            if self.fail {
                Err(TrellisError::Page("boom".to_string()))
            } else {
                Ok(())
            }
        }

        fn on_destroy(&mut self, _page: &mut Page, _ctx: &mut Context) {
            *self.destroyed.borrow_mut() = true;
        }
    }

    fn teardown_controller(fail: bool, destroyed: &Rc<RefCell<bool>>) -> FrontController {
        let destroyed = destroyed.clone();
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("down.htm", "ok")]),
        );
        controller.register_page(
            "/down.htm",
            "down.htm",
            Box::new(move || {
                Box::new(TearDownPage {
                    fail,
                    destroyed: destroyed.clone(),
                })
            }),
        );
        controller
    }

    #[test]
    fn test_destroy_runs_after_lifecycle_error() {
        let destroyed = Rc::new(RefCell::new(false));
        let mut controller = teardown_controller(true, &destroyed);

        let err = controller.handle(Request::get("/down.htm")).unwrap_err();
        assert!(matches!(err, TrellisError::Page(_)));
        assert!(*destroyed.borrow());
    }

    #[test]
    fn test_destroy_runs_on_the_normal_branch() {
        let destroyed = Rc::new(RefCell::new(false));
        let mut controller = teardown_controller(false, &destroyed);

        let response = controller.handle(Request::get("/down.htm")).unwrap();
        assert_eq!(response.status(), 200);
        assert!(*destroyed.borrow());
    }

    #[test]
    fn test_default_headers_flow_onto_response() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new().with_default_header("Cache-Control", "no-cache"),
            renderer(&[("hello.htm", "$title")]),
        );
        controller.register_page("/hello.htm", "hello.htm", Box::new(|| Box::new(HelloPage)));
        let response = controller.handle(Request::get("/hello.htm")).unwrap();
        assert_eq!(response.headers().get("Cache-Control"), Some("no-cache"));
    }

    struct CounterPage;

    impl PageClass for CounterPage {
        fn on_get(&mut self, page: &mut Page, ctx: &mut Context) -> Result<()> {
            let count = ctx
                .session
                .get("count")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            ctx.session.set("count", json!(count + 1));
            page.add_model("count", json!(count + 1));
            Ok(())
        }
    }

    #[test]
    fn test_session_persists_across_requests() {
        let mut controller = FrontController::new(
            FrontControllerConfig::new(),
            renderer(&[("count.htm", "$count")]),
        );
        controller.register_page("/count.htm", "count.htm", Box::new(|| Box::new(CounterPage)));

        let first = controller.handle(Request::get("/count.htm")).unwrap();
        let second = controller.handle(Request::get("/count.htm")).unwrap();
        assert_eq!(first.body_str(), "1");
        assert_eq!(second.body_str(), "2");
    }
}
