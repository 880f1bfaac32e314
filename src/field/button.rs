//! Button and submit controls

use super::{Field, FieldBase};
use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use std::any::Any;

/// Push button; submit buttons trigger the form post.
///
/// A button never binds a value. It marks itself clicked when its name
/// appears in the request parameters and only then queues its deferred
/// listener, so the listener observes every other field's bound value.
pub struct Button {
    base: BaseControl,
    field: FieldBase,
    input_type: &'static str,
    clicked: bool,
}

impl Button {
    /// Create a plain button
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
            input_type: "button",
            clicked: false,
        }
    }

    /// Create a submit button
    pub fn submit(name: impl Into<String>) -> Self {
        let mut button = Self::new(name);
        button.input_type = "submit";
        button
    }

    /// Set the visible label (builder style)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.field.set_label(label);
        self
    }

    /// Attach the deferred click listener (builder style)
    pub fn with_listener(
        mut self,
        listener: impl FnMut(&mut ControlTree, ControlId) -> bool + 'static,
    ) -> Self {
        self.base.set_listener(Box::new(listener));
        self
    }

    /// Whether this button was the one clicked in the current request
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }
}

impl Control for Button {
    fn base(&self) -> &BaseControl {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseControl {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_field(&self) -> Option<&dyn Field> {
        Some(self)
    }

    fn as_field_mut(&mut self) -> Option<&mut dyn Field> {
        Some(self)
    }

    fn is_button(&self) -> bool {
        true
    }

    fn own_disabled(&self) -> bool {
        self.field.is_disabled()
    }

    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        if ctx.effective_disabled() {
            return true;
        }
        self.clicked = ctx.request.has_param(self.base.name());
        if self.clicked {
            if let Some(listener) = self.base.take_listener() {
                ctx.actions.register(id, listener);
            }
        }
        true
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("input");
        buf.attr("type", self.input_type);
        buf.attr("name", self.base.name());
        buf.attr("id", &tree.html_id(id));
        buf.attr(
            "value",
            self.field.label().unwrap_or_else(|| self.base.name()),
        );
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        if tree.is_disabled(id) {
            buf.flag_attr("disabled");
        }
        buf.close_empty();
    }
}

impl Field for Button {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }

    // buttons carry no bound value to validate
    fn validate(&mut self, _display: &str, _ctx: &Context) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;

    #[test]
    fn test_clicked_only_when_param_present() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Box::new(Button::submit("ok")));
        let mut ctx = Context::new(Request::post("/save").with_param("ok", "OK"));
        tree.process(id, &mut ctx);
        assert!(tree.downcast_ref::<Button>(id).unwrap().is_clicked());

        let mut ctx = Context::new(Request::post("/save"));
        tree.process(id, &mut ctx);
        assert!(!tree.downcast_ref::<Button>(id).unwrap().is_clicked());
    }

    #[test]
    fn test_listener_queued_only_on_click() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Box::new(Button::submit("ok").with_listener(|_, _| true)));
        let mut ctx = Context::new(Request::post("/save"));
        tree.process(id, &mut ctx);
        assert_eq!(ctx.actions.pending(), 0);

        let id2 = tree.insert(Box::new(Button::submit("go").with_listener(|_, _| true)));
        let mut ctx = Context::new(Request::post("/save").with_param("go", "Go"));
        tree.process(id2, &mut ctx);
        assert_eq!(ctx.actions.pending(), 1);
    }

    #[test]
    fn test_render_uses_label_as_value() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Box::new(Button::submit("ok").with_label("Save & Close")));
        let html = tree.to_html(id);
        assert!(html.contains(r#"type="submit""#));
        assert!(html.contains("Save &amp; Close"));
    }
}
