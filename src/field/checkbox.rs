//! Checkbox field

use super::{Field, FieldBase};
use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use crate::service::format_message;
use serde_json::Value;
use std::any::Any;

/// Checkbox bound by parameter presence: a submitted parameter means
/// checked, an absent one means unchecked.
pub struct Checkbox {
    base: BaseControl,
    field: FieldBase,
}

impl Checkbox {
    /// Create a named checkbox
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
        }
    }

    /// Whether the checkbox is checked
    pub fn is_checked(&self) -> bool {
        self.field.value() == "true"
    }

    /// Set the checked state
    pub fn set_checked(&mut self, checked: bool) {
        self.field.set_value(if checked { "true" } else { "" });
    }
}

impl Control for Checkbox {
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

    fn own_disabled(&self) -> bool {
        self.field.is_disabled()
    }

    fn own_readonly(&self) -> bool {
        self.field.is_readonly()
    }

    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        if ctx.effective_disabled() {
            return true;
        }
        if ctx.is_post() {
            self.field.clear_error();
            self.set_checked(ctx.request.has_param(self.base.name()));
            if self.field.is_required() && !self.is_checked() {
                let display = self
                    .field
                    .label()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.base.name().to_string());
                let template = ctx.message("checkbox-required", "{0} must be checked");
                self.field.set_error(format_message(&template, &[&display]));
            }
        }
        if let Some(listener) = self.base.take_listener() {
            ctx.actions.register(id, listener);
        }
        true
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("input");
        buf.attr("type", "checkbox");
        buf.attr("name", self.base.name());
        buf.attr("id", &tree.html_id(id));
        buf.attr("value", "true");
        if self.is_checked() {
            buf.flag_attr("checked");
        }
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        if tree.is_disabled(id) {
            buf.flag_attr("disabled");
        }
        buf.close_empty();
    }
}

impl Field for Checkbox {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }

    fn value_object(&self) -> Option<Value> {
        Some(Value::Bool(self.is_checked()))
    }

    fn set_value_object(&mut self, value: &Value) {
        match value {
            Value::Bool(checked) => self.set_checked(*checked),
            Value::String(s) => self.set_checked(s == "true"),
            _ => self.set_checked(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;

    #[test]
    fn test_param_presence_means_checked() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Box::new(Checkbox::new("agree")));
        let mut ctx = Context::new(Request::post("/save").with_param("agree", "true"));
        tree.process(id, &mut ctx);
        assert!(tree.downcast_ref::<Checkbox>(id).unwrap().is_checked());

        let mut ctx = Context::new(Request::post("/save"));
        tree.process(id, &mut ctx);
        assert!(!tree.downcast_ref::<Checkbox>(id).unwrap().is_checked());
    }

    #[test]
    fn test_required_unchecked_sets_error() {
        let mut tree = ControlTree::new();
        let mut checkbox = Checkbox::new("agree");
        checkbox.field_mut().set_required(true);
        let id = tree.insert(Box::new(checkbox));
        let mut ctx = Context::new(Request::post("/save"));
        assert!(tree.process(id, &mut ctx));
        assert_eq!(
            tree.downcast_ref::<Checkbox>(id).unwrap().field().error(),
            Some("agree must be checked")
        );
    }

    #[test]
    fn test_render_checked_state() {
        let mut tree = ControlTree::new();
        let mut checkbox = Checkbox::new("agree");
        checkbox.set_checked(true);
        let id = tree.insert(Box::new(checkbox));
        assert!(tree.to_html(id).contains("checked=\"checked\""));
    }
}
