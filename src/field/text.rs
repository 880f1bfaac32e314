//! Text-valued input fields

use super::{process_field, render_input, Field, FieldBase};
use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use std::any::Any;

/// Single-line text input
pub struct TextField {
    base: BaseControl,
    field: FieldBase,
}

impl TextField {
    /// Create a named text field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
        }
    }

    /// Set the display label (builder style)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.field.set_label(label);
        self
    }

    /// Mark the field required (builder style)
    pub fn with_required(mut self, required: bool) -> Self {
        self.field.set_required(required);
        self
    }

    /// Set the minimum value length (builder style)
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.field.set_min_length(min);
        self
    }

    /// Set the maximum value length (builder style)
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.field.set_max_length(max);
        self
    }
}

impl Control for TextField {
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
        process_field(self, id, ctx)
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        render_input("text", &self.base, &self.field, id, tree, buf);
    }
}

impl Field for TextField {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }
}

/// Password input; binds like a text field but renders masked
pub struct PasswordField {
    base: BaseControl,
    field: FieldBase,
}

impl PasswordField {
    /// Create a named password field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
        }
    }
}

impl Control for PasswordField {
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
        process_field(self, id, ctx)
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        render_input("password", &self.base, &self.field, id, tree, buf);
    }
}

impl Field for PasswordField {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }
}

/// Hidden input carrying request state; never validated
pub struct HiddenField {
    base: BaseControl,
    field: FieldBase,
}

impl HiddenField {
    /// Create a named hidden field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
        }
    }

    /// Create a named hidden field with an initial value
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut field = Self::new(name);
        field.field.set_value(value);
        field
    }
}

impl Control for HiddenField {
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

    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        process_field(self, id, ctx)
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        render_input("hidden", &self.base, &self.field, id, tree, buf);
    }
}

impl Field for HiddenField {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }

    // hidden fields carry state, they are never validated
    fn validate(&mut self, _display: &str, _ctx: &Context) {}
}

/// Multi-line text input
pub struct TextArea {
    base: BaseControl,
    field: FieldBase,
    rows: u32,
    cols: u32,
}

impl TextArea {
    /// Create a named text area with the default 3x20 dimensions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
            rows: 3,
            cols: 20,
        }
    }

    /// Set the visible dimensions
    pub fn set_dimensions(&mut self, rows: u32, cols: u32) {
        self.rows = rows;
        self.cols = cols;
    }
}

impl Control for TextArea {
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
        process_field(self, id, ctx)
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("textarea");
        buf.attr("name", self.base.name());
        buf.attr("id", &tree.html_id(id));
        buf.attr("rows", &self.rows.to_string());
        buf.attr("cols", &self.cols.to_string());
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        if tree.is_disabled(id) {
            buf.flag_attr("disabled");
        }
        if tree.is_readonly(id) {
            buf.flag_attr("readonly");
        }
        buf.close_tag();
        buf.append_escaped(self.field.value());
        buf.elem_end("textarea");
    }
}

impl Field for TextArea {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;

    #[test]
    fn test_text_field_binds_and_validates() {
        let mut tree = ControlTree::new();
        let name = tree.insert(Box::new(
            TextField::new("name").with_required(true).with_min_length(4),
        ));
        let mut ctx = Context::new(Request::post("/save").with_param("name", "ab"));
        assert!(tree.process(name, &mut ctx));
        let field = tree.downcast_ref::<TextField>(name).unwrap();
        assert_eq!(field.field().value(), "ab");
        assert_eq!(
            field.field().error(),
            Some("name must be at least 4 characters")
        );
        assert!(field.value_object().is_none());
    }

    #[test]
    fn test_required_empty_is_soft_failure() {
        let mut tree = ControlTree::new();
        let name = tree.insert(Box::new(
            TextField::new("name").with_label("Name").with_required(true),
        ));
        let mut ctx = Context::new(Request::post("/save"));
        // processing continues despite the validation failure
        assert!(tree.process(name, &mut ctx));
        let field = tree.downcast_ref::<TextField>(name).unwrap();
        assert_eq!(field.field().error(), Some("Name is required"));
        assert!(field.value_object().is_none());
    }

    #[test]
    fn test_disabled_field_ignores_request() {
        let mut tree = ControlTree::new();
        let mut text = TextField::new("name");
        text.field_mut().set_disabled(true);
        let name = tree.insert(Box::new(text));
        let mut ctx = Context::new(Request::post("/save").with_param("name", "Steve"));
        tree.process(name, &mut ctx);
        assert_eq!(
            tree.downcast_ref::<TextField>(name).unwrap().field().value(),
            ""
        );
    }

    #[test]
    fn test_render_escapes_value() {
        let mut tree = ControlTree::new();
        let mut text = TextField::new("comment");
        text.field_mut().set_value("<script>alert('x')</script>");
        let id = tree.insert(Box::new(text));
        let html = tree.to_html(id);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_hidden_field_never_validates() {
        let mut tree = ControlTree::new();
        let mut hidden = HiddenField::new("token");
        hidden.field_mut().set_required(true);
        let id = tree.insert(Box::new(hidden));
        let mut ctx = Context::new(Request::post("/save"));
        tree.process(id, &mut ctx);
        assert!(tree.downcast_ref::<HiddenField>(id).unwrap().field().is_valid());
    }

    #[test]
    fn test_textarea_renders_content() {
        let mut tree = ControlTree::new();
        let mut area = TextArea::new("notes");
        area.set_dimensions(5, 40);
        area.field_mut().set_value("line & line");
        let id = tree.insert(Box::new(area));
        let html = tree.to_html(id);
        assert!(html.contains("rows=\"5\""));
        assert!(html.contains("cols=\"40\""));
        assert!(html.contains("line &amp; line"));
    }
}
