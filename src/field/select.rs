//! Drop-down select field

use super::{process_field, Field, FieldBase};
use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use std::any::Any;

/// One `<option>` entry of a [`Select`]
#[derive(Debug, Clone)]
pub struct SelectOption {
    /// The submitted value
    pub value: String,
    /// The visible label
    pub label: String,
}

impl SelectOption {
    /// Create an option
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Single-select drop-down
pub struct Select {
    base: BaseControl,
    field: FieldBase,
    options: Vec<SelectOption>,
}

impl Select {
    /// Create a named select
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
            options: Vec::new(),
        }
    }

    /// Add an option
    pub fn add_option(&mut self, value: impl Into<String>, label: impl Into<String>) {
        self.options.push(SelectOption::new(value, label));
    }

    /// The registered options
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }
}

impl Control for Select {
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

    fn estimated_size(&self) -> usize {
        64 + self.base.attribute_count() * 24 + self.options.len() * 48
    }

    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        process_field(self, id, ctx)
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("select");
        buf.attr("name", self.base.name());
        buf.attr("id", &tree.html_id(id));
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        if tree.is_disabled(id) {
            buf.flag_attr("disabled");
        }
        buf.close_tag();
        for option in &self.options {
            buf.elem_start("option");
            buf.attr("value", &option.value);
            if option.value == self.field.value() {
                buf.flag_attr("selected");
            }
            buf.close_tag();
            buf.append_escaped(&option.label);
            buf.elem_end("option");
        }
        buf.elem_end("select");
    }
}

impl Field for Select {
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

    fn states_select() -> Select {
        let mut select = Select::new("state");
        select.add_option("NSW", "New South Wales");
        select.add_option("VIC", "Victoria");
        select
    }

    #[test]
    fn test_binds_selected_value() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Box::new(states_select()));
        let mut ctx = Context::new(Request::post("/save").with_param("state", "VIC"));
        tree.process(id, &mut ctx);
        assert_eq!(
            tree.downcast_ref::<Select>(id).unwrap().field().value(),
            "VIC"
        );
    }

    #[test]
    fn test_render_marks_selection() {
        let mut tree = ControlTree::new();
        let mut select = states_select();
        select.field_mut().set_value("NSW");
        let id = tree.insert(Box::new(select));
        let html = tree.to_html(id);
        assert!(html.contains(r#"<option value="NSW" selected="selected">"#));
        assert!(!html.contains(r#"<option value="VIC" selected"#));
    }

    #[test]
    fn test_required_empty_selection() {
        let mut tree = ControlTree::new();
        let mut select = states_select();
        select.field_mut().set_required(true);
        let id = tree.insert(Box::new(select));
        let mut ctx = Context::new(Request::post("/save"));
        tree.process(id, &mut ctx);
        assert_eq!(
            tree.downcast_ref::<Select>(id).unwrap().field().error(),
            Some("state is required")
        );
    }
}
