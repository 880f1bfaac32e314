//! Field grouping with a legend and table layout

use super::render_field_rows;
use crate::control::{BaseControl, ContainerMixin, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use crate::utils::{Result, TrellisError};
use std::any::Any;
use std::collections::HashMap;

/// Grouping container restricted to field children.
///
/// Buttons and nested fieldsets are rejected at add time. The fieldset
/// contributes a nested object to the owning form's state snapshot and its
/// disabled/readonly flags shadow every descendant field.
pub struct FieldSet {
    base: BaseControl,
    children: ContainerMixin,
    legend: Option<String>,
    field_widths: HashMap<String, u32>,
    show_border: bool,
    disabled: bool,
    readonly: bool,
}

impl FieldSet {
    /// Create a named fieldset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            children: ContainerMixin::new(),
            legend: None,
            field_widths: HashMap::new(),
            show_border: true,
            disabled: false,
            readonly: false,
        }
    }

    /// Set the legend text (builder style)
    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = Some(legend.into());
        self
    }

    /// The legend text, if set
    pub fn legend(&self) -> Option<&str> {
        self.legend.as_deref()
    }

    /// Set the table column span for a named field
    pub fn set_field_width(&mut self, name: impl Into<String>, span: u32) {
        self.field_widths.insert(name.into(), span);
    }

    /// Whether the fieldset border is rendered
    pub fn show_border(&self) -> bool {
        self.show_border
    }

    /// Control border rendering
    pub fn set_show_border(&mut self, show: bool) {
        self.show_border = show;
    }

    /// This fieldset's own disabled flag
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable the fieldset; descendants report disabled through the tree
    /// walk without their own flags changing
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// This fieldset's own readonly flag
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Mark the fieldset readonly
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }
}

impl Control for FieldSet {
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

    fn container(&self) -> Option<&ContainerMixin> {
        Some(&self.children)
    }

    fn container_mut(&mut self) -> Option<&mut ContainerMixin> {
        Some(&mut self.children)
    }

    fn own_disabled(&self) -> bool {
        self.disabled
    }

    fn own_readonly(&self) -> bool {
        self.readonly
    }

    fn accepts_child(&self, child: &dyn Control) -> Result<()> {
        if child.is_button() {
            return Err(TrellisError::invalid_argument(
                "a fieldset cannot contain buttons",
            ));
        }
        if child.as_any().downcast_ref::<FieldSet>().is_some() {
            return Err(TrellisError::invalid_argument(
                "a fieldset cannot contain another fieldset",
            ));
        }
        if child.as_field().is_none() {
            return Err(TrellisError::invalid_argument(
                "a fieldset can only contain fields",
            ));
        }
        Ok(())
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("fieldset");
        buf.attr("id", &tree.html_id(id));
        if !self.show_border {
            buf.attr("style", "border:none");
        }
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id", "style"]);
        }
        buf.close_tag();
        buf.newline();
        if let Some(legend) = &self.legend {
            buf.elem_start("legend");
            buf.close_tag();
            buf.append_escaped(legend);
            buf.elem_end("legend");
            buf.newline();
        }
        buf.elem_start("table");
        buf.close_tag();
        buf.newline();
        render_field_rows(tree, self.children.children(), &self.field_widths, buf);
        buf.elem_end("table");
        buf.newline();
        buf.elem_end("fieldset");
    }
}
