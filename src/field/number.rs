//! Numeric input fields

use super::{process_field, render_input, Field, FieldBase};
use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use crate::service::format_message;
use serde_json::Value;
use std::any::Any;

/// Integer input with optional value bounds.
///
/// Validation order: required, then number format, then minimum value,
/// then maximum value; the first failed check wins.
pub struct IntegerField {
    base: BaseControl,
    field: FieldBase,
    min_value: Option<i64>,
    max_value: Option<i64>,
}

impl IntegerField {
    /// Create a named integer field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            field: FieldBase::new(),
            min_value: None,
            max_value: None,
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

    /// Set the minimum accepted value (builder style)
    pub fn with_min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Set the maximum accepted value (builder style)
    pub fn with_max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// The parsed integer value, if valid and present
    pub fn integer(&self) -> Option<i64> {
        if self.field.is_valid() {
            self.field.value().parse().ok()
        } else {
            None
        }
    }
}

impl Control for IntegerField {
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

impl Field for IntegerField {
    fn field(&self) -> &FieldBase {
        &self.field
    }

    fn field_mut(&mut self) -> &mut FieldBase {
        &mut self.field
    }

    fn value_object(&self) -> Option<Value> {
        self.integer().map(Value::from)
    }

    fn validate(&mut self, display: &str, ctx: &Context) {
        if !self.field.is_valid() {
            return;
        }
        if self.field.value().is_empty() {
            if self.field.is_required() {
                let template = ctx.message("field-required", "{0} is required");
                self.field.set_error(format_message(&template, &[display]));
            }
            return;
        }
        let parsed: i64 = match self.field.value().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                let template = ctx.message("number-format", "{0} must be a valid number");
                self.field.set_error(format_message(&template, &[display]));
                return;
            }
        };
        if let Some(min) = self.min_value {
            if parsed < min {
                let template = ctx.message("number-minvalue", "{0} must not be less than {1}");
                self.field
                    .set_error(format_message(&template, &[display, &min.to_string()]));
                return;
            }
        }
        if let Some(max) = self.max_value {
            if parsed > max {
                let template = ctx.message("number-maxvalue", "{0} must not be greater than {1}");
                self.field
                    .set_error(format_message(&template, &[display, &max.to_string()]));
            }
        }
    }
}
