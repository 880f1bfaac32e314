//! Value-bearing controls: request binding and validation
//!
//! A field binds the raw request parameter matching its name, trims it by
//! default, and validates it in a fixed order: required first, then the
//! minimum constraint, then the maximum. The first failed constraint sets
//! the field error and later checks never overwrite it. Validation failure
//! is soft: the field is marked invalid and its typed value stays unset,
//! but processing of sibling controls continues.

mod button;
mod checkbox;
mod number;
mod select;
mod text;

pub use button::Button;
pub use checkbox::Checkbox;
pub use number::IntegerField;
pub use select::{Select, SelectOption};
pub use text::{HiddenField, PasswordField, TextArea, TextField};

use crate::context::Context;
use crate::control::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use crate::service::format_message;
use serde_json::Value;

/// Shared field state: the bound value, constraints and the validation
/// error for the current cycle
#[derive(Debug, Clone)]
pub struct FieldBase {
    value: String,
    label: Option<String>,
    required: bool,
    disabled: bool,
    readonly: bool,
    trim: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    error: Option<String>,
}

impl FieldBase {
    /// Create empty field state; trimming defaults to on
    pub fn new() -> Self {
        Self {
            value: String::new(),
            label: None,
            required: false,
            disabled: false,
            readonly: false,
            trim: true,
            min_length: None,
            max_length: None,
            error: None,
        }
    }

    /// The bound string value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the string value directly
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// The display label, if set
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set the display label used in rendering and error messages
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Whether a value must be supplied
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Mark the field required
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// This field's own disabled flag, ignoring ancestors
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Set the field's own disabled flag
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// This field's own readonly flag, ignoring ancestors
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Set the field's own readonly flag
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Whether the bound value is trimmed before storing
    pub fn is_trim(&self) -> bool {
        self.trim
    }

    /// Control value trimming
    pub fn set_trim(&mut self, trim: bool) {
        self.trim = trim;
    }

    /// Minimum accepted value length in characters
    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    /// Set the minimum accepted value length
    pub fn set_min_length(&mut self, min: usize) {
        self.min_length = Some(min);
    }

    /// Maximum accepted value length in characters
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Set the maximum accepted value length
    pub fn set_max_length(&mut self, max: usize) {
        self.max_length = Some(max);
    }

    /// The validation error recorded this cycle, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether no validation error is recorded
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Record a validation error unless one is already set; the first
    /// failed constraint wins
    pub fn set_error(&mut self, error: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    /// Clear the validation error
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Bind the raw request parameter into the value, clearing any error
    /// from the previous cycle
    pub fn bind_request_value(&mut self, name: &str, ctx: &Context) {
        let raw = ctx.request.param(name).unwrap_or("");
        self.value = if self.trim {
            raw.trim().to_string()
        } else {
            raw.to_string()
        };
        self.error = None;
    }

    /// Run the required / min-length / max-length checks in order
    pub fn validate_length(&mut self, display: &str, ctx: &Context) {
        if !self.is_valid() {
            return;
        }
        if self.value.is_empty() {
            if self.required {
                let template = ctx.message("field-required", "{0} is required");
                self.set_error(format_message(&template, &[display]));
            }
            return;
        }
        let chars = self.value.chars().count();
        if let Some(min) = self.min_length {
            if chars < min {
                let template =
                    ctx.message("field-minlength", "{0} must be at least {1} characters");
                self.set_error(format_message(&template, &[display, &min.to_string()]));
                return;
            }
        }
        if let Some(max) = self.max_length {
            if chars > max {
                let template =
                    ctx.message("field-maxlength", "{0} must be no longer than {1} characters");
                self.set_error(format_message(&template, &[display, &max.to_string()]));
            }
        }
    }
}

impl Default for FieldBase {
    fn default() -> Self {
        Self::new()
    }
}

/// The field capability layered over [`Control`].
///
/// `value_object` is the typed view of the bound string value; it stays
/// `None` while the field is invalid or empty.
pub trait Field: Control {
    /// Shared field state
    fn field(&self) -> &FieldBase;

    /// Mutable shared field state
    fn field_mut(&mut self) -> &mut FieldBase;

    /// The typed value derived from the bound string, if valid and present
    fn value_object(&self) -> Option<Value> {
        let fb = self.field();
        if fb.is_valid() && !fb.value().is_empty() {
            Some(Value::String(fb.value().to_string()))
        } else {
            None
        }
    }

    /// Set the value from a typed object
    fn set_value_object(&mut self, value: &Value) {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        self.field_mut().set_value(text);
    }

    /// Type-specific validation; the default applies the length constraints
    fn validate(&mut self, display: &str, ctx: &Context) {
        self.field_mut().validate_length(display, ctx);
    }
}

/// The display name used in a field's error messages: the label when set,
/// else the field name
pub(crate) fn display_name(field: &dyn Field) -> String {
    field
        .field()
        .label()
        .map(str::to_string)
        .unwrap_or_else(|| field.base().name().to_string())
}

/// Shared process step for leaf fields: bind, validate, queue the listener.
///
/// Binding and validation only happen on POST requests; a plain GET of the
/// page renders the field's current value without marking required fields
/// invalid. Disabled fields (directly or through an ancestor) ignore
/// submitted values entirely. Always returns `true`: a validation failure
/// never stops sibling processing.
pub(crate) fn process_field<F: Field>(
    field: &mut F,
    id: ControlId,
    ctx: &mut Context,
) -> bool {
    if ctx.effective_disabled() {
        return true;
    }
    if ctx.is_post() {
        let name = field.base().name().to_string();
        field.field_mut().bind_request_value(&name, ctx);
        let display = display_name(field);
        field.validate(&display, ctx);
    }
    if let Some(listener) = field.base_mut().take_listener() {
        ctx.actions.register(id, listener);
    }
    true
}

/// Render a standard `<input>` element with the shared attribute set
pub(crate) fn render_input(
    input_type: &str,
    base: &BaseControl,
    fb: &FieldBase,
    id: ControlId,
    tree: &ControlTree,
    buf: &mut HtmlBuffer,
) {
    buf.elem_start("input");
    buf.attr("type", input_type);
    buf.attr("name", base.name());
    buf.attr("id", &tree.html_id(id));
    buf.attr("value", fb.value());
    if let Some(max) = fb.max_length() {
        buf.attr("maxlength", &max.to_string());
    }
    if let Some(attrs) = base.attributes() {
        attrs.render_to(buf, &["id"]);
    }
    if tree.is_disabled(id) {
        buf.flag_attr("disabled");
    }
    if tree.is_readonly(id) {
        buf.flag_attr("readonly");
    }
    buf.close_empty();
}
