//! Form aggregation: cached field views, state snapshots and value mapping
//!
//! A form is a container whose derived views (`field_list`, `button_list`,
//! the flattened `fields` map) are cached and recomputed only when the child
//! structure changes; repeated reads return the identical `Rc`. Form state
//! exports to a `serde_json::Value` object, nested one level per fieldset,
//! so stateful pages can park bound values in the session between requests.

mod fieldset;

pub use fieldset::FieldSet;

use crate::control::{BaseControl, ContainerMixin, Control, ControlId, ControlTree};
use crate::field::HiddenField;
use crate::render::HtmlBuffer;
use crate::utils::Result;
use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// HTML form container.
///
/// Children process in insertion order through the tree; the form's derived
/// field and button views are cached until a structural change invalidates
/// them.
pub struct Form {
    base: BaseControl,
    children: ContainerMixin,
    action: Option<String>,
    method: String,
    disabled: bool,
    readonly: bool,
    field_list: RefCell<Option<Rc<Vec<ControlId>>>>,
    button_list: RefCell<Option<Rc<Vec<ControlId>>>>,
    fields: RefCell<Option<Rc<HashMap<String, ControlId>>>>,
}

impl Form {
    /// Create a named form posting to its own page
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            children: ContainerMixin::new(),
            action: None,
            method: "post".to_string(),
            disabled: false,
            readonly: false,
            field_list: RefCell::new(None),
            button_list: RefCell::new(None),
            fields: RefCell::new(None),
        }
    }

    /// Set the form action target (builder style)
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// The form submission method, `post` by default
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Set the form submission method
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    /// This form's own disabled flag
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable the form; descendants report disabled through the tree walk
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// This form's own readonly flag
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Mark the form readonly
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Direct non-button children, in insertion order. Cached; the same
    /// `Rc` is returned until the child structure changes.
    pub fn field_list(&self, tree: &ControlTree) -> Rc<Vec<ControlId>> {
        if let Some(cached) = self.field_list.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let list: Rc<Vec<ControlId>> = Rc::new(
            self.children
                .children()
                .iter()
                .copied()
                .filter(|&id| tree.get(id).is_some_and(|c| !c.is_button()))
                .collect(),
        );
        *self.field_list.borrow_mut() = Some(Rc::clone(&list));
        list
    }

    /// Direct button children, in insertion order. Cached like
    /// [`Form::field_list`].
    pub fn button_list(&self, tree: &ControlTree) -> Rc<Vec<ControlId>> {
        if let Some(cached) = self.button_list.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let list: Rc<Vec<ControlId>> = Rc::new(
            self.children
                .children()
                .iter()
                .copied()
                .filter(|&id| tree.get(id).is_some_and(Control::is_button))
                .collect(),
        );
        *self.button_list.borrow_mut() = Some(Rc::clone(&list));
        list
    }

    /// Flattened name-to-id map over every descendant field, recursing into
    /// fieldsets and excluding buttons. Cached like [`Form::field_list`].
    pub fn fields(&self, tree: &ControlTree) -> Rc<HashMap<String, ControlId>> {
        if let Some(cached) = self.fields.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let mut map = HashMap::new();
        for &child in self.children.children() {
            collect_fields(tree, child, &mut map);
        }
        let map = Rc::new(map);
        *self.fields.borrow_mut() = Some(Rc::clone(&map));
        map
    }

    /// Whether every descendant field passed validation this cycle
    pub fn is_valid(&self, tree: &ControlTree) -> bool {
        self.fields(tree).values().all(|&id| {
            tree.get(id)
                .and_then(Control::as_field)
                .is_none_or(|f| f.field().is_valid())
        })
    }
}

fn collect_fields(tree: &ControlTree, id: ControlId, out: &mut HashMap<String, ControlId>) {
    let Some(control) = tree.get(id) else {
        return;
    };
    if control.is_button() {
        return;
    }
    if control.container().is_some() {
        for child in tree.children_of(id) {
            collect_fields(tree, child, out);
        }
        return;
    }
    if control.as_field().is_some() {
        let name = control.base().name();
        if !name.is_empty() {
            out.insert(name.to_string(), id);
        }
    }
}

impl Control for Form {
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

    fn structure_changed(&mut self) {
        *self.field_list.borrow_mut() = None;
        *self.button_list.borrow_mut() = None;
        *self.fields.borrow_mut() = None;
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("form");
        buf.attr("method", &self.method);
        buf.attr("id", &tree.html_id(id));
        buf.attr("name", self.base.name());
        if let Some(action) = &self.action {
            buf.attr("action", action);
        }
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        buf.close_tag();
        buf.newline();
        // hidden fields first, outside the layout table
        for &child in self.children.children() {
            if tree.downcast_ref::<HiddenField>(child).is_some() {
                tree.render_html(child, buf);
                buf.newline();
            }
        }
        buf.elem_start("table");
        buf.close_tag();
        buf.newline();
        let widths = HashMap::new();
        render_field_rows(tree, self.children.children(), &widths, buf);
        buf.elem_end("table");
        buf.newline();
        let buttons: Vec<ControlId> = self
            .children
            .children()
            .iter()
            .copied()
            .filter(|&c| tree.get(c).is_some_and(Control::is_button))
            .collect();
        if !buttons.is_empty() {
            buf.elem_start("div");
            buf.attr("class", "form-buttons");
            buf.close_tag();
            for &button in &buttons {
                tree.render_html(button, buf);
            }
            buf.elem_end("div");
            buf.newline();
        }
        buf.elem_end("form");
    }
}

/// Render label/field table rows for a container's children. Buttons and
/// hidden fields are skipped; nested containers span the full row.
pub(crate) fn render_field_rows(
    tree: &ControlTree,
    children: &[ControlId],
    widths: &HashMap<String, u32>,
    buf: &mut HtmlBuffer,
) {
    for &child in children {
        let Some(control) = tree.get(child) else {
            continue;
        };
        if control.is_button() || control.as_any().downcast_ref::<HiddenField>().is_some() {
            continue;
        }
        if control.container().is_some() {
            buf.append("<tr><td colspan=\"2\">");
            tree.render_html(child, buf);
            buf.append("</td></tr>");
            buf.newline();
            continue;
        }
        let Some(field) = control.as_field() else {
            continue;
        };
        let name = control.base().name();
        let display = field.field().label().unwrap_or(name);
        buf.append("<tr><td>");
        buf.elem_start("label");
        buf.attr("for", &tree.html_id(child));
        buf.close_tag();
        buf.append_escaped(display);
        buf.elem_end("label");
        buf.append("</td>");
        buf.elem_start("td");
        if let Some(&span) = widths.get(name) {
            buf.attr("colspan", &span.to_string());
        }
        buf.close_tag();
        tree.render_html(child, buf);
        if let Some(error) = field.field().error() {
            buf.elem_start("span");
            buf.attr("class", "error");
            buf.close_tag();
            buf.append_escaped(error);
            buf.elem_end("span");
        }
        buf.append("</td></tr>");
        buf.newline();
    }
}

/// One name-to-accessor mapping for [`FieldAccessors`]
pub struct FieldAccessor<T> {
    /// The field name this accessor binds to
    pub name: &'static str,
    /// Read the property as a typed value
    pub get: fn(&T) -> Value,
    /// Write the property from a typed value
    pub set: fn(&mut T, &Value) -> Result<()>,
}

/// Explicit per-type accessor table mapping field names to getter/setter
/// pairs, built once per type instead of discovered at runtime
pub trait FieldAccessors: Sized {
    /// The accessor table for this type
    fn accessors() -> &'static [FieldAccessor<Self>];
}

impl ControlTree {
    /// Snapshot the bound values of a form subtree as a JSON object, one
    /// nested object per contained fieldset. Buttons are excluded.
    pub fn form_state(&self, form: ControlId) -> Value {
        let mut state = serde_json::Map::new();
        for child in self.children_of(form) {
            let Some(control) = self.get(child) else {
                continue;
            };
            let name = control.base().name();
            if name.is_empty() || control.is_button() {
                continue;
            }
            if control.container().is_some() {
                state.insert(name.to_string(), self.form_state(child));
            } else if let Some(field) = control.as_field() {
                state.insert(name.to_string(), Value::String(field.field().value().into()));
            }
        }
        Value::Object(state)
    }

    /// Restore field values from a [`ControlTree::form_state`] snapshot.
    /// Entries with no matching child are ignored.
    pub fn restore_form_state(&mut self, form: ControlId, state: &Value) {
        let Some(entries) = state.as_object() else {
            return;
        };
        for child in self.children_of(form) {
            let Some(name) = self.name(child).map(str::to_string) else {
                continue;
            };
            let Some(value) = entries.get(&name) else {
                continue;
            };
            if self.get(child).is_some_and(|c| c.container().is_some()) {
                self.restore_form_state(child, value);
            } else if let Some(field) = self.get_mut(child).and_then(Control::as_field_mut) {
                field.set_value_object(value);
            }
        }
    }

    /// Copy each named field's typed value onto the matching accessor of
    /// `target`. Fields with no accessor entry are skipped; an invalid or
    /// empty field writes a null.
    pub fn copy_form_to<T: FieldAccessors + 'static>(&self, form: ControlId, target: &mut T) -> Result<()> {
        let fields = match self.downcast_ref::<Form>(form) {
            Some(f) => f.fields(self),
            None => return Ok(()),
        };
        for accessor in T::accessors() {
            if let Some(&id) = fields.get(accessor.name) {
                let value = self
                    .get(id)
                    .and_then(Control::as_field)
                    .and_then(|f| f.value_object())
                    .unwrap_or(Value::Null);
                (accessor.set)(target, &value)?;
            }
        }
        Ok(())
    }

    /// Copy each accessor's property of `source` into the matching named
    /// field. Accessors with no matching field are skipped.
    pub fn copy_form_from<T: FieldAccessors + 'static>(&mut self, form: ControlId, source: &T) {
        let fields = match self.downcast_ref::<Form>(form) {
            Some(f) => f.fields(self),
            None => return,
        };
        for accessor in T::accessors() {
            if let Some(&id) = fields.get(accessor.name) {
                let value = (accessor.get)(source);
                if let Some(field) = self.get_mut(id).and_then(Control::as_field_mut) {
                    field.set_value_object(&value);
                }
            }
        }
    }
}
