//! Anchor control that fires a deferred action when clicked

use super::{BaseControl, Control, ControlId, ControlTree};
use crate::context::Context;
use crate::render::HtmlBuffer;
use std::any::Any;

/// Request parameter carrying the name of the clicked action link
pub const ACTION_LINK_PARAM: &str = "action_link";

/// Hyperlink rendered as `<a href="path?action_link=name">`.
///
/// On process the link checks whether it was the clicked one and, if so,
/// queues its listener with the current dispatch scope; the listener fires
/// only after every other control has bound its request value.
pub struct ActionLink {
    base: BaseControl,
    label: Option<String>,
    target: String,
    clicked: bool,
}

impl ActionLink {
    /// Create a named action link
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            label: None,
            target: String::new(),
            clicked: false,
        }
    }

    /// Set the visible label; the name is used when unset
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Set the path the link points back at
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Whether this link was the clicked one in the current request
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    fn href(&self) -> String {
        format!("{}?{}={}", self.target, ACTION_LINK_PARAM, self.base.name())
    }
}

impl Control for ActionLink {
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

    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        self.clicked = ctx.request.param(ACTION_LINK_PARAM) == Some(self.base.name());
        if self.clicked {
            if let Some(listener) = self.base.take_listener() {
                ctx.actions.register(id, listener);
            }
        }
        true
    }

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("a");
        buf.attr("href", &self.href());
        buf.attr("id", &tree.html_id(id));
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id", "href"]);
        }
        buf.close_tag();
        buf.append_escaped(self.label.as_deref().unwrap_or_else(|| self.base.name()));
        buf.elem_end("a");
    }
}
