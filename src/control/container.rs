//! Container composition: ordered children plus a name index
//!
//! Containers do not inherit from a concrete base class; they compose a
//! [`ContainerMixin`] holding the ordered child ids and the O(1) name index.
//! All structural mutation goes through [`super::ControlTree`] so the
//! add/replace/detach invariants live in one place.

use super::{BaseControl, Control, ControlId, ControlTree};
use crate::render::HtmlBuffer;
use std::any::Any;
use std::collections::HashMap;

/// Ordered child collection with a name index.
///
/// Insertion order drives both rendering and lifecycle delegation. Only
/// non-empty names are indexed; adding a second control under an existing
/// name replaces the first at its position instead of appending.
#[derive(Debug, Default)]
pub struct ContainerMixin {
    order: Vec<ControlId>,
    index: HashMap<String, ControlId>,
}

impl ContainerMixin {
    /// Create an empty child collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Child ids in insertion order
    pub fn children(&self) -> &[ControlId] {
        &self.order
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the container has no children
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// O(1) lookup of a child by name
    pub fn by_name(&self, name: &str) -> Option<ControlId> {
        self.index.get(name).copied()
    }

    /// Whether the given id is a direct child
    pub fn contains(&self, child: ControlId) -> bool {
        self.order.contains(&child)
    }

    /// Attach a child, honoring replace semantics. Returns the id of a
    /// same-named child that was replaced in place, if any.
    pub(crate) fn attach(
        &mut self,
        name: &str,
        child: ControlId,
        index: Option<usize>,
    ) -> Option<ControlId> {
        if !name.is_empty() {
            if let Some(&existing) = self.index.get(name) {
                if let Some(pos) = self.order.iter().position(|&id| id == existing) {
                    self.order[pos] = child;
                }
                self.index.insert(name.to_string(), child);
                return Some(existing);
            }
            self.index.insert(name.to_string(), child);
        }
        match index {
            Some(i) if i <= self.order.len() => self.order.insert(i, child),
            _ => self.order.push(child),
        }
        None
    }

    /// Detach a child from the order and the name index
    pub(crate) fn detach(&mut self, child: ControlId) -> bool {
        let Some(pos) = self.order.iter().position(|&id| id == child) else {
            return false;
        };
        self.order.remove(pos);
        self.index.retain(|_, &mut id| id != child);
        true
    }
}

/// Render every child of a container into the buffer, separating each
/// non-empty child rendering with a newline
pub(crate) fn render_children(mixin: &ContainerMixin, tree: &ControlTree, buf: &mut HtmlBuffer) {
    for &child in mixin.children() {
        let before = buf.len();
        tree.render_html(child, buf);
        if buf.len() > before {
            buf.newline();
        }
    }
}

/// Basic block container rendered as a `div`.
///
/// Panels carry no field semantics of their own; they group controls for
/// layout and delegate every lifecycle phase to their children.
pub struct Panel {
    base: BaseControl,
    children: ContainerMixin,
}

impl Panel {
    /// Create a named panel
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseControl::named(name),
            children: ContainerMixin::new(),
        }
    }
}

impl Control for Panel {
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

    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer) {
        buf.elem_start("div");
        buf.attr("id", &tree.html_id(id));
        if let Some(attrs) = self.base.attributes() {
            attrs.render_to(buf, &["id"]);
        }
        buf.close_tag();
        buf.newline();
        render_children(&self.children, tree, buf);
        buf.elem_end("div");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_appends_in_order() {
        let mut mixin = ContainerMixin::new();
        assert!(mixin.attach("a", ControlId(1), None).is_none());
        assert!(mixin.attach("b", ControlId(2), None).is_none());
        assert_eq!(mixin.children(), &[ControlId(1), ControlId(2)]);
        assert_eq!(mixin.by_name("a"), Some(ControlId(1)));
    }

    #[test]
    fn test_attach_replaces_same_name_in_place() {
        let mut mixin = ContainerMixin::new();
        mixin.attach("a", ControlId(1), None);
        mixin.attach("b", ControlId(2), None);
        let replaced = mixin.attach("a", ControlId(3), None);
        assert_eq!(replaced, Some(ControlId(1)));
        assert_eq!(mixin.children(), &[ControlId(3), ControlId(2)]);
        assert_eq!(mixin.by_name("a"), Some(ControlId(3)));
        assert_eq!(mixin.len(), 2);
    }

    #[test]
    fn test_attach_at_index() {
        let mut mixin = ContainerMixin::new();
        mixin.attach("a", ControlId(1), None);
        mixin.attach("b", ControlId(2), None);
        mixin.attach("c", ControlId(3), Some(1));
        assert_eq!(
            mixin.children(),
            &[ControlId(1), ControlId(3), ControlId(2)]
        );
    }

    #[test]
    fn test_unnamed_children_not_indexed() {
        let mut mixin = ContainerMixin::new();
        mixin.attach("", ControlId(1), None);
        mixin.attach("", ControlId(2), None);
        assert_eq!(mixin.len(), 2);
        assert_eq!(mixin.by_name(""), None);
    }

    #[test]
    fn test_detach() {
        let mut mixin = ContainerMixin::new();
        mixin.attach("a", ControlId(1), None);
        assert!(mixin.detach(ControlId(1)));
        assert!(!mixin.detach(ControlId(1)));
        assert!(mixin.is_empty());
        assert_eq!(mixin.by_name("a"), None);
    }
}
