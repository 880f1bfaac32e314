//! Arena of controls addressed by [`ControlId`] handles
//!
//! The tree owns every control for the duration of one request. Parent
//! links are slot metadata, not owning pointers, so upward queries (id
//! paths, disabled/readonly inheritance, rename guards) never fight the
//! ownership of the children. Lifecycle hooks that need mutable access to
//! both a control and the tree use a take/put slot protocol: the control is
//! moved out of its slot, handed `&mut ControlTree`, and moved back in.

use super::{Control, ControlId};
use crate::context::Context;
use crate::render::HtmlBuffer;
use crate::service::ResourceDeployer;
use crate::utils::{Result, TrellisError};

struct Slot {
    control: Option<Box<dyn Control>>,
    parent: Option<ControlId>,
    page_rooted: bool,
}

/// Per-request control arena
#[derive(Default)]
pub struct ControlTree {
    slots: Vec<Slot>,
}

impl ControlTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a parentless control and return its handle
    pub fn insert(&mut self, control: Box<dyn Control>) -> ControlId {
        let id = ControlId(self.slots.len());
        self.slots.push(Slot {
            control: Some(control),
            parent: None,
            page_rooted: false,
        });
        id
    }

    /// Borrow a control
    pub fn get(&self, id: ControlId) -> Option<&dyn Control> {
        self.slots.get(id.0)?.control.as_deref()
    }

    /// Mutably borrow a control
    pub fn get_mut(&mut self, id: ControlId) -> Option<&mut dyn Control> {
        match self.slots.get_mut(id.0)?.control.as_mut() {
            Some(control) => Some(control.as_mut()),
            None => None,
        }
    }

    /// Borrow a control downcast to its concrete type
    pub fn downcast_ref<T: Control>(&self, id: ControlId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a control downcast to its concrete type
    pub fn downcast_mut<T: Control>(&mut self, id: ControlId) -> Option<&mut T> {
        self.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// The control's name, empty if unnamed
    pub fn name(&self, id: ControlId) -> Option<&str> {
        self.get(id).map(|c| c.base().name())
    }

    /// The parent container id, if attached
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.slots.get(id.0)?.parent
    }

    /// Mark a control as owned by the page itself. Page roots can never be
    /// re-parented into another container.
    pub(crate) fn mark_page_root(&mut self, id: ControlId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.page_rooted = true;
        }
    }

    /// Rename a control. Renaming after attachment would break the parent's
    /// name index and is rejected as an invalid state.
    pub fn set_name(&mut self, id: ControlId, name: impl Into<String>) -> Result<()> {
        if self.parent(id).is_some() {
            return Err(TrellisError::invalid_state(
                "cannot rename a control that has a parent",
            ));
        }
        let control = self
            .get_mut(id)
            .ok_or_else(|| TrellisError::invalid_argument("unknown control id"))?;
        control.base_mut().set_name(name)
    }

    /// Append a child to a container, honoring detach and replace semantics
    pub fn add(&mut self, container: ControlId, child: ControlId) -> Result<()> {
        self.insert_child(container, None, child)
    }

    /// Insert a child at a position in the container's ordered sequence
    pub fn insert_at(&mut self, container: ControlId, index: usize, child: ControlId) -> Result<()> {
        self.insert_child(container, Some(index), child)
    }

    fn insert_child(
        &mut self,
        container: ControlId,
        index: Option<usize>,
        child: ControlId,
    ) -> Result<()> {
        if container == child {
            return Err(TrellisError::invalid_state(
                "a container cannot contain itself",
            ));
        }
        let child_name = {
            let child_ref = self
                .get(child)
                .ok_or_else(|| TrellisError::invalid_argument("unknown child control id"))?;
            let container_ref = self
                .get(container)
                .ok_or_else(|| TrellisError::invalid_argument("unknown container control id"))?;
            if container_ref.container().is_none() {
                return Err(TrellisError::invalid_argument(
                    "target control is not a container",
                ));
            }
            container_ref.accepts_child(child_ref)?;
            child_ref.base().name().to_string()
        };
        if self.slots[child.0].page_rooted {
            return Err(TrellisError::invalid_state(
                "cannot re-parent a control owned by the page",
            ));
        }
        if self.is_ancestor(child, container) {
            return Err(TrellisError::invalid_state(
                "a container cannot contain itself",
            ));
        }
        if let Some(old_parent) = self.slots[child.0].parent {
            self.detach(old_parent, child);
        }
        let replaced = match self.get_mut(container).and_then(Control::container_mut) {
            Some(mixin) => mixin.attach(&child_name, child, index),
            None => {
                return Err(TrellisError::invalid_argument(
                    "target control is not a container",
                ))
            }
        };
        self.slots[child.0].parent = Some(container);
        if let Some(old) = replaced {
            self.slots[old.0].parent = None;
        }
        self.notify_structure_changed(container);
        Ok(())
    }

    /// Remove a child from a container. Returns whether it was present.
    pub fn remove(&mut self, container: ControlId, child: ControlId) -> Result<bool> {
        match self.get(container) {
            Some(c) if c.container().is_some() => Ok(self.detach(container, child)),
            Some(_) => Err(TrellisError::invalid_argument(
                "target control is not a container",
            )),
            None => Err(TrellisError::invalid_argument("unknown container control id")),
        }
    }

    fn detach(&mut self, parent: ControlId, child: ControlId) -> bool {
        let removed = self
            .get_mut(parent)
            .and_then(Control::container_mut)
            .is_some_and(|mixin| mixin.detach(child));
        if removed {
            self.slots[child.0].parent = None;
            self.notify_structure_changed(parent);
        }
        removed
    }

    /// Notify a container and every ancestor that child structure changed,
    /// so cached derived views (form field lists) invalidate
    fn notify_structure_changed(&mut self, from: ControlId) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            cursor = self.slots[id.0].parent;
            if let Some(control) = self.get_mut(id) {
                control.structure_changed();
            }
        }
    }

    /// O(1) name lookup of a direct child
    pub fn child_by_name(&self, container: ControlId, name: &str) -> Option<ControlId> {
        self.get(container)?.container()?.by_name(name)
    }

    /// Child ids of a control, empty for leaves
    pub fn children_of(&self, id: ControlId) -> Vec<ControlId> {
        self.get(id)
            .and_then(Control::container)
            .map(|mixin| mixin.children().to_vec())
            .unwrap_or_default()
    }

    /// Whether `ancestor` appears on `id`'s parent chain
    pub fn is_ancestor(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether this control or any ancestor is disabled.
    ///
    /// Computed by walking to the nearest disabled ancestor; never by
    /// eagerly propagating flags into the children.
    pub fn is_disabled(&self, id: ControlId) -> bool {
        self.walk_flags(id, |control| control.own_disabled())
    }

    /// Whether this control or any ancestor is readonly
    pub fn is_readonly(&self, id: ControlId) -> bool {
        self.walk_flags(id, |control| control.own_readonly())
    }

    fn walk_flags(&self, id: ControlId, flag: impl Fn(&dyn Control) -> bool) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.get(current).is_some_and(|c| flag(c)) {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Underscore-joined ancestor name path, used as the HTML id of nested
    /// fields (`form_fieldset_field`)
    pub fn id_path(&self, id: ControlId) -> String {
        let mut names: Vec<String> = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(control) = self.get(current) {
                let name = control.base().name();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
            cursor = self.parent(current);
        }
        names.reverse();
        names.join("_")
    }

    /// The HTML id for a control: the explicit `id` attribute if set, else
    /// the ancestor name path
    pub fn html_id(&self, id: ControlId) -> String {
        if let Some(explicit) = self.get(id).and_then(|c| c.base().attribute("id")) {
            return explicit.to_string();
        }
        self.id_path(id)
    }

    fn take(&mut self, id: ControlId) -> Option<Box<dyn Control>> {
        self.slots.get_mut(id.0)?.control.take()
    }

    fn put(&mut self, id: ControlId, control: Box<dyn Control>) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.control = Some(control);
        }
    }

    /// Run the init phase: the control's own hook, then every child in
    /// order. Never short-circuits.
    pub fn init(&mut self, id: ControlId, ctx: &mut Context) {
        if let Some(mut control) = self.take(id) {
            control.on_init(id, self, ctx);
            self.put(id, control);
        }
        for child in self.children_of(id) {
            self.init(child, ctx);
        }
    }

    /// Run the process phase: children in order, short-circuiting on the
    /// first `false`, then the control's own hook exactly once.
    ///
    /// The own hook still runs after a child short-circuit so a container's
    /// deferred listener is registered exactly once either way; the combined
    /// result is `false` if any invoked hook returned `false`.
    pub fn process(&mut self, id: ControlId, ctx: &mut Context) -> bool {
        let mut children_ok = true;
        for child in self.children_of(id) {
            if !self.process(child, ctx) {
                children_ok = false;
                break;
            }
        }
        let disabled = self.is_disabled(id);
        let readonly = self.is_readonly(id);
        let mut own_ok = true;
        if let Some(mut control) = self.take(id) {
            let previous = ctx.set_effective(disabled, readonly);
            own_ok = control.on_process(id, self, ctx);
            ctx.set_effective(previous.0, previous.1);
            self.put(id, control);
        }
        children_ok && own_ok
    }

    /// Run the render hooks: the control's own hook, then every child.
    /// Never short-circuits.
    pub fn render_pass(&mut self, id: ControlId, ctx: &mut Context) {
        if let Some(mut control) = self.take(id) {
            control.on_render(id, self, ctx);
            self.put(id, control);
        }
        for child in self.children_of(id) {
            self.render_pass(child, ctx);
        }
    }

    /// Run the destroy phase: children first, then the control's own hook.
    /// Never short-circuits; always runs regardless of the request outcome.
    pub fn destroy(&mut self, id: ControlId, ctx: &mut Context) {
        for child in self.children_of(id) {
            self.destroy(child, ctx);
        }
        if let Some(mut control) = self.take(id) {
            control.on_destroy(id, self, ctx);
            self.put(id, control);
        }
    }

    /// Deploy static resources for a control subtree
    pub fn deploy(&self, id: ControlId, deployer: &dyn ResourceDeployer) -> Result<()> {
        if let Some(control) = self.get(id) {
            control.on_deploy(deployer)?;
        }
        for child in self.children_of(id) {
            self.deploy(child, deployer)?;
        }
        Ok(())
    }

    /// Render a control subtree into an existing buffer
    pub fn render_html(&self, id: ControlId, buf: &mut HtmlBuffer) {
        if let Some(control) = self.get(id) {
            control.render(id, self, buf);
        }
    }

    /// Render a control subtree to a string.
    ///
    /// This is the single rendering code path: the buffer is pre-sized from
    /// the control's own estimate and handed to [`Control::render`].
    pub fn to_html(&self, id: ControlId) -> String {
        let estimate = self.get(id).map_or(0, |c| c.estimated_size());
        let mut buf = HtmlBuffer::with_capacity(estimate);
        self.render_html(id, &mut buf);
        buf.into_string()
    }
}
