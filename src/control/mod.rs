//! Control model: the polymorphic unit every page is composed of
//!
//! A control is a named node in a per-request tree. Leaf controls bind and
//! validate request values; containers own an ordered, name-indexed set of
//! child controls and delegate the lifecycle phases to them. The tree itself
//! is an arena of boxed controls addressed by [`ControlId`] handles, so the
//! parent back-reference is a plain index and never an owning pointer.

pub mod attributes;
pub mod container;
pub mod link;
pub mod tree;

pub use attributes::AttributeBag;
pub use container::{ContainerMixin, Panel};
pub use link::ActionLink;
pub use tree::ControlTree;

use crate::action::ActionListener;
use crate::context::Context;
use crate::field::Field;
use crate::render::HtmlBuffer;
use crate::service::ResourceDeployer;
use crate::utils::{Result, TrellisError};
use std::any::Any;
use std::fmt;

/// Handle for a control slot in a [`ControlTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub(crate) usize);

/// The polymorphic control capability.
///
/// Lifecycle hooks default to no-ops except `on_process`, which registers the
/// control's action listener (if one is attached) with the current dispatch
/// scope so it fires after every control has finished binding.
pub trait Control: Any {
    /// Shared name/attribute/listener bookkeeping
    fn base(&self) -> &BaseControl;

    /// Mutable access to the shared bookkeeping
    fn base_mut(&mut self) -> &mut BaseControl;

    /// Upcast for downcasting to the concrete control type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The child collection, for container controls
    fn container(&self) -> Option<&ContainerMixin> {
        None
    }

    /// Mutable child collection, for container controls
    fn container_mut(&mut self) -> Option<&mut ContainerMixin> {
        None
    }

    /// The field capability, for value-bearing controls
    fn as_field(&self) -> Option<&dyn Field> {
        None
    }

    /// Mutable field capability
    fn as_field_mut(&mut self) -> Option<&mut dyn Field> {
        None
    }

    /// Whether this control is a button (kept out of form field lists)
    fn is_button(&self) -> bool {
        false
    }

    /// This control's own disabled flag, ignoring ancestors
    fn own_disabled(&self) -> bool {
        false
    }

    /// This control's own readonly flag, ignoring ancestors
    fn own_readonly(&self) -> bool {
        false
    }

    /// Veto hook for containers that restrict their child types
    fn accepts_child(&self, _child: &dyn Control) -> Result<()> {
        Ok(())
    }

    /// Called after this container's child list changed structurally
    fn structure_changed(&mut self) {}

    /// Initialize hook, run before request processing
    fn on_init(&mut self, _id: ControlId, _tree: &mut ControlTree, _ctx: &mut Context) {}

    /// Process hook: bind request values and queue deferred actions.
    ///
    /// Returning `false` stops the processing of any remaining siblings.
    fn on_process(&mut self, id: ControlId, _tree: &mut ControlTree, ctx: &mut Context) -> bool {
        if let Some(listener) = self.base_mut().take_listener() {
            ctx.actions.register(id, listener);
        }
        true
    }

    /// Render hook, run after actions have fired and before template render
    fn on_render(&mut self, _id: ControlId, _tree: &mut ControlTree, _ctx: &mut Context) {}

    /// Destroy hook, always run at the end of the request
    fn on_destroy(&mut self, _id: ControlId, _tree: &mut ControlTree, _ctx: &mut Context) {}

    /// Deploy hook for copying static resources once at application start
    fn on_deploy(&self, _deployer: &dyn ResourceDeployer) -> Result<()> {
        Ok(())
    }

    /// Estimated rendered size in bytes, used to pre-size the render buffer.
    ///
    /// Proportional to the attribute count, plus the child count for
    /// containers.
    fn estimated_size(&self) -> usize {
        let attrs = self.base().attribute_count();
        let children = self.container().map_or(0, ContainerMixin::len);
        64 + attrs * 24 + children * 256
    }

    /// Render this control into the shared buffer
    fn render(&self, id: ControlId, tree: &ControlTree, buf: &mut HtmlBuffer);
}

/// Shared per-control bookkeeping: name, lazily created attributes, and an
/// optional deferred action listener.
pub struct BaseControl {
    name: String,
    attributes: Option<AttributeBag>,
    listener: Option<ActionListener>,
}

impl BaseControl {
    /// Create unnamed bookkeeping
    pub fn new() -> Self {
        Self {
            name: String::new(),
            attributes: None,
            listener: None,
        }
    }

    /// Create bookkeeping with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: None,
            listener: None,
        }
    }

    /// The control name; empty for unnamed controls
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the control. The parented-control guard lives in
    /// [`ControlTree::set_name`]; this only rejects empty names.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(TrellisError::invalid_argument("control name is empty"));
        }
        self.name = name;
        Ok(())
    }

    /// The attribute bag, if any attribute was ever set
    pub fn attributes(&self) -> Option<&AttributeBag> {
        self.attributes.as_ref()
    }

    /// The attribute bag, created lazily on first use
    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        self.attributes.get_or_insert_with(AttributeBag::new)
    }

    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(name)
    }

    /// Set an attribute value; `None` removes it
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.attributes_mut().set(name, value)
    }

    /// Number of attributes set on this control
    pub fn attribute_count(&self) -> usize {
        self.attributes.as_ref().map_or(0, AttributeBag::len)
    }

    /// Attach a deferred action listener
    pub fn set_listener(&mut self, listener: ActionListener) {
        self.listener = Some(listener);
    }

    /// Whether a listener is attached
    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Take the listener out for registration with a dispatch scope
    pub fn take_listener(&mut self) -> Option<ActionListener> {
        self.listener.take()
    }
}

impl Default for BaseControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BaseControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseControl")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_control_name() {
        let mut base = BaseControl::named("email");
        assert_eq!(base.name(), "email");
        base.set_name("address").unwrap();
        assert_eq!(base.name(), "address");
        assert!(base.set_name("").is_err());
    }

    #[test]
    fn test_attributes_lazy() {
        let mut base = BaseControl::new();
        assert!(base.attributes().is_none());
        assert_eq!(base.attribute_count(), 0);
        base.set_attribute("title", Some("x")).unwrap();
        assert_eq!(base.attribute("title"), Some("x"));
        assert_eq!(base.attribute_count(), 1);
    }

    #[test]
    fn test_listener_take() {
        let mut base = BaseControl::new();
        assert!(!base.has_listener());
        base.set_listener(Box::new(|_, _| true));
        assert!(base.has_listener());
        assert!(base.take_listener().is_some());
        assert!(!base.has_listener());
    }
}
