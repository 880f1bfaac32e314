//! Deferred action event dispatch
//!
//! Controls register their action listeners while the page is processing so
//! that no listener fires until every control has bound its request value.
//! The registry is a stack of scopes carried explicitly on the request
//! [`crate::context::Context`] rather than bound to the worker thread: a
//! normal request runs in one scope, and a forwarded request pushes a nested
//! scope so its actions never collide with the outer page's. Popping the
//! last scope leaves no state behind to leak into the next request.

use crate::control::{ControlId, ControlTree};

/// A deferred action callback invoked after all controls have processed.
///
/// The listener receives the tree and the source control's id so it can
/// safely read any other control's just-bound value. Returning `false`
/// asks the page to stop further get/post processing.
pub type ActionListener = Box<dyn FnMut(&mut ControlTree, ControlId) -> bool>;

/// One dispatch scope: (source, listener) pairs in registration order
#[derive(Default)]
struct ActionScope {
    events: Vec<(ControlId, ActionListener)>,
}

/// Stack of dispatch scopes for nested (forwarded) request handling
#[derive(Default)]
pub struct ActionStack {
    scopes: Vec<ActionScope>,
}

impl ActionStack {
    /// Create an empty stack with no scopes
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh dispatch scope
    pub fn push_scope(&mut self) {
        self.scopes.push(ActionScope::default());
    }

    /// Pop the current scope, discarding any unfired events
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of active scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Number of events pending in the current scope
    pub fn pending(&self) -> usize {
        self.scopes.last().map_or(0, |scope| scope.events.len())
    }

    /// Register a deferred event in the current scope.
    ///
    /// A scope is created implicitly when none is active, so controls
    /// processed outside a driver-managed request still work.
    pub fn register(&mut self, source: ControlId, listener: ActionListener) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.events.push((source, listener));
        }
    }

    /// Fire every event registered in the current scope, in registration
    /// order.
    ///
    /// All listeners are invoked even after one returns `false`; the
    /// combined result is the logical AND across every listener.
    pub fn fire(&mut self, tree: &mut ControlTree) -> bool {
        let events = match self.scopes.last_mut() {
            Some(scope) => std::mem::take(&mut scope.events),
            None => return true,
        };
        let mut all_ok = true;
        for (source, mut listener) in events {
            if !listener(tree, source) {
                all_ok = false;
            }
        }
        all_ok
    }

    /// Empty the current scope without firing
    pub fn clear(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tree_with_two() -> (ControlTree, ControlId, ControlId) {
        use crate::control::Panel;
        let mut tree = ControlTree::new();
        let x = tree.insert(Box::new(Panel::new("x")));
        let y = tree.insert(Box::new(Panel::new("y")));
        (tree, x, y)
    }

    #[test]
    fn test_fire_in_registration_order_with_and_aggregation() {
        let (mut tree, x, y) = tree_with_two();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut stack = ActionStack::new();
        stack.push_scope();

        let o = order.clone();
        stack.register(x, Box::new(move |_, _| {
            o.borrow_mut().push("x");
            false
        }));
        let o = order.clone();
        stack.register(y, Box::new(move |_, _| {
            o.borrow_mut().push("y");
            true
        }));

        // x fired before y, y still fired, overall result is false
        assert!(!stack.fire(&mut tree));
        assert_eq!(order.borrow().as_slice(), ["x", "y"]);
        assert_eq!(stack.pending(), 0);
    }

    #[test]
    fn test_nested_scopes_do_not_collide() {
        let (mut tree, x, y) = tree_with_two();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut stack = ActionStack::new();
        stack.push_scope();

        let f = fired.clone();
        stack.register(x, Box::new(move |_, _| {
            f.borrow_mut().push("outer");
            true
        }));

        stack.push_scope();
        let f = fired.clone();
        stack.register(y, Box::new(move |_, _| {
            f.borrow_mut().push("inner");
            true
        }));
        assert!(stack.fire(&mut tree));
        assert_eq!(fired.borrow().as_slice(), ["inner"]);
        stack.pop_scope();

        assert!(stack.fire(&mut tree));
        assert_eq!(fired.borrow().as_slice(), ["inner", "outer"]);
    }

    #[test]
    fn test_pop_last_scope_leaves_nothing() {
        let mut stack = ActionStack::new();
        stack.push_scope();
        stack.pop_scope();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.pending(), 0);
    }

    #[test]
    fn test_clear_discards_without_firing() {
        let (mut tree, x, _) = tree_with_two();
        let mut stack = ActionStack::new();
        stack.push_scope();
        stack.register(x, Box::new(|_, _| false));
        stack.clear();
        assert_eq!(stack.pending(), 0);
        assert!(stack.fire(&mut tree));
    }

    #[test]
    fn test_register_creates_implicit_scope() {
        let mut stack = ActionStack::new();
        let (mut tree, x, _) = tree_with_two();
        stack.register(x, Box::new(|_, _| true));
        assert_eq!(stack.depth(), 1);
        assert!(stack.fire(&mut tree));
    }

    #[test]
    fn test_source_id_passed_to_listener() {
        let (mut tree, x, _) = tree_with_two();
        let seen = Rc::new(RefCell::new(None));
        let mut stack = ActionStack::new();
        stack.push_scope();
        let s = seen.clone();
        stack.register(x, Box::new(move |_, source| {
            *s.borrow_mut() = Some(source);
            true
        }));
        stack.fire(&mut tree);
        assert_eq!(*seen.borrow(), Some(x));
    }
}
