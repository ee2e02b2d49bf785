//! Render Context
//!
//! The render context tracks which component instance is currently rendering.
//! This is how hooks find their storage: a hook call looks up the scope on top
//! of the stack and reads the next slot from it.
//!
//! # Implementation
//!
//! We use a thread-local stack of scopes. When a renderer starts rendering an
//! instance it pushes the scope onto the stack; when the render completes the
//! guard pops it again.
//!
//! The stack (rather than a single slot) keeps things consistent when a render
//! mounts and drives another renderer, as tests occasionally do.

use std::cell::RefCell;
use std::rc::Rc;

use super::scope::ScopeState;
use super::ScopeId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Rc<ScopeState>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the render context when dropped.
///
/// This keeps the stack balanced even if the component panics mid-render.
pub struct RenderContext {
    scope_id: ScopeId,
}

impl RenderContext {
    /// Enter a render context for the given scope.
    ///
    /// While the guard is alive, hooks called on this thread resolve to
    /// `scope`.
    pub(crate) fn enter(scope: Rc<ScopeState>) -> Self {
        let scope_id = scope.id();
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(scope));

        Self { scope_id }
    }

    /// Check if a component is currently rendering on this thread.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the ID of the scope currently rendering, if any.
    pub fn current_scope_id() -> Option<ScopeId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|scope| scope.id()))
    }

    /// Get the scope currently rendering, if any.
    ///
    /// The returned handle is cloned out of the stack so callers never hold
    /// a borrow of it while running user code.
    pub(crate) fn current() -> Option<Rc<ScopeState>> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Get the scope currently rendering, panicking if there is none.
    #[track_caller]
    pub(crate) fn expect_current() -> Rc<ScopeState> {
        Self::current().expect(
            "hook called outside of a component render. \
             Hooks may only be called from the body of a component driven by a RenderHook.",
        )
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(scope) = popped {
                debug_assert_eq!(
                    scope.id(),
                    self.scope_id,
                    "RenderContext mismatch: expected {}, got {}",
                    self.scope_id,
                    scope.id()
                );
            }
        });
    }
}
